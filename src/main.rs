use anyhow::{bail, Context, Result};
use paysheet::{
    ingest,
    process::{self, PeriodInfo},
    report,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) parse arguments ──────────────────────────────────────────
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, manual_period) = match args.as_slice() {
        [path] => (path.clone(), None),
        [path, year, month] => {
            let year: i32 = year.parse().context("year must be a number")?;
            let month: u32 = month.parse().context("month must be a number")?;
            if !(1..=12).contains(&month) {
                bail!("month must be in 1..=12");
            }
            (path.clone(), Some(PeriodInfo::for_month(year, month)))
        }
        _ => bail!("usage: paysheet <export.csv> [<year> <month>]"),
    };

    // ─── 3) load + normalize ─────────────────────────────────────────
    let table = ingest::load_csv(&path)?;
    let rows_in = table.rows.len();
    let output = process::process_table(table, manual_period);
    info!(
        rows_in,
        records = output.records.len(),
        mode = ?output.mode,
        period = %output.period.period,
        "processing complete"
    );

    // ─── 4) group per operator and emit for the renderer ─────────────
    let period = output.period;
    let mode = output.mode;
    let groups = report::group_by_operator(output.records);

    let doc = serde_json::json!({
        "period": period,
        "mode": mode,
        "operators": groups,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);

    Ok(())
}
