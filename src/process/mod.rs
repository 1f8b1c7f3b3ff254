pub mod client_dates;
pub mod columns;
pub mod numeric;
pub mod period;
pub mod records;
pub mod table;

use chrono::Datelike;
use serde::Serialize;
use tracing::{debug, info};

pub use client_dates::{resolve_client_dates, ClientDateEntry};
pub use columns::ResolutionMode;
pub use numeric::{format_currency, to_number};
pub use period::{find_date_columns, resolve_period, PeriodInfo};
pub use records::{build_records, NormalizedRecord};
pub use table::{Cell, RawTable};

/// Result of one normalization run.
#[derive(Debug, Serialize)]
pub struct ProcessOutput {
    pub records: Vec<NormalizedRecord>,
    pub period: PeriodInfo,
    pub mode: ResolutionMode,
}

/// Run the whole normalization pass over one table: header cleanup, period
/// resolution (a manual override always wins), per-client delivery dates,
/// record emission.
///
/// Takes the table by value: the pass owns its input and never aliases it
/// across invocations. There is no fatal path in here; an empty record set
/// means "nothing to report", not an error.
#[tracing::instrument(level = "info", skip(table, manual_period), fields(rows = table.rows.len()))]
pub fn process_table(mut table: RawTable, manual_period: Option<PeriodInfo>) -> ProcessOutput {
    table.normalize_headers();

    let period = match manual_period {
        Some(p) => p,
        None => {
            let candidates = period::find_date_columns(&table);
            debug!(?candidates, "scanning candidate date columns");
            period::resolve_period(&table, &candidates)
        }
    };

    let client_dates = client_dates::resolve_client_dates(
        &table,
        period.min_date.year(),
        period.min_date.month(),
    );

    let (records, mode) = records::build_records(&table, &client_dates, &period);
    info!(
        records = records.len(),
        clients = client_dates.len(),
        ?mode,
        period = %period.period,
        "table processed"
    );

    ProcessOutput {
        records,
        period,
        mode,
    }
}
