use std::{fs, path::Path};

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use crate::process::table::{Cell, RawTable};

/// Pick the delimiter by counting candidates on the header line; payroll
/// exports in the wild come both `;`- and `,`-separated.
fn sniff_delimiter(data: &str) -> u8 {
    let first_line = data.lines().next().unwrap_or_default();
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

fn cell_from_raw(raw: &str) -> Cell {
    if raw.trim().is_empty() {
        Cell::Empty
    } else {
        Cell::Text(raw.to_string())
    }
}

/// Parse delimited text into a `RawTable`. Headers are captured exactly as
/// the file claims them; the engine normalizes before matching. Records that
/// fail to parse are skipped, not fatal.
pub fn parse_csv(data: &str) -> Result<RawTable> {
    let delimiter = sniff_delimiter(data);
    debug!(delimiter = %(delimiter as char), "sniffed delimiter");

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .context("failed to read header row")?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        match result {
            Ok(record) => rows.push(record.iter().map(cell_from_raw).collect()),
            Err(err) => warn!(row = idx, %err, "skipping unreadable record"),
        }
    }

    Ok(RawTable { headers, rows })
}

/// Read a delimited payroll export from disk. Unreadable files are this
/// layer's fatal error; everything past here degrades row by row.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
    let table = parse_csv(&data)?;
    info!(
        rows = table.rows.len(),
        columns = table.headers.len(),
        "loaded payroll export"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn comma_separated_round_trip() -> Result<()> {
        let data = "Operatore,Codice,Azienda\nROSSI,A1,Ditta Uno\nVERDI,B1,Ditta Due\n";
        let table = parse_csv(data)?;
        assert_eq!(table.headers, vec!["Operatore", "Codice", "Azienda"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Text("ROSSI".into()));
        Ok(())
    }

    #[test]
    fn semicolon_files_are_sniffed() -> Result<()> {
        let data = "Operatore;Codice;Azienda\nROSSI;A1;Ditta, la prima\n";
        let table = parse_csv(data)?;
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows[0][2], Cell::Text("Ditta, la prima".into()));
        Ok(())
    }

    #[test]
    fn blank_fields_become_empty_cells() -> Result<()> {
        let data = "A,B,C\n1,,3\n";
        let table = parse_csv(data)?;
        assert_eq!(table.rows[0][1], Cell::Empty);
        Ok(())
    }

    #[test]
    fn short_rows_are_kept() -> Result<()> {
        let data = "A,B,C\n1,2\n";
        let table = parse_csv(data)?;
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].len(), 2);
        Ok(())
    }

    #[test]
    fn loads_from_disk() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"Operatore,Codice\nROSSI,A1\n")?;
        let table = load_csv(tmp.path())?;
        assert_eq!(table.rows.len(), 1);
        Ok(())
    }

    #[test]
    fn missing_file_is_a_fatal_ingest_error() {
        assert!(load_csv("/definitely/not/here.csv").is_err());
    }
}
