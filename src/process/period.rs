use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::process::table::{cell_at, Cell, RawTable};

/// Italian month names, index 0 = January. Embedded so period labels never
/// depend on host locale availability.
pub const MONTH_NAMES: [&str; 12] = [
    "gennaio",
    "febbraio",
    "marzo",
    "aprile",
    "maggio",
    "giugno",
    "luglio",
    "agosto",
    "settembre",
    "ottobre",
    "novembre",
    "dicembre",
];

/// Date layouts accepted when scanning candidate columns.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d/%m/%y", "%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[((month.clamp(1, 12) - 1) as usize) % 12]
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Last day of `month` in `year`, Gregorian leap rule applied explicitly.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

/// The resolved reporting period. Built once per run, either from a manual
/// selection or by scanning candidate date columns for min/max values.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodInfo {
    /// Human label, e.g. "Giugno 2025" or "Giugno 2025 - Luglio 2025".
    pub period: String,
    /// `DD/MM/YYYY` display of `min_date`.
    pub start_date: String,
    /// `DD/MM/YYYY` display of `max_date`.
    pub end_date: String,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    /// Lowercase Italian month of `min_date`, used for downstream naming.
    pub month_token: String,
}

impl PeriodInfo {
    /// Build a period from an already-known date span.
    pub fn from_span(min_date: NaiveDate, max_date: NaiveDate) -> Self {
        let max_date = max_date.max(min_date);
        let period = if min_date.month() != max_date.month() || min_date.year() != max_date.year()
        {
            format!(
                "{} {} - {} {}",
                capitalize(month_name(min_date.month())),
                min_date.year(),
                capitalize(month_name(max_date.month())),
                max_date.year()
            )
        } else {
            format!(
                "{} {}",
                capitalize(month_name(min_date.month())),
                min_date.year()
            )
        };

        PeriodInfo {
            period,
            start_date: min_date.format("%d/%m/%Y").to_string(),
            end_date: max_date.format("%d/%m/%Y").to_string(),
            min_date,
            max_date,
            month_token: month_name(min_date.month()).to_string(),
        }
    }

    /// Period covering one whole calendar month; this is what a manual
    /// year/month selection turns into.
    pub fn for_month(year: i32, month: u32) -> Self {
        let month = month.clamp(1, 12);
        let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
        let end =
            NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)).unwrap_or(start);
        Self::from_span(start, end)
    }
}

/// Candidate date-bearing columns: any header containing "data"; if none,
/// columns holding typed date cells or whose first few text samples look
/// date-like (contain a `/`).
pub fn find_date_columns(table: &RawTable) -> Vec<usize> {
    let mut cols: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.to_lowercase().contains("data"))
        .map(|(i, _)| i)
        .collect();
    if !cols.is_empty() {
        return cols;
    }

    for col in 0..table.headers.len() {
        let mut sampled = 0;
        for row in &table.rows {
            match cell_at(row, col) {
                Cell::Date(_) => {
                    cols.push(col);
                    break;
                }
                Cell::Text(s) if !s.trim().is_empty() => {
                    if s.contains('/') {
                        cols.push(col);
                        break;
                    }
                    sampled += 1;
                    if sampled >= 5 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    cols
}

/// Parse one cell as a calendar date, if it holds one.
pub(crate) fn parse_date_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Scan `candidate_columns` for the min/max parseable dates and build the
/// period from them. Unparseable cells are ignored; if nothing parses at all
/// the period defaults to the current calendar month.
pub fn resolve_period(table: &RawTable, candidate_columns: &[usize]) -> PeriodInfo {
    let mut min_date: Option<NaiveDate> = None;
    let mut max_date: Option<NaiveDate> = None;

    for &col in candidate_columns {
        for row in &table.rows {
            if let Some(d) = parse_date_cell(cell_at(row, col)) {
                min_date = Some(min_date.map_or(d, |m| m.min(d)));
                max_date = Some(max_date.map_or(d, |m| m.max(d)));
            }
        }
    }

    match (min_date, max_date) {
        (Some(min), Some(max)) => {
            debug!(%min, %max, "period resolved from date columns");
            PeriodInfo::from_span(min, max)
        }
        _ => {
            let today = Local::now().date_naive();
            debug!("no parseable dates found; defaulting to the current month");
            PeriodInfo::for_month(today.year(), today.month())
        }
    }
}
