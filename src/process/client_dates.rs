use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::process::period::{days_in_month, parse_date_cell};
use crate::process::table::{cell_at, Cell, RawTable, EMPTY_CELL};

/// Positional fallback for the client-code column (column C of the export).
const CODE_COLUMN_FALLBACK: usize = 2;

const SENTINEL_DISPLAY: &str = "01/01/1900";

/// Delivery date resolved for one client code. `day` keeps the raw day as
/// read from the cell; `date` has the cutoff rule and month clamp applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDateEntry {
    pub day: u32,
    pub date: NaiveDate,
    pub display: String,
}

fn sentinel_entry() -> ClientDateEntry {
    ClientDateEntry {
        day: 1,
        date: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(),
        display: SENTINEL_DISPLAY.to_string(),
    }
}

/// Day-extraction strategies, tried in order; the first to produce a value
/// wins.
type DayStrategy = fn(&Cell) -> Option<u32>;

const DAY_STRATEGIES: &[DayStrategy] = &[day_from_integer, day_from_separated, day_from_any_date];

/// The cell is already a plain day number in [1, 31].
fn day_from_integer(cell: &Cell) -> Option<u32> {
    let day = match cell {
        Cell::Number(n) if n.is_finite() => *n as i64,
        Cell::Text(s) => s.trim().parse::<f64>().ok()? as i64,
        _ => return None,
    };
    (1..=31).contains(&day).then_some(day as u32)
}

/// A slash- or dash-separated date string; the leading component is taken as
/// the day. No range check here, the month clamp covers oversized values.
fn day_from_separated(cell: &Cell) -> Option<u32> {
    let s = match cell {
        Cell::Text(s) => s.trim(),
        _ => return None,
    };
    let first = if s.contains('/') {
        s.split('/').next()
    } else if s.contains('-') {
        s.split('-').next()
    } else {
        None
    }?;
    if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
        first.parse().ok()
    } else {
        None
    }
}

/// Anything the generic date parser understands; its day component wins.
fn day_from_any_date(cell: &Cell) -> Option<u32> {
    parse_date_cell(cell).map(|d| d.day())
}

/// Day-cutoff rule: a day after the 15th lands in the selected month, an
/// earlier day rolls into the following month; December rolls into January
/// of the next year. The day is clamped to the resulting month's length.
fn entry_for_day(day: u32, selected_year: i32, selected_month: u32) -> Option<ClientDateEntry> {
    let month = if day > 15 {
        selected_month
    } else {
        selected_month % 12 + 1
    };
    let year = if month < selected_month {
        selected_year + 1
    } else {
        selected_year
    };
    let clamped = day.min(days_in_month(year, month));
    let date = NaiveDate::from_ymd_opt(year, month, clamped)?;
    Some(ClientDateEntry {
        day,
        date,
        display: date.format("%d/%m/%Y").to_string(),
    })
}

/// Resolve one delivery date per distinct client code in the table.
///
/// Blank and `"0"` delivery cells sentinel to 01/01/1900; a code appearing
/// on several rows keeps the last row's date. A row that cannot be resolved
/// at all falls back to the 1st of the selected month and never aborts the
/// pass.
pub fn resolve_client_dates(
    table: &RawTable,
    selected_year: i32,
    selected_month: u32,
) -> HashMap<String, ClientDateEntry> {
    let selected_month = selected_month.clamp(1, 12);
    let code_col = table.find_column("codice").unwrap_or(CODE_COLUMN_FALLBACK);
    let delivery_col = table.find_column("consegna");
    debug!(code_col, ?delivery_col, "client-date column resolution");

    let mut map: HashMap<String, ClientDateEntry> = HashMap::new();
    for row in &table.rows {
        let code = cell_at(row, code_col).display();
        if code.is_empty() {
            continue;
        }

        let delivery = match delivery_col {
            Some(col) => cell_at(row, col),
            None => &EMPTY_CELL,
        };

        if delivery.is_blank() || delivery.display() == "0" {
            map.insert(code, sentinel_entry());
            continue;
        }

        let day = DAY_STRATEGIES
            .iter()
            .find_map(|strategy| strategy(delivery))
            .unwrap_or(1);

        let entry = entry_for_day(day, selected_year, selected_month).unwrap_or_else(|| {
            warn!(
                code = %code,
                day,
                "could not build delivery date; defaulting to the 1st of the selected month"
            );
            let date =
                NaiveDate::from_ymd_opt(selected_year, selected_month, 1).unwrap_or_default();
            ClientDateEntry {
                day: 1,
                date,
                display: date.format("%d/%m/%Y").to_string(),
            }
        });
        map.insert(code, entry);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_delivery(cells: Vec<(&str, Cell)>) -> RawTable {
        RawTable {
            headers: vec!["Codice".into(), "Consegna PDF".into()],
            rows: cells
                .into_iter()
                .map(|(code, cell)| vec![Cell::Text(code.into()), cell])
                .collect(),
        }
    }

    #[test]
    fn blank_and_zero_cells_sentinel() {
        let table = table_with_delivery(vec![
            ("A1", Cell::Empty),
            ("A2", Cell::Text("0".into())),
            ("A3", Cell::Text("   ".into())),
        ]);
        let map = resolve_client_dates(&table, 2025, 6);
        for code in ["A1", "A2", "A3"] {
            assert_eq!(map[code].display, "01/01/1900");
            assert_eq!(map[code].day, 1);
        }
    }

    #[test]
    fn day_after_cutoff_stays_in_selected_month() {
        let table = table_with_delivery(vec![("A1", Cell::Text("20".into()))]);
        let map = resolve_client_dates(&table, 2025, 6);
        assert_eq!(map["A1"].display, "20/06/2025");
    }

    #[test]
    fn day_on_or_before_cutoff_rolls_forward() {
        let table = table_with_delivery(vec![("A1", Cell::Text("10".into()))]);
        let map = resolve_client_dates(&table, 2025, 6);
        assert_eq!(map["A1"].display, "10/07/2025");
    }

    #[test]
    fn december_rolls_into_january_of_next_year() {
        let table = table_with_delivery(vec![("A1", Cell::Text("10".into()))]);
        let map = resolve_client_dates(&table, 2025, 12);
        assert_eq!(map["A1"].display, "10/01/2026");
    }

    #[test]
    fn february_clamp_respects_leap_years() {
        let table = table_with_delivery(vec![("A1", Cell::Text("30".into()))]);
        let leap = resolve_client_dates(&table, 2024, 2);
        assert_eq!(leap["A1"].display, "29/02/2024");
        let common = resolve_client_dates(&table, 2023, 2);
        assert_eq!(common["A1"].display, "28/02/2023");
    }

    #[test]
    fn separated_date_string_contributes_its_first_component() {
        let table = table_with_delivery(vec![
            ("A1", Cell::Text("10/06/2025".into())),
            ("A2", Cell::Text("5-7-2025".into())),
        ]);
        let map = resolve_client_dates(&table, 2025, 6);
        assert_eq!(map["A1"].display, "10/07/2025");
        assert_eq!(map["A2"].display, "05/07/2025");
    }

    #[test]
    fn typed_date_cell_contributes_its_day() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 22).unwrap();
        let table = table_with_delivery(vec![("A1", Cell::Date(d))]);
        let map = resolve_client_dates(&table, 2025, 6);
        // day 22 > 15, so the selected month wins
        assert_eq!(map["A1"].display, "22/06/2025");
    }

    #[test]
    fn unparseable_cell_defaults_to_day_one() {
        let table = table_with_delivery(vec![("A1", Cell::Text("boh".into()))]);
        let map = resolve_client_dates(&table, 2025, 6);
        // day 1 <= 15 rolls into the next month
        assert_eq!(map["A1"].display, "01/07/2025");
    }

    #[test]
    fn duplicate_codes_keep_the_last_row() {
        let table = table_with_delivery(vec![
            ("A1", Cell::Text("20".into())),
            ("A1", Cell::Text("18".into())),
        ]);
        let map = resolve_client_dates(&table, 2025, 6);
        assert_eq!(map.len(), 1);
        assert_eq!(map["A1"].display, "18/06/2025");
    }

    #[test]
    fn missing_delivery_column_sentinels_every_code() {
        let table = RawTable {
            headers: vec!["X".into(), "Y".into(), "Codice".into()],
            rows: vec![vec![
                Cell::Empty,
                Cell::Empty,
                Cell::Text("A1".into()),
            ]],
        };
        let map = resolve_client_dates(&table, 2025, 6);
        assert_eq!(map["A1"].display, "01/01/1900");
    }

    #[test]
    fn rows_without_a_code_are_skipped() {
        let table = table_with_delivery(vec![("", Cell::Text("20".into()))]);
        let map = resolve_client_dates(&table, 2025, 6);
        assert!(map.is_empty());
    }
}
