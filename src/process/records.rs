use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::process::client_dates::ClientDateEntry;
use crate::process::columns::{layout, NamedColumns, ResolutionMode};
use crate::process::numeric::to_number;
use crate::process::period::PeriodInfo;
use crate::process::table::{cell_at, RawTable};

/// One canonical output row: the payload handed to the rendering stage.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedRecord {
    pub operator: String,
    pub code: String,
    pub company: String,
    /// General staff count (the two staff columns summed).
    pub employees: f64,
    pub parasub: f64,
    pub other: f64,
    /// employees + parasub + other; partners excluded by design.
    pub total: f64,
    pub partners: f64,
    /// Free-text note, always empty at creation.
    pub note: String,
    /// Resolved delivery date, `DD/MM/YYYY`.
    pub date: String,
    /// Progressive revenue when positive, else total × 100 as a placeholder
    /// unit conversion.
    pub amount: f64,
}

/// Emit one normalized record per usable source row. The positional layout
/// is tried first; when it produces nothing (too few columns, no operator
/// values) the name-based fallback runs instead.
pub fn build_records(
    table: &RawTable,
    client_dates: &HashMap<String, ClientDateEntry>,
    period: &PeriodInfo,
) -> (Vec<NormalizedRecord>, ResolutionMode) {
    let records = build_positional(table, client_dates, period);
    if !records.is_empty() {
        return (records, ResolutionMode::Positional);
    }
    debug!("positional layout produced no rows; falling back to name-based resolution");
    (build_by_name(table, period), ResolutionMode::ByName)
}

fn build_positional(
    table: &RawTable,
    client_dates: &HashMap<String, ClientDateEntry>,
    period: &PeriodInfo,
) -> Vec<NormalizedRecord> {
    // The fixed layout needs at least the count columns present; the revenue
    // column further right is optional.
    let width = table
        .rows
        .iter()
        .map(|r| r.len())
        .max()
        .unwrap_or(0)
        .max(table.headers.len());
    if width <= layout::OTHER {
        return Vec::new();
    }

    // Distinct operator values in first-seen order define the grouping.
    let mut operators: Vec<String> = Vec::new();
    for row in &table.rows {
        let op = cell_at(row, layout::OPERATOR).display();
        if !op.is_empty() && !operators.contains(&op) {
            operators.push(op);
        }
    }

    let mut records = Vec::new();
    for operator in &operators {
        for row in &table.rows {
            if &cell_at(row, layout::OPERATOR).display() != operator {
                continue;
            }
            let code = cell_at(row, layout::CODE).display();
            let company = cell_at(row, layout::COMPANY).display();
            let employees = to_number(cell_at(row, layout::STAFF_A))
                + to_number(cell_at(row, layout::STAFF_B));
            let parasub = to_number(cell_at(row, layout::PARASUB));
            let other = to_number(cell_at(row, layout::OTHER));
            let partners = to_number(cell_at(row, layout::PARTNERS));
            let total = employees + parasub + other;

            let date = client_dates
                .get(code.as_str())
                .map(|entry| entry.display.clone())
                .unwrap_or_else(|| period.start_date.clone());

            let revenue = to_number(cell_at(row, layout::REVENUE));
            let amount = if revenue > 0.0 { revenue } else { total * 100.0 };

            records.push(NormalizedRecord {
                operator: operator.clone(),
                code,
                company,
                employees,
                parasub,
                other,
                total,
                partners,
                note: String::new(),
                date,
                amount,
            });
        }
    }
    records
}

fn build_by_name(table: &RawTable, period: &PeriodInfo) -> Vec<NormalizedRecord> {
    let cols = NamedColumns::resolve(table);
    debug!(?cols, "name-based column resolution");

    let mut records: Vec<NormalizedRecord> = Vec::new();
    for row in &table.rows {
        let text = |col: Option<usize>| {
            col.map(|i| cell_at(row, i).display()).unwrap_or_default()
        };
        let num = |col: Option<usize>| col.map(|i| to_number(cell_at(row, i))).unwrap_or(0.0);

        let employees = num(cols.staff);
        let parasub = num(cols.parasub);
        let other = num(cols.other);

        records.push(NormalizedRecord {
            operator: text(cols.operator),
            code: text(cols.code),
            company: text(cols.company),
            employees,
            parasub,
            other,
            total: num(cols.total),
            partners: num(cols.partners),
            note: String::new(),
            date: period.start_date.clone(),
            amount: num(cols.revenue),
        });
    }

    // A source without a usable total column reads uniformly zero; recompute
    // from the category counts.
    if !records.is_empty() && records.iter().all(|r| r.total == 0.0) {
        for r in &mut records {
            r.total = r.employees + r.parasub + r.other;
        }
    }

    // Without a revenue column the amount is the placeholder conversion.
    if cols.revenue.is_none() {
        for r in &mut records {
            r.amount = r.total * 100.0;
        }
    }

    records
}
