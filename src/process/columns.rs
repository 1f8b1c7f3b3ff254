use serde::Serialize;

use crate::process::table::RawTable;

/// How the semantic fields were located in the source table. Positional is
/// the primary strategy; ByName is the fallback when it yields no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    Positional,
    ByName,
}

/// Fixed column layout of the CL payroll export, zero-based.
pub mod layout {
    pub const OPERATOR: usize = 1;
    pub const CODE: usize = 2;
    pub const COMPANY: usize = 3;
    /// Staff headcount is split over two columns and summed.
    pub const STAFF_A: usize = 11;
    pub const STAFF_B: usize = 12;
    pub const PARASUB: usize = 13;
    pub const PARTNERS: usize = 14;
    pub const OTHER: usize = 15;
    pub const REVENUE: usize = 35;
}

/// Name-resolved column indexes for the fallback strategy. Any field may be
/// missing; unresolved numeric fields read 0 and text fields read empty.
#[derive(Debug, Default)]
pub struct NamedColumns {
    pub operator: Option<usize>,
    pub code: Option<usize>,
    pub company: Option<usize>,
    pub staff: Option<usize>,
    pub parasub: Option<usize>,
    pub other: Option<usize>,
    pub total: Option<usize>,
    pub partners: Option<usize>,
    pub revenue: Option<usize>,
}

impl NamedColumns {
    /// Match each semantic field against the domain tokens its column is
    /// known to carry, case-insensitively, first hit wins.
    pub fn resolve(table: &RawTable) -> Self {
        let find = |tokens: &[&str]| tokens.iter().find_map(|t| table.find_column(t));
        NamedColumns {
            operator: find(&["operatore", "descrizione oper"]),
            code: find(&["codice"]),
            company: find(&["ragione sociale", "azienda"]),
            staff: find(&["dipendenti"]),
            parasub: find(&["parasub"]),
            other: find(&["altro"]),
            total: find(&["totale"]),
            partners: find(&["soci"]),
            revenue: find(&["fatturato progressivo"]),
        }
    }
}
