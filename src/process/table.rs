use chrono::NaiveDate;

pub(crate) const EMPTY_CELL: Cell = Cell::Empty;

/// A single cell as handed over by the parsing collaborator.
///
/// The CSV adapter only ever produces `Empty` and `Text`; spreadsheet parsers
/// may hand over typed `Number` and `Date` cells directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Empty, or text that trims to nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell contents as a trimmed display string. Integral numbers print
    /// without a fractional part so numeric client codes round-trip
    /// ("1234", not "1234.0").
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.is_finite() && n.fract() == 0.0 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%d/%m/%Y").to_string(),
        }
    }
}

/// Cell at `idx`, with short rows reading as empty cells.
pub fn cell_at(row: &[Cell], idx: usize) -> &Cell {
    row.get(idx).unwrap_or(&EMPTY_CELL)
}

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Column names as the file claims them; may carry stray whitespace and
    /// embedded newlines until `normalize_headers` runs.
    pub headers: Vec<String>,
    /// Data rows, one `Cell` per column. Short rows are legal.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Trim header names and collapse embedded newlines into single spaces.
    pub fn normalize_headers(&mut self) {
        for header in &mut self.headers {
            let cleaned = header.replace('\n', " ");
            *header = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        }
    }

    /// Index of the first column whose name contains `token`, case-insensitively.
    pub fn find_column(&self, token: &str) -> Option<usize> {
        let token = token.to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_lowercase().contains(&token))
    }
}
