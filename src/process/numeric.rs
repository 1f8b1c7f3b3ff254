use crate::process::table::Cell;

/// Convert any cell into a definite float. Total function: garbage degrades
/// to 0.0 so a single bad cell never aborts the table.
///
/// Text goes through a direct parse first, then a European re-read where `.`
/// is a thousands separator and `,` the decimal point, with `€`/`$` stripped.
pub fn to_number(cell: &Cell) -> f64 {
    match cell {
        Cell::Empty | Cell::Date(_) => 0.0,
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Number(_) => 0.0,
        Cell::Text(s) => parse_number_str(s),
    }
}

fn parse_number_str(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return if v.is_finite() { v } else { 0.0 };
    }
    let stripped = trimmed.replace(['€', '$'], "");
    let european = stripped.trim().replace('.', "").replace(',', ".");
    match european.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Format an amount the Italian way: `€ 1.234,50`. Deterministic; no locale
/// involvement.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let units = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, c) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("€ {}{},{:02}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_numbers_pass_through() {
        assert_eq!(to_number(&Cell::Number(12.5)), 12.5);
        assert_eq!(to_number(&Cell::Text("3.25".into())), 3.25);
        assert_eq!(to_number(&Cell::Text(" 7 ".into())), 7.0);
    }

    #[test]
    fn european_format_parses() {
        assert_eq!(to_number(&Cell::Text("1.234,56".into())), 1234.56);
        assert_eq!(to_number(&Cell::Text("12,5".into())), 12.5);
    }

    #[test]
    fn currency_symbols_are_stripped() {
        assert_eq!(to_number(&Cell::Text("€ 42".into())), 42.0);
        assert_eq!(to_number(&Cell::Text("€ 1.000,00".into())), 1000.0);
        assert_eq!(to_number(&Cell::Text("$ 9,99".into())), 9.99);
    }

    #[test]
    fn garbage_degrades_to_zero() {
        assert_eq!(to_number(&Cell::Text("abc".into())), 0.0);
        assert_eq!(to_number(&Cell::Empty), 0.0);
        assert_eq!(to_number(&Cell::Number(f64::NAN)), 0.0);
        assert_eq!(to_number(&Cell::Text("NaN".into())), 0.0);
    }

    #[test]
    fn currency_formatting_groups_thousands() {
        assert_eq!(format_currency(1234.5), "€ 1.234,50");
        assert_eq!(format_currency(1_234_567.891), "€ 1.234.567,89");
        assert_eq!(format_currency(0.0), "€ 0,00");
        assert_eq!(format_currency(-42.0), "€ -42,00");
    }
}
