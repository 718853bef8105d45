//! Numeric coercion of form input and display formatting.

/// Parse a number from user input.
///
/// Empty, non-numeric, NaN and infinite input all become 0.
pub fn parse_number(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Parse a quantity, rate or tax rate: like [`parse_number`], but negative
/// input also becomes 0.
pub fn parse_non_negative(input: &str) -> f64 {
    sanitize_non_negative(parse_number(input))
}

/// Map NaN, infinite and negative values to 0.
pub fn sanitize_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Format an amount with two decimals, e.g. `130.00`.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Format an amount with a dollar sign, e.g. `$50.00`.
pub fn format_money(value: f64) -> String {
    format!("${}", format_amount(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12.5"), 12.5);
        assert_eq!(parse_number("  3 "), 3.0);
        assert_eq!(parse_number("-4"), -4.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number("NaN"), 0.0);
        assert_eq!(parse_number("inf"), 0.0);
    }

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(parse_non_negative("-4"), 0.0);
        assert_eq!(parse_non_negative("4"), 4.0);
        assert_eq!(parse_non_negative("x"), 0.0);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_amount(130.0), "130.00");
        assert_eq!(format_amount(2.0 / 3.0), "0.67");
        assert_eq!(format_money(50.0), "$50.00");
    }
}
