use serde::Deserialize;

/// A numeric form field as the user typed it: either a JSON number or text
/// such as `"6000"`, `"1.234,5"` or `"2 500 000"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// The parsed value, or `fallback` when the field is blank or garbage.
    pub fn resolve(&self, fallback: f64) -> f64 {
        match self {
            NumberInput::Number(value) if value.is_finite() => *value,
            NumberInput::Number(_) => fallback,
            NumberInput::Text(text) => parse_number(text, fallback),
        }
    }
}

/// Lenient number parsing for hand-typed amounts.
///
/// A comma marks the decimal separator and turns every `.` into a thousands
/// separator (`1.234,5` is 1234.5). Without a comma a single `.` is the
/// decimal point and repeated dots are thousands separators. Spaces,
/// non-breaking spaces and underscores are ignored.
pub fn parse_number(text: &str, fallback: f64) -> f64 {
    let compact: String = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}' | '_'))
        .collect();
    if compact.is_empty() {
        return fallback;
    }

    let normalized = if compact.contains(',') {
        compact.replace('.', "").replacen(',', ".", 1)
    } else if compact.matches('.').count() > 1 {
        compact.replace('.', "")
    } else {
        compact
    };

    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_decimal_point_numbers() {
        assert_eq!(parse_number("6000", 0.0), 6_000.0);
        assert_eq!(parse_number("8.5", 0.0), 8.5);
        assert_eq!(parse_number("-3", 0.0), -3.0);
        assert_eq!(parse_number("1e3", 0.0), 1_000.0);
    }

    #[test]
    fn parses_decimal_comma_with_thousands_dots() {
        assert_eq!(parse_number("1.234,5", 0.0), 1_234.5);
        assert_eq!(parse_number("4,25", 0.0), 4.25);
        assert_eq!(parse_number("2.500.000", 0.0), 2_500_000.0);
    }

    #[test]
    fn ignores_grouping_spaces() {
        assert_eq!(parse_number("2 500 000", 0.0), 2_500_000.0);
        assert_eq!(parse_number("450\u{a0}000", 0.0), 450_000.0);
    }

    #[test]
    fn blank_or_garbage_falls_back() {
        assert_eq!(parse_number("", 7.0), 7.0);
        assert_eq!(parse_number("   ", 7.0), 7.0);
        assert_eq!(parse_number("abc", 7.0), 7.0);
        assert_eq!(parse_number("1,2,3", 7.0), 7.0);
        assert_eq!(parse_number("inf", 7.0), 7.0);
    }

    #[test]
    fn number_input_accepts_json_numbers_and_strings() {
        let values: Vec<NumberInput> =
            serde_json::from_str(r#"[12.5, "1.000,5", ""]"#).expect("valid json");
        assert_eq!(values[0].resolve(0.0), 12.5);
        assert_eq!(values[1].resolve(0.0), 1_000.5);
        assert_eq!(values[2].resolve(3.0), 3.0);
    }
}
