//! Brazilian Portuguese number and date formatting.
//!
//! Every user-facing quantity in the report uses pt-BR conventions: `,` as
//! the decimal separator, `.` as the thousands separator, `R$` currency
//! prefix and 3-letter Portuguese month abbreviations.

use num_format::{Locale, ToFormattedString};

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Placeholder shown wherever a monthly value is null in the payload.
pub const UNAVAILABLE: &str = "Indisponível";

// CLDR `pt` defaults to the Brazilian convention: "." grouping, "," decimal.
const GROUPING: Locale = Locale::pt;

/// Formats a currency amount as `R$ 1.234,50`.
///
/// Rounds half away from zero to 2 decimals. Negative amounts render with a
/// leading minus: `-R$ 1.234,50`.
pub fn format_brl(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let integer = (cents / 100).abs().to_formatted_string(&GROUPING);
    let fraction = (cents % 100).abs();
    format!("{sign}R$ {integer},{fraction:02}")
}

/// Formats a decimal with 1 place and a comma separator: `13,8`.
///
/// Rounds half away from zero.
pub fn format_decimal_1(value: f64) -> String {
    let tenths = (value * 10.0).round() as i64;
    let sign = if tenths < 0 { "-" } else { "" };
    format!("{sign}{},{}", (tenths / 10).abs(), (tenths % 10).abs())
}

/// Percentage labels share the 1-decimal shape: `66,0`.
pub fn format_percent_1(value: f64) -> String {
    format_decimal_1(value)
}

/// Formats a plain decimal with 2 decimals and a comma separator: `12,34`.
pub fn format_decimal_2(value: f64) -> String {
    let hundredths = (value * 100.0).round() as i64;
    let sign = if hundredths < 0 { "-" } else { "" };
    format!(
        "{sign}{},{:02}",
        (hundredths / 100).abs(),
        (hundredths % 100).abs()
    )
}

/// Parses a string produced by [`format_brl`] back into a value.
///
/// Strips the `R$` prefix and grouping separators and converts the decimal
/// comma, so `format_brl` round-trips to 2 decimal places.
pub fn parse_brl(label: &str) -> Option<f64> {
    let negative = label.trim_start().starts_with('-');
    let cleaned: String = label
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();
    let normalized = cleaned.replace(',', ".");
    let value = normalized.parse::<f64>().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::{format_brl, format_decimal_2, format_percent_1, parse_brl};

    #[test]
    fn formats_brl_with_grouping_and_comma() {
        assert_eq!(format_brl(1234.5), "R$ 1.234,50");
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(99_999_999.99), "R$ 99.999.999,99");
        assert_eq!(format_brl(-1234.5), "-R$ 1.234,50");
    }

    #[test]
    fn brl_rounds_half_away_from_zero() {
        assert_eq!(format_brl(0.005), "R$ 0,01");
        assert_eq!(format_brl(-0.005), "-R$ 0,01");
    }

    #[test]
    fn brl_round_trips_to_two_decimals() {
        let samples = [
            0.0,
            0.01,
            1.0,
            999.99,
            1234.5,
            1_000_000.0,
            76_543_210.98,
            99_999_999.99,
        ];
        for value in samples {
            let parsed = parse_brl(&format_brl(value)).expect("parse failed");
            assert!(
                (parsed - value).abs() < 0.005,
                "{value} round-tripped as {parsed}"
            );
        }
    }

    #[test]
    fn formats_percent_with_one_decimal() {
        assert_eq!(format_percent_1(66.0), "66,0");
        assert_eq!(format_percent_1(65.967), "66,0");
        assert_eq!(format_percent_1(0.05), "0,1");
        assert_eq!(format_percent_1(-3.25), "-3,3");
    }

    #[test]
    fn formats_decimal_with_two_places() {
        assert_eq!(format_decimal_2(12.345), "12,35");
        assert_eq!(format_decimal_2(7.0), "7,00");
    }
}
