//! German-locale number and date normalization.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Combine the integer and fractional captures of a comma-decimal number.
///
/// The integer part may carry dotted thousands groups (`1.234`). The fraction
/// is read as the digits after the decimal separator, so `"5"` and `"50"` both
/// mean one half and `"05"` means five hundredths.
pub fn parse_comma_decimal(integer: &str, fraction: Option<&str>) -> Option<f64> {
    let integer = integer.trim().replace('.', "");
    if integer.is_empty() || !integer.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match fraction.map(str::trim).filter(|f| !f.is_empty()) {
        Some(frac) if frac.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{integer}.{frac}").parse().ok()
        }
        Some(_) => None,
        None => integer.parse().ok(),
    }
}

/// Parse `DD.MM.YYYY`.
pub fn parse_german_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d.%m.%Y").ok()
}

/// Parse `DD.MM.YYYY` plus `HH:MM:SS` into one local timestamp.
pub fn parse_german_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = parse_german_date(date)?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S").ok()?;
    Some(date.and_time(time))
}

/// A date-only settlement day, placed at midnight.
pub fn at_midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_digits_are_decimal_places() {
        assert_eq!(parse_comma_decimal("10", Some("5")), Some(10.5));
        assert_eq!(parse_comma_decimal("10", Some("50")), Some(10.5));
        assert_eq!(parse_comma_decimal("10", Some("05")), Some(10.05));
        assert_eq!(parse_comma_decimal("0", Some("123456")), Some(0.123456));
    }

    #[test]
    fn test_integer_only() {
        assert_eq!(parse_comma_decimal("3", None), Some(3.0));
        assert_eq!(parse_comma_decimal("3", Some("")), Some(3.0));
    }

    #[test]
    fn test_thousands_groups() {
        assert_eq!(parse_comma_decimal("1.234", Some("56")), Some(1234.56));
        assert_eq!(parse_comma_decimal("12.000", None), Some(12000.0));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_comma_decimal("", Some("5")), None);
        assert_eq!(parse_comma_decimal("1a", None), None);
        assert_eq!(parse_comma_decimal("1", Some("x")), None);
    }

    #[test]
    fn test_german_dates() {
        assert_eq!(
            parse_german_date("15.03.2024"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(parse_german_date("31.02.2024"), None);

        let dt = parse_german_datetime("12.05.2023", "09:03:12").unwrap();
        assert_eq!(dt.to_string(), "2023-05-12 09:03:12");
        assert_eq!(parse_german_datetime("12.05.2023", "25:00:00"), None);

        let midnight = at_midnight(NaiveDate::from_ymd_opt(2023, 5, 12).unwrap());
        assert_eq!(midnight.to_string(), "2023-05-12 00:00:00");
    }
}
