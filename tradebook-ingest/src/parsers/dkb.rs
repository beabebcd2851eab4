//! DKB securities settlement note ("Wertpapierabrechnung") field patterns
//!
//! Expected text fragments on the first page after PDF-to-text:
//!   Nominale Wertpapierbezeichnung ISIN (WKN)
//!   Stück 10,5 APPLE INC. US0378331005 (865985)
//!   Schlusstag/-Zeit 12.05.2023 09:03:12 Auftraggeber Max Mustermann
//!   Ausführungskurs 123,45 EUR Auftragserteilung/ -ort Online-Banking
//!
//! Older notes only print `Schlusstag 12.05.2023` without a time.

use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use regex::Regex;

use crate::normalize::{at_midnight, parse_comma_decimal, parse_german_date, parse_german_datetime};

/// Country prefixes of the identifiers found in DKB notes
pub const DEFAULT_PREFIXES: [&str; 7] = ["IE", "US", "CA", "CH", "GB", "AU", "KY"];

/// Currency printed after the execution price
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Integer part (optionally with dotted thousands groups), then an optional
/// comma and fraction.
const NUMBER: &str = r"(\d{1,3}(?:\.\d{3})+|\d+)(?:,(\d+))?";

/// Compiled field patterns for one document template.
#[derive(Debug, Clone)]
pub struct SettlementPatterns {
    identifier: Regex,
    date_time: Regex,
    date: Regex,
    quantity: Regex,
    price: Regex,
}

impl SettlementPatterns {
    /// Build patterns for the given identifier prefixes and price currency.
    pub fn new<S: AsRef<str>>(prefixes: &[S], currency: &str) -> Result<Self> {
        if prefixes.is_empty() {
            bail!("at least one identifier prefix is required");
        }
        let alternatives: Vec<String> = prefixes
            .iter()
            .map(|p| regex::escape(p.as_ref()))
            .collect();

        Ok(Self {
            identifier: Regex::new(&format!(r"((?:{})[A-Z0-9]{{10}})", alternatives.join("|")))?,
            date_time: Regex::new(
                r"Schlusstag/-Zeit\s*(\d{2}\.\d{2}\.\d{4})\s+(\d{2}:\d{2}:\d{2})",
            )?,
            date: Regex::new(r"Schlusstag\s*(\d{2}\.\d{2}\.\d{4})")?,
            quantity: Regex::new(&format!(r"St(?:ü|u)ck\s*{NUMBER}"))?,
            price: Regex::new(&format!(
                r"Ausf(?:ü|u)hrungskurs\s*{NUMBER}\s+{}\b",
                regex::escape(currency)
            ))?,
        })
    }

    /// Patterns for DKB notes priced in EUR.
    pub fn dkb() -> Result<Self> {
        Self::new(&DEFAULT_PREFIXES, DEFAULT_CURRENCY)
    }

    /// First security identifier in the text
    pub fn identifier<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.identifier
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Settlement timestamp, preferring the combined date+time field
    pub fn timestamp(&self, text: &str) -> Option<NaiveDateTime> {
        if let Some(caps) = self.date_time.captures(text) {
            if let Some(dt) = parse_german_datetime(&caps[1], &caps[2]) {
                return Some(dt);
            }
        }
        self.date
            .captures(text)
            .and_then(|caps| parse_german_date(&caps[1]))
            .map(at_midnight)
    }

    pub fn quantity(&self, text: &str) -> Option<f64> {
        let caps = self.quantity.captures(text)?;
        parse_comma_decimal(&caps[1], caps.get(2).map(|m| m.as_str()))
    }

    /// Execution price; only matches when followed by the configured currency
    pub fn unit_price(&self, text: &str) -> Option<f64> {
        let caps = self.price.captures(text)?;
        parse_comma_decimal(&caps[1], caps.get(2).map(|m| m.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const NOTE: &str = r#"
Wertpapier Abrechnung Kauf
Nominale Wertpapierbezeichnung ISIN (WKN)
Stück 10,5 APPLE INC. US0378331005 (865985)
Handels-/Ausführungsplatz Tradegate
Schlusstag/-Zeit 12.05.2023 09:03:12 Auftraggeber Max Mustermann
Ausführungskurs 123,45 EUR Auftragserteilung/ -ort Online-Banking
Kurswert 1.296,23- EUR
"#;

    fn patterns() -> SettlementPatterns {
        SettlementPatterns::dkb().unwrap()
    }

    #[test]
    fn test_parses_full_note() {
        let p = patterns();
        assert_eq!(p.identifier(NOTE), Some("US0378331005"));
        assert_eq!(
            p.timestamp(NOTE),
            NaiveDate::from_ymd_opt(2023, 5, 12).unwrap().and_hms_opt(9, 3, 12)
        );
        assert_eq!(p.quantity(NOTE), Some(10.5));
        assert_eq!(p.unit_price(NOTE), Some(123.45));
    }

    #[test]
    fn test_date_only_falls_back_to_midnight() {
        let text = "Schlusstag 03.01.2022 Auftraggeber";
        let expected = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap().and_hms_opt(0, 0, 0);
        assert_eq!(patterns().timestamp(text), expected);
    }

    #[test]
    fn test_time_on_next_line() {
        let text = "Schlusstag/-Zeit 03.01.2022\n  15:30:00";
        let expected = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap().and_hms_opt(15, 30, 0);
        assert_eq!(patterns().timestamp(text), expected);
    }

    #[test]
    fn test_impossible_combined_date_uses_date_only_field() {
        let text = "Schlusstag/-Zeit 31.02.2022 10:00:00\nSchlusstag 01.03.2022";
        let expected = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap().and_hms_opt(0, 0, 0);
        assert_eq!(patterns().timestamp(text), expected);
        assert_eq!(patterns().timestamp("Schlusstag/-Zeit 31.02.2022 10:00:00"), None);
    }

    #[test]
    fn test_quantity_variants() {
        let p = patterns();
        assert_eq!(p.quantity("Stück 3 FOO"), Some(3.0));
        assert_eq!(p.quantity("Stück 10,5 FOO"), Some(10.5));
        assert_eq!(p.quantity("Stück 10,50 FOO"), Some(10.5));
        assert_eq!(p.quantity("Stück 0,05 FOO"), Some(0.05));
        assert_eq!(p.quantity("Stuck 1.500 FOO"), Some(1500.0));
        assert_eq!(p.quantity("Nominale 10"), None);
    }

    #[test]
    fn test_price_needs_currency_literal() {
        let p = patterns();
        assert_eq!(p.unit_price("Ausführungskurs 123,45 EUR"), Some(123.45));
        assert_eq!(p.unit_price("Ausführungskurs 1.234,5 EUR"), Some(1234.5));
        assert_eq!(p.unit_price("Ausführungskurs 123,45 USD"), None);
        assert_eq!(p.unit_price("Kurswert 123,45 EUR"), None);
        assert_eq!(p.unit_price("Ausführungskurs 1,0 EURO"), None);
        assert_eq!(p.unit_price("Ausführungskurs 1,0 EUR\nAuftrag"), Some(1.0));
    }

    #[test]
    fn test_custom_currency_and_prefixes() {
        let p = SettlementPatterns::new(&["DE"], "USD").unwrap();
        assert_eq!(p.unit_price("Ausführungskurs 99,9 USD"), Some(99.9));
        assert_eq!(p.unit_price("Ausführungskurs 99,9 EUR"), None);
        assert_eq!(p.identifier("ISIN DE0005140008 US0378331005"), Some("DE0005140008"));
        assert_eq!(p.identifier("US0378331005"), None);
    }

    #[test]
    fn test_identifier_requires_known_prefix_and_length() {
        let p = patterns();
        assert_eq!(p.identifier("DE0005140008"), None);
        assert_eq!(p.identifier("US03783310"), None);
        assert_eq!(p.identifier("xx IE00B4L5Y983 yy"), Some("IE00B4L5Y983"));
    }

    #[test]
    fn test_empty_prefix_list_rejected() {
        assert!(SettlementPatterns::new::<&str>(&[], "EUR").is_err());
    }
}
