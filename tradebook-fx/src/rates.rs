//! In-memory historical exchange rates.
//!
//! Rates are stored the way the ECB publishes them: units of a currency per
//! one EUR, per business day. Any pair is derived through EUR.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tradebook_core::RateLookup;

use crate::ecb::Observation;

/// Reference currency of every stored rate
pub const BASE_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, Default)]
pub struct RateTable {
    series: HashMap<String, BTreeMap<NaiveDate, f64>>,
    max_fallback_days: i64,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_observations(observations: impl IntoIterator<Item = Observation>) -> Self {
        let mut table = Self::new();
        for obs in observations {
            table.insert(&obs.currency, obs.date, obs.rate);
        }
        table
    }

    /// Allow a rate published up to `days` before the requested date
    /// (weekends, bank holidays). Zero means exact dates only.
    pub fn with_max_fallback_days(mut self, days: i64) -> Self {
        self.max_fallback_days = days.max(0);
        self
    }

    /// Store `rate` units of `currency` per EUR on `date`.
    pub fn insert(&mut self, currency: &str, date: NaiveDate, rate: f64) {
        if rate > 0.0 && rate.is_finite() {
            self.series
                .entry(currency.to_string())
                .or_default()
                .insert(date, rate);
        }
    }

    pub fn currencies(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.series.keys().map(String::as_str).collect();
        out.sort_unstable();
        out
    }

    /// Number of stored (currency, date) rates
    pub fn len(&self) -> usize {
        self.series.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Units of `currency` per EUR on `date`, honouring the fallback window.
    pub fn eur_rate(&self, currency: &str, date: NaiveDate) -> Option<f64> {
        if currency == BASE_CURRENCY {
            return Some(1.0);
        }
        let (found, rate) = self.series.get(currency)?.range(..=date).next_back()?;
        ((date - *found).num_days() <= self.max_fallback_days).then_some(*rate)
    }
}

impl RateLookup for RateTable {
    fn rate(&self, from: &str, to: &str, date: NaiveDate) -> Option<f64> {
        if from == to {
            return Some(1.0);
        }
        let from_per_eur = self.eur_rate(from, date)?;
        let to_per_eur = self.eur_rate(to, date)?;
        Some(to_per_eur / from_per_eur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn table() -> RateTable {
        let mut t = RateTable::new();
        // Friday 2024-01-05
        t.insert("USD", d(5), 1.0921);
        t.insert("CHF", d(5), 0.9314);
        t.insert("USD", d(8), 1.0946);
        t
    }

    #[test]
    fn test_direct_inverse_and_cross() {
        let t = table();
        assert_eq!(t.rate("EUR", "USD", d(5)), Some(1.0921));
        assert!((t.rate("USD", "EUR", d(5)).unwrap() - 1.0 / 1.0921).abs() < 1e-12);
        assert!((t.rate("USD", "CHF", d(5)).unwrap() - 0.9314 / 1.0921).abs() < 1e-12);
        assert_eq!(t.rate("GBP", "GBP", d(5)), Some(1.0));
    }

    #[test]
    fn test_exact_date_by_default() {
        let t = table();
        assert_eq!(t.rate("EUR", "USD", d(6)), None);
        assert_eq!(t.rate("EUR", "USD", d(4)), None);
        assert_eq!(t.rate("EUR", "GBP", d(5)), None);
    }

    #[test]
    fn test_fallback_window() {
        let t = table().with_max_fallback_days(2);
        // Saturday and Sunday reuse Friday's rate
        assert_eq!(t.rate("EUR", "USD", d(6)), Some(1.0921));
        assert_eq!(t.rate("EUR", "USD", d(7)), Some(1.0921));
        assert_eq!(t.rate("EUR", "USD", d(8)), Some(1.0946));
        // Nothing before the first observation
        assert_eq!(t.rate("EUR", "USD", d(4)), None);

        let narrow = table().with_max_fallback_days(1);
        assert_eq!(narrow.rate("EUR", "CHF", d(7)), None);
    }

    #[test]
    fn test_convert_through_trait() {
        let t = table();
        let usd = t.convert(100.0, "EUR", "USD", d(5)).unwrap();
        assert!((usd - 109.21).abs() < 1e-9);
    }

    #[test]
    fn test_bad_rates_are_not_stored() {
        let mut t = RateTable::new();
        t.insert("USD", d(5), 0.0);
        t.insert("USD", d(5), f64::NAN);
        assert!(t.is_empty());
        assert!(t.currencies().is_empty());
    }
}
