//! Read-only lookup state consulted after the raw fields are extracted:
//! identifier ignore/remap tables and the historical rate collaborator.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Identifier ignore set and optional identifier -> ticker remap table.
///
/// Built once at startup and passed to the extractor; never mutated during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTables {
    ignore: HashSet<String>,
    remap: Option<HashMap<String, String>>,
}

/// Result of resolving an extracted identifier against the tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Remapping disabled; keep the raw identifier
    Raw,
    /// Remapping enabled and the identifier has a ticker
    Ticker(&'a str),
    /// Remapping enabled but the identifier is missing from the table
    Unmapped,
}

impl SymbolTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignored<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(identifiers.into_iter().map(Into::into));
        self
    }

    /// Enable the remap path. An empty table still enables it, so every
    /// identifier then counts as unmapped.
    pub fn with_remap<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = self.remap.get_or_insert_with(HashMap::new);
        table.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn is_ignored(&self, identifier: &str) -> bool {
        self.ignore.contains(identifier)
    }

    pub fn resolve(&self, identifier: &str) -> Resolution<'_> {
        match &self.remap {
            None => Resolution::Raw,
            Some(table) => match table.get(identifier) {
                Some(ticker) => Resolution::Ticker(ticker),
                None => Resolution::Unmapped,
            },
        }
    }

    pub fn ignored_count(&self) -> usize {
        self.ignore.len()
    }
}

/// Historical exchange-rate lookup
pub trait RateLookup {
    /// Units of `to` per one unit of `from` on `date`, if known.
    fn rate(&self, from: &str, to: &str, date: NaiveDate) -> Option<f64>;

    fn convert(&self, amount: f64, from: &str, to: &str, date: NaiveDate) -> Option<f64> {
        if from == to {
            return Some(amount);
        }
        self.rate(from, to, date).map(|r| amount * r)
    }
}

/// Target currency plus the rate source used to reach it
pub struct CurrencyConversion {
    pub target: String,
    pub rates: Box<dyn RateLookup>,
}

impl CurrencyConversion {
    pub fn new(target: impl Into<String>, rates: impl RateLookup + 'static) -> Self {
        Self {
            target: target.into(),
            rates: Box::new(rates),
        }
    }
}

impl std::fmt::Debug for CurrencyConversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyConversion")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
