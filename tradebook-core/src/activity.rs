//! Trade activity records as persisted in the output collection

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of a trade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActivityType {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

/// Provenance of a record's pricing.
///
/// `Manual` records carry the raw identifier from the document; `Yahoo`
/// records carry a remapped ticker that an external price feed understands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataSource {
    #[default]
    Manual,
    Yahoo,
}

/// One executed trade, extracted from one settlement document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    /// Opaque account identifier, fixed per run
    pub account_id: String,
    /// Raw identifier (ISIN) or remapped ticker
    pub symbol: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Number of shares; fractional shares allowed
    pub quantity: f64,
    /// Price per share in `currency`
    pub unit_price: f64,
    pub currency: String,
    /// Settlement timestamp; date-only documents land on midnight
    pub date: NaiveDateTime,
    pub data_source: DataSource,
    #[serde(default)]
    pub fee: f64,
    #[serde(default)]
    pub comment: String,
}

impl TradeRecord {
    pub fn new(
        account_id: impl Into<String>,
        symbol: impl Into<String>,
        activity_type: ActivityType,
        quantity: f64,
        unit_price: f64,
        currency: impl Into<String>,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            symbol: symbol.into(),
            activity_type,
            quantity,
            unit_price,
            currency: currency.into(),
            date,
            data_source: DataSource::Manual,
            fee: 0.0,
            comment: String::new(),
        }
    }

    pub fn with_data_source(mut self, data_source: DataSource) -> Self {
        self.data_source = data_source;
        self
    }

}
