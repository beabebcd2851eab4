use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tradebook_core::{ActivityType, DataSource, TradeRecord};

/// A trade read out of one settlement document, before the caller decides
/// whether it was a buy or a sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTrade {
    pub account_id: String,
    /// Raw identifier as printed in the document
    pub identifier: String,
    /// Identifier or remapped ticker, whichever goes into the record
    pub symbol: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub currency: String,
    pub date: NaiveDateTime,
    pub data_source: DataSource,
}

impl ExtractedTrade {
    pub fn into_record(self, activity_type: ActivityType) -> TradeRecord {
        TradeRecord::new(
            self.account_id,
            self.symbol,
            activity_type,
            self.quantity,
            self.unit_price,
            self.currency,
            self.date,
        )
        .with_data_source(self.data_source)
    }
}

/// Successful extractor result: either a trade or a deliberate exclusion
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Trade(ExtractedTrade),
    /// Identifier is on the ignore list; not an error
    Ignored(String),
}
