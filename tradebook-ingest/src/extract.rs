//! Field extraction from one document's text, followed by the optional
//! enrichment steps (ignore list, identifier remap, currency conversion).

use tradebook_core::{
    CurrencyConversion, DataSource, ExtractionFailure, Resolution, SymbolTables,
};

use crate::parsers::dkb::{SettlementPatterns, DEFAULT_CURRENCY};
use crate::types::{ExtractedTrade, Extraction};

/// Turns settlement-note text into trades.
///
/// Steps run in a fixed order and the first failing one decides the outcome:
/// identifier, ignore check, timestamp, quantity, price, remap, conversion.
#[derive(Debug)]
pub struct Extractor {
    patterns: SettlementPatterns,
    account_id: String,
    currency: String,
    tables: SymbolTables,
    conversion: Option<CurrencyConversion>,
}

impl Extractor {
    pub fn new(patterns: SettlementPatterns, account_id: impl Into<String>) -> Self {
        Self {
            patterns,
            account_id: account_id.into(),
            currency: DEFAULT_CURRENCY.to_string(),
            tables: SymbolTables::default(),
            conversion: None,
        }
    }

    /// Source currency of extracted prices; must be the literal the price
    /// pattern is anchored to.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_tables(mut self, tables: SymbolTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_conversion(mut self, conversion: CurrencyConversion) -> Self {
        self.conversion = Some(conversion);
        self
    }

    pub fn tables(&self) -> &SymbolTables {
        &self.tables
    }

    pub fn extract(&self, text: &str) -> Result<Extraction, ExtractionFailure> {
        let identifier = self
            .patterns
            .identifier(text)
            .ok_or(ExtractionFailure::MissingIdentifier)?;

        if self.tables.is_ignored(identifier) {
            return Ok(Extraction::Ignored(identifier.to_string()));
        }

        let date = self
            .patterns
            .timestamp(text)
            .ok_or(ExtractionFailure::MissingDate)?;

        let quantity = self
            .patterns
            .quantity(text)
            .ok_or(ExtractionFailure::MissingQuantity)?;
        if quantity <= 0.0 {
            return Err(ExtractionFailure::InvalidQuantity(quantity));
        }

        let mut unit_price = self
            .patterns
            .unit_price(text)
            .ok_or(ExtractionFailure::MissingPrice)?;

        let (symbol, data_source) = match self.tables.resolve(identifier) {
            Resolution::Raw => (identifier.to_string(), DataSource::Manual),
            Resolution::Ticker(ticker) => (ticker.to_string(), DataSource::Yahoo),
            Resolution::Unmapped => {
                return Err(ExtractionFailure::UnmappedIdentifier(identifier.to_string()));
            }
        };

        let mut currency = self.currency.clone();
        if let Some(conv) = &self.conversion {
            unit_price = conv
                .rates
                .convert(unit_price, &currency, &conv.target, date.date())
                .ok_or_else(|| ExtractionFailure::ConversionUnavailable {
                    from: currency.clone(),
                    to: conv.target.clone(),
                    date: date.date(),
                })?;
            currency = conv.target.clone();
        }

        Ok(Extraction::Trade(ExtractedTrade {
            account_id: self.account_id.clone(),
            identifier: identifier.to_string(),
            symbol,
            quantity,
            unit_price,
            currency,
            date,
            data_source,
        }))
    }
}
