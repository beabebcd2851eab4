//! Filename conventions that decide whether a document is a buy or sell
//! settlement note.
//!
//! DKB names its downloads like `Kauf_Wertpapierabrechnung_2023-05-12_....pdf`
//! and `Verkauf_Wertpapierabrechnung_....pdf`; everything else in the
//! download folder (statements, tax notes) is skipped.

use serde::{Deserialize, Serialize};
use tradebook_core::ActivityType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRules {
    pub buy_prefix: String,
    pub sell_prefix: String,
    /// Substring every settlement confirmation name contains
    pub marker: String,
    /// File extension without the dot, compared case-insensitively
    pub extension: String,
}

impl Default for DocumentRules {
    fn default() -> Self {
        Self {
            buy_prefix: "Kauf_".to_string(),
            sell_prefix: "Verkauf_".to_string(),
            marker: "Wertpapierabrechnung".to_string(),
            extension: "pdf".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Trade(ActivityType),
    NotATradeDocument,
    WrongExtension,
}

impl DocumentRules {
    pub fn classify(&self, file_name: &str) -> Classification {
        let has_extension = file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(&self.extension));
        if !has_extension {
            return Classification::WrongExtension;
        }
        if !file_name.contains(&self.marker) {
            return Classification::NotATradeDocument;
        }

        if file_name.starts_with(&self.buy_prefix) {
            Classification::Trade(ActivityType::Buy)
        } else if file_name.starts_with(&self.sell_prefix) {
            Classification::Trade(ActivityType::Sell)
        } else {
            Classification::NotATradeDocument
        }
    }
}
