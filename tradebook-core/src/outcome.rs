//! Per-document failure and outcome taxonomy.
//!
//! Nothing in here aborts a batch: every variant describes why one document
//! did or did not contribute a record.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Why a document could not be turned into a record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionFailure {
    #[error("no security identifier found")]
    MissingIdentifier,

    #[error("no settlement date found")]
    MissingDate,

    #[error("no quantity found")]
    MissingQuantity,

    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(f64),

    #[error("no execution price found")]
    MissingPrice,

    #[error("identifier {0} has no entry in the remap table")]
    UnmappedIdentifier(String),

    #[error("no {from}/{to} rate available for {date}")]
    ConversionUnavailable {
        from: String,
        to: String,
        date: NaiveDate,
    },
}

/// How loudly a failure should be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The document itself is unparseable
    Structural,
    /// External lookup data is missing
    Enrichment,
}

impl ExtractionFailure {
    pub fn severity(&self) -> Severity {
        match self {
            ExtractionFailure::UnmappedIdentifier(_)
            | ExtractionFailure::ConversionUnavailable { .. } => Severity::Enrichment,
            _ => Severity::Structural,
        }
    }
}

/// Final disposition of a single input document
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    /// Record appended to the collection
    Added { symbol: String, date: NaiveDateTime },
    /// A record with the same settlement timestamp already exists
    Duplicate { symbol: String, date: NaiveDateTime },
    /// Identifier is on the ignore list
    Ignored { identifier: String },
    Failed(ExtractionFailure),
    /// The document's text could not be read at all
    Unreadable(String),
    /// Right extension, but the name does not mark a settlement confirmation
    NotATradeDocument,
    WrongExtension,
}

impl DocumentOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, DocumentOutcome::Added { .. })
    }

    /// Short label used in logs and the run summary
    pub fn label(&self) -> &'static str {
        match self {
            DocumentOutcome::Added { .. } => "added",
            DocumentOutcome::Duplicate { .. } => "duplicate",
            DocumentOutcome::Ignored { .. } => "ignored",
            DocumentOutcome::Failed(f) => match f.severity() {
                Severity::Structural => "unparseable",
                Severity::Enrichment => "enrichment-gap",
            },
            DocumentOutcome::Unreadable(_) => "unreadable",
            DocumentOutcome::NotATradeDocument => "not-a-trade",
            DocumentOutcome::WrongExtension => "wrong-extension",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_split() {
        assert_eq!(ExtractionFailure::MissingIdentifier.severity(), Severity::Structural);
        assert_eq!(ExtractionFailure::MissingPrice.severity(), Severity::Structural);
        assert_eq!(
            ExtractionFailure::UnmappedIdentifier("US0000000001".into()).severity(),
            Severity::Enrichment
        );
        let gap = ExtractionFailure::ConversionUnavailable {
            from: "EUR".into(),
            to: "USD".into(),
            date: NaiveDate::from_ymd_opt(2023, 5, 13).unwrap(),
        };
        assert_eq!(gap.severity(), Severity::Enrichment);
        assert_eq!(gap.to_string(), "no EUR/USD rate available for 2023-05-13");
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(DocumentOutcome::Failed(ExtractionFailure::MissingDate).label(), "unparseable");
        assert_eq!(
            DocumentOutcome::Failed(ExtractionFailure::UnmappedIdentifier("X".into())).label(),
            "enrichment-gap"
        );
        assert_eq!(DocumentOutcome::NotATradeDocument.label(), "not-a-trade");
    }
}
