//! tradebook-ingest: settlement-note text extraction, filename classification,
//! and the batch run that feeds a trade collection.

pub mod batch;
pub mod classify;
pub mod extract;
pub mod normalize;
pub mod parsers;
pub mod pdf;
pub mod types;

pub use batch::{list_documents, Batch, BatchReport};
pub use classify::{Classification, DocumentRules};
pub use extract::Extractor;
pub use parsers::dkb::SettlementPatterns;
pub use pdf::{InMemoryText, PdfText, TextSource};
pub use types::{ExtractedTrade, Extraction};
