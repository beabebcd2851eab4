//! tradebook-core: trade records, the deduplicating collection, and the lookup
//! tables consulted while enriching extracted trades.

pub mod activity;
pub mod collection;
pub mod enrichment;
pub mod outcome;

pub use activity::{ActivityType, DataSource, TradeRecord};
pub use collection::{CollectionError, Integration, TradeCollection};
pub use enrichment::{CurrencyConversion, RateLookup, Resolution, SymbolTables};
pub use outcome::{DocumentOutcome, ExtractionFailure, Severity};
