//! tradebook-fx: historical EUR reference rates for converting execution prices

pub mod ecb;
pub mod rates;

pub use ecb::{fetch_series, load_rates_file, merge_observations, write_rates_file, Observation};
pub use rates::{RateTable, BASE_CURRENCY};
