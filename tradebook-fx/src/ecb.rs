//! ECB euro foreign exchange reference rates.
//!
//! The data API serves one daily series per currency as CSV:
//!   KEY,FREQ,CURRENCY,CURRENCY_DENOM,EXR_TYPE,EXR_SUFFIX,TIME_PERIOD,OBS_VALUE,...
//!   EXR.D.USD.EUR.SP00.A,D,USD,EUR,SP00,A,2024-01-05,1.0921,...
//!
//! The local cache keeps only the three columns we need, under the same
//! header names, so a raw API download can be loaded as-is.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// ECB data API, exchange rate dataflow
pub const ECB_DATA_API: &str = "https://data-api.ecb.europa.eu/service/data/EXR";

/// One reference rate: `rate` units of `currency` per EUR on `date`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    #[serde(rename = "CURRENCY")]
    pub currency: String,
    #[serde(rename = "TIME_PERIOD")]
    pub date: NaiveDate,
    #[serde(rename = "OBS_VALUE")]
    pub rate: f64,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "CURRENCY")]
    currency: String,
    #[serde(rename = "TIME_PERIOD")]
    time_period: String,
    #[serde(rename = "OBS_VALUE")]
    obs_value: String,
}

/// Parse rate CSV (cache file or raw API response). Rows without a usable
/// date or value are skipped.
pub fn read_observations<R: Read>(reader: R) -> Result<Vec<Observation>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut out = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        let row = result.context("reading rate row")?;
        let date = match NaiveDate::parse_from_str(row.time_period.trim(), "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                debug!("skipping rate row with period {:?}", row.time_period);
                continue;
            }
        };
        let rate: f64 = match row.obs_value.trim().parse() {
            Ok(r) if r > 0.0 => r,
            _ => {
                debug!("skipping {} rate on {date}: {:?}", row.currency, row.obs_value);
                continue;
            }
        };
        out.push(Observation {
            currency: row.currency.trim().to_string(),
            date,
            rate,
        });
    }
    Ok(out)
}

/// Load the local rate cache.
pub fn load_rates_file(path: impl AsRef<Path>) -> Result<Vec<Observation>> {
    let path = path.as_ref();
    let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_observations(file).with_context(|| format!("parsing {}", path.display()))
}

/// Write the rate cache, sorted by currency then date.
pub fn write_rates_file(path: impl AsRef<Path>, observations: &[Observation]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }

    let mut sorted = observations.to_vec();
    sorted.sort_by(|a, b| (&a.currency, a.date).cmp(&(&b.currency, b.date)));

    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("write {}", path.display()))?;
    for obs in &sorted {
        wtr.serialize(obs)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Combine cached and freshly fetched rates; `fresh` wins on the same
/// currency and date.
pub fn merge_observations(existing: Vec<Observation>, fresh: Vec<Observation>) -> Vec<Observation> {
    let mut by_key: BTreeMap<(String, NaiveDate), f64> = BTreeMap::new();
    for obs in existing.into_iter().chain(fresh) {
        by_key.insert((obs.currency, obs.date), obs.rate);
    }
    by_key
        .into_iter()
        .map(|((currency, date), rate)| Observation { currency, date, rate })
        .collect()
}

/// Daily reference-rate series URL for `currency` against EUR.
pub fn series_url(currency: &str, since: Option<NaiveDate>) -> String {
    let mut url = format!("{ECB_DATA_API}/D.{currency}.EUR.SP00.A?format=csvdata");
    if let Some(since) = since {
        url.push_str(&format!("&startPeriod={}", since.format("%Y-%m-%d")));
    }
    url
}

/// Download the daily series for one currency.
pub async fn fetch_series(
    client: &reqwest::Client,
    currency: &str,
    since: Option<NaiveDate>,
) -> Result<Vec<Observation>> {
    let url = series_url(currency, since);
    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("requesting {url}"))?;

    if !response.status().is_success() {
        bail!("{url} returned HTTP {}", response.status());
    }

    let body = response
        .text()
        .await
        .with_context(|| format!("reading response from {url}"))?;

    read_observations(body.as_bytes()).with_context(|| format!("parsing response from {url}"))
}
