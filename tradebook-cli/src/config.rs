use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tradebook_core::SymbolTables;
use tradebook_ingest::parsers::dkb::{DEFAULT_CURRENCY, DEFAULT_PREFIXES};
use tradebook_ingest::{DocumentRules, SettlementPatterns};

use crate::state::{default_config_path, default_rates_path, ensure_tradebook_home};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Copied into every record's `accountId`
    pub account_id: String,
    /// Currency printed after the execution price in the documents
    pub currency: String,
    pub identifiers: IdentifierSection,
    pub documents: DocumentRules,
    /// Present = convert prices into `target`
    pub conversion: Option<ConversionSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierSection {
    pub prefixes: Vec<String>,
    pub ignore: Vec<String>,
    /// Present = replace identifiers with tickers; unmapped ones are skipped
    pub remap: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionSection {
    pub target: String,
    /// Defaults to ~/.tradebook/ecb_rates.csv
    pub rates_file: Option<PathBuf>,
    #[serde(default)]
    pub max_fallback_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account_id: "default".to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            identifiers: IdentifierSection::default(),
            documents: DocumentRules::default(),
            conversion: None,
        }
    }
}

impl Default for IdentifierSection {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            ignore: Vec::new(),
            remap: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            bail!("account_id must not be empty");
        }
        check_currency("currency", &self.currency)?;

        if self.identifiers.prefixes.is_empty() {
            bail!("identifiers.prefixes must list at least one country code");
        }
        for prefix in &self.identifiers.prefixes {
            if prefix.len() != 2 || !prefix.bytes().all(|b| b.is_ascii_uppercase()) {
                bail!("identifier prefix {prefix:?} is not a two-letter uppercase country code");
            }
        }

        let docs = &self.documents;
        for (key, value) in [
            ("documents.buy_prefix", &docs.buy_prefix),
            ("documents.sell_prefix", &docs.sell_prefix),
            ("documents.marker", &docs.marker),
            ("documents.extension", &docs.extension),
        ] {
            if value.is_empty() {
                bail!("{key} must not be empty");
            }
        }

        if let Some(conv) = &self.conversion {
            check_currency("conversion.target", &conv.target)?;
            if conv.max_fallback_days < 0 {
                bail!("conversion.max_fallback_days must not be negative");
            }
        }
        Ok(())
    }

    pub fn patterns(&self) -> Result<SettlementPatterns> {
        SettlementPatterns::new(&self.identifiers.prefixes, &self.currency)
    }

    pub fn symbol_tables(&self) -> SymbolTables {
        let tables = SymbolTables::new().with_ignored(self.identifiers.ignore.iter().cloned());
        match &self.identifiers.remap {
            Some(remap) => tables.with_remap(remap.clone()),
            None => tables,
        }
    }

    /// Rate cache location, whether or not conversion is enabled.
    pub fn rates_path(&self) -> Result<PathBuf> {
        match self.conversion.as_ref().and_then(|c| c.rates_file.clone()) {
            Some(path) => Ok(path),
            None => default_rates_path(),
        }
    }
}

fn check_currency(key: &str, code: &str) -> Result<()> {
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
        bail!("{key} {code:?} is not a three-letter ISO currency code");
    }
    Ok(())
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s).context("parse config")?;
    cfg.validate()?;
    Ok(cfg)
}

/// `explicit` must exist; otherwise ~/.tradebook/config.toml is used if
/// present, else the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Ok(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };
    let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&s).with_context(|| format!("invalid config {}", path.display()))
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => ensure_tradebook_home()?.join("config.toml"),
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradebook_core::Resolution;

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.identifiers.prefixes.len(), 7);
        assert_eq!(cfg.documents.marker, "Wertpapierabrechnung");
        assert!(cfg.conversion.is_none());
    }

    #[test]
    fn test_full_file() {
        let cfg = parse_config(
            r#"
account_id = "e2a4628f-1146-4ab8-b559-6058c7657bbb"

[identifiers]
ignore = ["CH0108503795", "US3682872078"]

[identifiers.remap]
US0378331005 = "AAPL"

[documents]
buy_prefix = "Buy_"

[conversion]
target = "USD"
rates_file = "/tmp/rates.csv"
max_fallback_days = 3
"#,
        )
        .unwrap();

        assert_eq!(cfg.account_id, "e2a4628f-1146-4ab8-b559-6058c7657bbb");
        assert_eq!(cfg.documents.buy_prefix, "Buy_");
        assert_eq!(cfg.documents.sell_prefix, "Verkauf_");

        let tables = cfg.symbol_tables();
        assert!(tables.is_ignored("US3682872078"));
        assert_eq!(tables.resolve("US0378331005"), Resolution::Ticker("AAPL"));
        assert_eq!(tables.resolve("IE00B4L5Y983"), Resolution::Unmapped);

        let conv = cfg.conversion.as_ref().unwrap();
        assert_eq!(conv.target, "USD");
        assert_eq!(conv.max_fallback_days, 3);
        assert_eq!(cfg.rates_path().unwrap(), PathBuf::from("/tmp/rates.csv"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse_config("[identifiers]\nprefixes = [\"usa\"]").is_err());
        assert!(parse_config("[identifiers]\nprefixes = []").is_err());
        assert!(parse_config("currency = \"euro\"").is_err());
        assert!(parse_config("[conversion]\ntarget = \"US\"").is_err());
        assert!(parse_config("[documents]\nmarker = \"\"").is_err());
        assert!(parse_config("account_id = 5").is_err());
    }

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        save_config(&Config::default(), &path).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        assert!(load_config(Some(Path::new("/no/such/config.toml"))).is_err());
    }

    #[test]
    fn test_patterns_follow_config() {
        let cfg = parse_config("currency = \"USD\"\n[identifiers]\nprefixes = [\"DE\"]").unwrap();
        let p = cfg.patterns().unwrap();
        assert_eq!(p.identifier("DE0005140008"), Some("DE0005140008"));
        assert_eq!(p.unit_price("Ausführungskurs 10,5 USD"), Some(10.5));
    }
}
