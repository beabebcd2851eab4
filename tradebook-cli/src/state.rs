use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn tradebook_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tradebook"))
}

pub fn ensure_tradebook_home() -> Result<PathBuf> {
    let dir = tradebook_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(tradebook_home()?.join("config.toml"))
}

pub fn default_rates_path() -> Result<PathBuf> {
    Ok(tradebook_home()?.join("ecb_rates.csv"))
}
