use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use tradebook_core::{CurrencyConversion, TradeCollection};
use tradebook_fx::{fetch_series, load_rates_file, merge_observations, write_rates_file, RateTable};
use tradebook_ingest::{list_documents, Batch, Extractor, PdfText};

mod config;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "tradebook",
    version,
    about = "Collect DKB settlement notes into a portfolio activity file"
)]
struct Cli {
    /// Config file (default: ~/.tradebook/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    import: ImportArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Folder holding the downloaded settlement PDFs
    #[arg(short, long, default_value = "DKB")]
    input_directory: PathBuf,

    /// Activity file to write
    #[arg(short, long, default_value = "dkb.json")]
    output_file: PathBuf,

    /// Keep the activities already in the output file
    #[arg(short, long)]
    merge: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download ECB reference rates into the local rate cache
    FxSync {
        /// Currency to fetch against EUR (repeatable)
        #[arg(long = "currency", required = true)]
        currencies: Vec<String>,

        /// First day to fetch (YYYY-MM-DD); default is the full history
        #[arg(long)]
        since: Option<NaiveDate>,
    },

    /// Write a default config file if none exists
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        None => {
            let cfg = config::load_config(config_path)?;
            import(&cfg, &cli.import)?;
        }
        Some(Command::FxSync { currencies, since }) => {
            let cfg = config::load_config(config_path)?;
            fx_sync(&cfg, &currencies, since).await?;
        }
        Some(Command::InitConfig) => {
            config::init_config(config_path)?;
        }
    }

    Ok(())
}

fn import(cfg: &Config, args: &ImportArgs) -> Result<()> {
    if !args.input_directory.is_dir() {
        bail!("input directory not found: {}", args.input_directory.display());
    }

    let mut extractor = Extractor::new(cfg.patterns()?, &cfg.account_id)
        .with_currency(&cfg.currency)
        .with_tables(cfg.symbol_tables());
    if extractor.tables().ignored_count() > 0 {
        info!("{} identifiers on the ignore list", extractor.tables().ignored_count());
    }
    if let Some(conv) = &cfg.conversion {
        let rates = load_rate_table(&cfg.rates_path()?, conv.max_fallback_days)?;
        extractor = extractor.with_conversion(CurrencyConversion::new(&conv.target, rates));
    }

    let mut collection = TradeCollection::load_or_empty(&args.output_file, args.merge)
        .with_context(|| format!("loading {}", args.output_file.display()))?;
    if args.merge {
        info!(
            "merging into {} activities from {}",
            collection.len(),
            args.output_file.display()
        );
    }

    let paths = list_documents(&args.input_directory)?;
    info!("{} files in {}", paths.len(), args.input_directory.display());

    let report = Batch::new(&cfg.documents, &extractor, &PdfText).run(&paths, &mut collection);
    collection
        .save(&args.output_file)
        .with_context(|| format!("writing {}", args.output_file.display()))?;

    info!("{} -> {}", report.summary(), args.output_file.display());
    println!(
        "Wrote {} activities to {} ({} new)",
        collection.len(),
        args.output_file.display(),
        report.added()
    );
    Ok(())
}

fn load_rate_table(path: &Path, max_fallback_days: i64) -> Result<RateTable> {
    let observations = load_rates_file(path)
        .with_context(|| format!("no rate cache; run `tradebook fx-sync` first ({})", path.display()))?;
    let table = RateTable::from_observations(observations).with_max_fallback_days(max_fallback_days);
    if table.is_empty() {
        warn!("rate cache {} holds no usable rates", path.display());
    } else {
        info!(
            "loaded {} rates for {} from {}",
            table.len(),
            table.currencies().join(", "),
            path.display()
        );
    }
    Ok(table)
}

async fn fx_sync(cfg: &Config, currencies: &[String], since: Option<NaiveDate>) -> Result<()> {
    let path = cfg.rates_path()?;
    let existing = if path.exists() {
        load_rates_file(&path)?
    } else {
        Vec::new()
    };

    let client = reqwest::Client::new();
    let mut fresh = Vec::new();
    for currency in currencies {
        let currency = currency.trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
            bail!("{currency:?} is not a three-letter ISO currency code");
        }
        if currency == tradebook_fx::BASE_CURRENCY {
            warn!("EUR is the reference currency; nothing to fetch");
            continue;
        }
        let series = fetch_series(&client, &currency, since).await?;
        info!("fetched {} {currency} rates", series.len());
        fresh.extend(series);
    }

    let fetched = fresh.len();
    let merged = merge_observations(existing, fresh);
    write_rates_file(&path, &merged)?;
    println!(
        "Fetched {} rates; {} in {}",
        fetched,
        merged.len(),
        path.display()
    );
    Ok(())
}
