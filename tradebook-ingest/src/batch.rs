//! Batch run over a directory of settlement documents.
//!
//! Every document ends in exactly one `DocumentOutcome` and one log line;
//! no single document can abort the batch or touch records already collected.

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tradebook_core::{DocumentOutcome, Integration, Severity, TradeCollection};

use crate::classify::{Classification, DocumentRules};
use crate::extract::Extractor;
use crate::pdf::TextSource;
use crate::types::Extraction;

/// Regular files in `dir`, sorted by file name.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("reading directory {}", dir.display()))?;
        // Follows symlinks, so linked documents are listed too.
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Per-document outcomes of one run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<(PathBuf, DocumentOutcome)>,
}

impl BatchReport {
    pub fn added(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_added()).count()
    }

    /// Outcome label -> number of documents
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for (_, outcome) in &self.outcomes {
            *counts.entry(outcome.label()).or_insert(0) += 1;
        }
        counts
    }

    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .counts()
            .into_iter()
            .map(|(label, n)| format!("{label}={n}"))
            .collect();
        format!("{} documents ({})", self.outcomes.len(), parts.join(", "))
    }
}

/// Wires classification, text extraction and field extraction together.
pub struct Batch<'a> {
    rules: &'a DocumentRules,
    extractor: &'a Extractor,
    source: &'a dyn TextSource,
}

impl<'a> Batch<'a> {
    pub fn new(rules: &'a DocumentRules, extractor: &'a Extractor, source: &'a dyn TextSource) -> Self {
        Self {
            rules,
            extractor,
            source,
        }
    }

    /// Process `paths` in order, integrating every successful trade.
    pub fn run(&self, paths: &[PathBuf], collection: &mut TradeCollection) -> BatchReport {
        let mut report = BatchReport::default();
        for path in paths {
            let outcome = self.process(path, collection);
            log_outcome(path, &outcome);
            report.outcomes.push((path.clone(), outcome));
        }
        report
    }

    /// Classify, read, extract and integrate a single document.
    pub fn process(&self, path: &Path, collection: &mut TradeCollection) -> DocumentOutcome {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let activity_type = match self.rules.classify(&file_name) {
            Classification::Trade(t) => t,
            Classification::NotATradeDocument => return DocumentOutcome::NotATradeDocument,
            Classification::WrongExtension => return DocumentOutcome::WrongExtension,
        };

        let text = match self.source.first_page_text(path) {
            Ok(text) => text,
            Err(e) => return DocumentOutcome::Unreadable(format!("{e:#}")),
        };

        let trade = match self.extractor.extract(&text) {
            Ok(Extraction::Trade(trade)) => trade,
            Ok(Extraction::Ignored(identifier)) => return DocumentOutcome::Ignored { identifier },
            Err(failure) => return DocumentOutcome::Failed(failure),
        };

        let record = trade.into_record(activity_type);
        let symbol = record.symbol.clone();
        let date = record.date;
        match collection.integrate(record) {
            Integration::Added => DocumentOutcome::Added { symbol, date },
            Integration::Duplicate => DocumentOutcome::Duplicate { symbol, date },
        }
    }
}

fn log_outcome(path: &Path, outcome: &DocumentOutcome) {
    let path = path.display();
    match outcome {
        DocumentOutcome::Added { symbol, date } => {
            info!("{path}: added trade on {date} for {symbol}")
        }
        DocumentOutcome::Duplicate { symbol, date } => {
            info!("{path}: skipping duplicate trade on {date} for {symbol}")
        }
        DocumentOutcome::Ignored { identifier } => {
            info!("{path}: skipping ignored identifier {identifier}")
        }
        DocumentOutcome::Failed(failure) => match failure.severity() {
            Severity::Structural => error!("{path}: skipped, {failure}"),
            Severity::Enrichment => warn!("{path}: skipped, {failure}"),
        },
        DocumentOutcome::Unreadable(reason) => error!("{path}: unreadable, {reason}"),
        DocumentOutcome::NotATradeDocument => info!("{path}: not a settlement note, skipping"),
        DocumentOutcome::WrongExtension => debug!("{path}: ignoring file"),
    }
}
