//! First-page text extraction for settlement PDFs.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// Source of a document's first-page text
pub trait TextSource {
    fn first_page_text(&self, path: &Path) -> Result<String>;
}

/// Reads PDFs from disk with `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfText;

impl TextSource for PdfText {
    fn first_page_text(&self, path: &Path) -> Result<String> {
        // The file handle is closed once the bytes are in memory.
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;

        // pdf-extract panics on some malformed files
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        }))
        .map_err(|_| anyhow!("PDF backend panicked on {}", path.display()))?
        .map_err(|e| anyhow!("extracting text from {}: {e}", path.display()))?;

        pages
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("{} has no pages", path.display()))
    }
}

/// Text keyed by path, for feeding documents without real PDFs
#[derive(Debug, Clone, Default)]
pub struct InMemoryText {
    pages: HashMap<PathBuf, String>,
}

impl InMemoryText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.pages.insert(path.into(), text.into());
        self
    }
}

impl TextSource for InMemoryText {
    fn first_page_text(&self, path: &Path) -> Result<String> {
        self.pages
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no text registered for {}", path.display()))
    }
}
