//! Document text extraction with multi-strategy fallback.
//!
//! Strategies run in a fixed priority order over the same bytes; the first
//! output that clears the viability threshold wins and is normalized. A
//! strategy that fails is logged and skipped, never fatal to the chain. Only
//! when every strategy is exhausted does the extractor surface a failure,
//! carrying the last encountered cause.

pub mod layout;
pub mod normalize;
pub mod ocr;
pub mod strategy;

use thiserror::Error;
use tracing::{debug, info};

use crate::extract::layout::LayoutAware;
use crate::extract::normalize::normalize_text;
use crate::extract::ocr::TesseractOcr;
use crate::extract::strategy::{ExtractionStrategy, LopdfBasic, PdfExtractFallback, PlainTextLayer};

/// Minimum trimmed length below which extracted text is treated as an
/// extraction failure rather than a result.
pub const MIN_VIABLE_TEXT_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(
        "no text could be extracted from the document (last error: {})",
        .last_cause.as_deref().unwrap_or("none")
    )]
    NoViableText { last_cause: Option<String> },
}

/// Orchestrates the extraction strategy chain. Stateless between calls; each
/// strategy is attempted exactly once per document, in order, since retrying
/// a failed decoder on the same bytes cannot succeed.
pub struct DocumentExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl DocumentExtractor {
    /// The production chain: layout-aware, plain text layer, alternate
    /// engine, legacy decoder, then OCR as last resort.
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(LayoutAware),
            Box::new(PlainTextLayer),
            Box::new(PdfExtractFallback),
            Box::new(LopdfBasic),
            Box::new(TesseractOcr),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Extracts and normalizes text from raw document bytes, or fails with
    /// `ExtractError::NoViableText` once the whole chain is exhausted.
    pub fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let mut last_cause: Option<String> = None;

        for strategy in &self.strategies {
            match strategy.attempt(bytes) {
                Ok(text) if text.trim().len() > MIN_VIABLE_TEXT_LEN => {
                    let normalized = normalize_text(&text);
                    info!(
                        strategy = strategy.name(),
                        length = normalized.len(),
                        "text extraction succeeded"
                    );
                    return Ok(normalized);
                }
                Ok(text) => {
                    debug!(
                        strategy = strategy.name(),
                        length = text.trim().len(),
                        "extracted text below viability threshold"
                    );
                }
                Err(e) => {
                    debug!(strategy = strategy.name(), error = %format!("{e:#}"), "extraction strategy failed");
                    last_cause = Some(format!("{e:#}"));
                }
            }
        }

        Err(ExtractError::NoViableText { last_cause })
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}
