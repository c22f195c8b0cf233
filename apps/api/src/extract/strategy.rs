//! Extraction strategies over raw PDF bytes.
//!
//! Each strategy wraps one decoding technology. Different engines survive
//! different PDF encodings and corruption, so the chain tries them in
//! priority order and takes the first viable output (see `DocumentExtractor`).

use anyhow::{anyhow, Result};
use pdfium_render::prelude::*;

/// One extraction technology. Implementations must be pure over the input
/// bytes: no retries, no shared state between calls.
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs when this strategy wins or fails.
    fn name(&self) -> &'static str;

    /// Attempts to extract text from the document. Failure is expected and
    /// non-fatal to the chain.
    fn attempt(&self, bytes: &[u8]) -> Result<String>;
}

/// Binds the pdfium library, preferring a copy next to the executable and
/// falling back to the system library.
pub(crate) fn bind_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| anyhow!("pdfium library not available: {e}"))?;
    Ok(Pdfium::new(bindings))
}

/// Page-by-page extraction of pdfium's native text layer, without layout
/// reconstruction. Pages are joined with a blank line.
pub struct PlainTextLayer;

impl ExtractionStrategy for PlainTextLayer {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn attempt(&self, bytes: &[u8]) -> Result<String> {
        let pdfium = bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| anyhow!("failed to load PDF: {e}"))?;

        let mut pages_text = Vec::new();
        for page in document.pages().iter() {
            let text = page
                .text()
                .map_err(|e| anyhow!("failed to read text layer: {e}"))?
                .all();
            if !text.trim().is_empty() {
                pages_text.push(text.trim().to_string());
            }
        }
        Ok(pages_text.join("\n\n"))
    }
}

/// Whole-document extraction through the independent `pdf-extract` decoder.
/// Used when pdfium's output is empty or malformed.
pub struct PdfExtractFallback;

impl ExtractionStrategy for PdfExtractFallback {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn attempt(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| anyhow!("pdf-extract failed: {e}"))
    }
}

/// Lowest-common-denominator decoding through lopdf, the last resort among
/// direct-text methods.
pub struct LopdfBasic;

impl ExtractionStrategy for LopdfBasic {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn attempt(&self, bytes: &[u8]) -> Result<String> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| anyhow!("failed to load PDF: {e}"))?;

        let mut pages_text = Vec::new();
        for (page_number, _object_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_number])
                .map_err(|e| anyhow!("failed to extract page {page_number}: {e}"))?;
            if !text.trim().is_empty() {
                pages_text.push(text.trim().to_string());
            }
        }
        Ok(pages_text.join("\n\n"))
    }
}
