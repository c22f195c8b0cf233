//! OCR fallback for scanned or image-only documents.
//!
//! The slowest and least reliable path, reached only after every direct-text
//! strategy has failed. Pages are rasterized through pdfium at doubled
//! resolution and fed to the `tesseract` binary, which must be installed
//! separately.

use std::process::{Command, Stdio};

use anyhow::{anyhow, bail, Context, Result};
use pdfium_render::prelude::*;

use crate::extract::strategy::{bind_pdfium, ExtractionStrategy};

/// Render scale for OCR input. 2x improves recognition on small type.
const OCR_RENDER_SCALE: f32 = 2.0;

/// Checks whether the `tesseract` binary is on the PATH.
pub fn tesseract_available() -> bool {
    Command::new("tesseract")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Rasterizes each page and runs tesseract over the images. Page texts are
/// joined with a blank line, matching the direct-text strategies.
pub struct TesseractOcr;

impl ExtractionStrategy for TesseractOcr {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn attempt(&self, bytes: &[u8]) -> Result<String> {
        if !tesseract_available() {
            bail!("tesseract binary not found on PATH");
        }

        let pdfium = bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| anyhow!("failed to load PDF: {e}"))?;

        // Scratch images are removed with the tempdir on every exit path.
        let scratch = tempfile::tempdir().context("failed to create OCR scratch directory")?;
        let render_config = PdfRenderConfig::new().scale_page_by_factor(OCR_RENDER_SCALE);

        let mut pages_text = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let image = page
                .render_with_config(&render_config)
                .map_err(|e| anyhow!("failed to rasterize page {index}: {e}"))?
                .as_image();

            let image_path = scratch.path().join(format!("page-{index}.png"));
            image
                .into_rgb8()
                .save(&image_path)
                .with_context(|| format!("failed to write OCR image for page {index}"))?;

            let output = Command::new("tesseract")
                .arg(&image_path)
                .arg("stdout")
                .output()
                .with_context(|| format!("failed to run tesseract on page {index}"))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                bail!("tesseract failed on page {index}: {}", stderr.trim());
            }

            let text = String::from_utf8_lossy(&output.stdout);
            if !text.trim().is_empty() {
                pages_text.push(text.trim().to_string());
            }
        }
        Ok(pages_text.join("\n\n"))
    }
}
