//! Layout-aware extraction for visually designed resumes.
//!
//! Resumes built with design tools often place dates, titles, and skills in
//! disconnected text boxes or table cells that naive linear extraction
//! scrambles. This strategy reads positioned text fragments and rebuilds
//! reading order from their page coordinates instead.

use anyhow::{anyhow, Result};

use crate::extract::strategy::{bind_pdfium, ExtractionStrategy};

/// Vertical distance (points) between fragments that starts a new line.
const LINE_BREAK_THRESHOLD_PT: f32 = 5.0;

/// Horizontal gap (points) between same-line fragments that reads as a table
/// cell boundary rather than a word space.
const CELL_GAP_THRESHOLD_PT: f32 = 20.0;

/// A text fragment with its page position. `top` is measured in PDF points
/// with the y axis growing upward, so visually higher fragments have larger
/// values.
struct Fragment {
    top: f32,
    left: f32,
    right: f32,
    text: String,
}

impl Fragment {
    /// Vertical position rounded to one decimal, so fragments on the same
    /// visual line sort together despite sub-point jitter.
    fn line_key(&self) -> i64 {
        (self.top * 10.0).round() as i64
    }
}

/// Reconstructs reading order from positioned fragments: sorted top-to-bottom
/// then left-to-right, with a line break on vertical jumps and pipe-joined
/// cells across wide horizontal gaps.
pub struct LayoutAware;

impl ExtractionStrategy for LayoutAware {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn attempt(&self, bytes: &[u8]) -> Result<String> {
        let pdfium = bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| anyhow!("failed to load PDF: {e}"))?;

        let mut pages_text = Vec::new();
        for page in document.pages().iter() {
            let text_page = page
                .text()
                .map_err(|e| anyhow!("failed to read text layer: {e}"))?;

            let mut fragments: Vec<Fragment> = text_page
                .segments()
                .iter()
                .filter_map(|segment| {
                    let bounds = segment.bounds();
                    let text = segment.text().trim().to_string();
                    if text.is_empty() {
                        return None;
                    }
                    Some(Fragment {
                        top: bounds.top.value,
                        left: bounds.left.value,
                        right: bounds.right.value,
                        text,
                    })
                })
                .collect();

            let page_text = assemble_page(&mut fragments);
            if !page_text.is_empty() {
                pages_text.push(page_text);
            }
        }
        Ok(pages_text.join("\n\n"))
    }
}

/// Orders fragments into reading order and joins them into page text.
fn assemble_page(fragments: &mut [Fragment]) -> String {
    // Top-to-bottom (descending y in PDF space), then left-to-right.
    fragments.sort_by(|a, b| {
        b.line_key()
            .cmp(&a.line_key())
            .then(a.left.total_cmp(&b.left))
    });

    let mut page_text = String::new();
    let mut previous: Option<&Fragment> = None;

    for fragment in fragments.iter() {
        if let Some(prev) = previous {
            if prev.top - fragment.top > LINE_BREAK_THRESHOLD_PT {
                page_text.push('\n');
            } else if fragment.left - prev.right > CELL_GAP_THRESHOLD_PT {
                page_text.push_str(" | ");
            } else {
                page_text.push(' ');
            }
        }
        page_text.push_str(&fragment.text);
        previous = Some(fragment);
    }

    page_text.trim().to_string()
}
