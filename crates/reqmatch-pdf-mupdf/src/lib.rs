use std::path::Path;

use mupdf::{Document, TextPageFlags};

use reqmatch_core::{BackendError, TextBackend};

/// MuPDF-based implementation of [`TextBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency so
/// that the matching engine does not transitively depend on it.
///
/// Text is emitted one line per MuPDF text line, every line terminated by
/// `\n`, pages concatenated in order. Running headers and footers are kept by
/// default because they are legitimate requirement lines in many documents;
/// use [`MupdfBackend::with_margin_exclusion`] to drop them.
#[derive(Debug, Clone, Default)]
pub struct MupdfBackend {
    /// Fraction of page height from the top to exclude (0.0–1.0).
    header_exclusion_ratio: Option<f32>,
    /// Fraction of page height from the bottom to exclude (0.0–1.0).
    footer_exclusion_ratio: Option<f32>,
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip text blocks inside the top `header` and bottom `footer` fractions
    /// of each page. Pass `0.0` to disable either side.
    pub fn with_margin_exclusion(mut self, header: f32, footer: f32) -> Self {
        self.header_exclusion_ratio = (header > 0.0).then_some(header);
        self.footer_exclusion_ratio = (footer > 0.0).then_some(footer);
        self
    }
}

impl TextBackend for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut text = String::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let page_bounds = page
                .bounds()
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let page_height = page_bounds.y1 - page_bounds.y0;

            let header_threshold = self
                .header_exclusion_ratio
                .map(|r| page_bounds.y0 + page_height * r);
            let footer_threshold = self
                .footer_exclusion_ratio
                .map(|r| page_bounds.y1 - page_height * r);

            for block in text_page.blocks() {
                let block_bounds = block.bounds();

                if header_threshold.is_some_and(|t| block_bounds.y1 <= t) {
                    continue;
                }
                if footer_threshold.is_some_and(|t| block_bounds.y0 >= t) {
                    continue;
                }

                for line in block.lines() {
                    text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
                    text.push('\n');
                }
            }
        }

        Ok(text)
    }
}
