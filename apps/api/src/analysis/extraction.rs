//! Document text extraction. The PDF container parser is opaque to the rest of
//! the pipeline: bytes in, per-page text (or an extraction failure) out.

use crate::errors::AppError;

/// Converts an uploaded document into per-page text. `None` marks a page that
/// yielded no text.
pub trait DocumentExtractor: Send + Sync {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Option<String>>, AppError>;
}

/// `pdf-extract` backed extractor.
pub struct PdfExtractor;

impl DocumentExtractor for PdfExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Option<String>>, AppError> {
        // pdf-extract re-exports Document from lopdf
        let doc = pdf_extract::Document::load_mem(bytes)
            .map_err(|e| AppError::Extraction(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(AppError::Extraction("document is encrypted".to_string()));
        }
        if doc.get_pages().is_empty() {
            return Err(AppError::Extraction("document has no pages".to_string()));
        }

        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| AppError::Extraction(e.to_string()))?;

        Ok(pages
            .into_iter()
            .map(|text| (!text.trim().is_empty()).then_some(text))
            .collect())
    }
}
