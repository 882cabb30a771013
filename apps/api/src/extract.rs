//! PDF text extraction for uploaded résumés.
//!
//! Wraps the `pdf-extract` crate: pages are extracted in document order and
//! joined with a newline. There is no OCR fallback — a scanned PDF with no
//! text layer is rejected.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("not a parseable PDF: {0}")]
    Parse(#[from] pdf_extract::OutputError),

    #[error("PDF contains no extractable text")]
    NoText,
}

/// Extracts the full text of a PDF payload, page texts in order 1..N
/// separated by a newline.
pub fn extract_pdf_text(data: &[u8]) -> Result<String, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(data)?;
    let text = pages.join("\n");

    if text.trim().is_empty() {
        return Err(ExtractionError::NoText);
    }

    Ok(text)
}
