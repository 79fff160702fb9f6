//! Resume text extraction. A thin wrapper over `pdf-extract`.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("The uploaded resume is empty")]
    Empty,

    #[error("The uploaded resume is not a PDF file")]
    NotPdf,

    #[error("Failed to read the PDF: {0}")]
    Extract(String),

    #[error("The PDF contains no extractable text (is it a scanned image?)")]
    NoText,
}

/// Returns true if the bytes start with the PDF signature.
pub fn is_pdf(head: &[u8]) -> bool {
    head.starts_with(PDF_MAGIC)
}

/// Extracts the text of every page, in page order.
///
/// `pdf-extract` is CPU bound and can panic on malformed input, so it runs on the
/// blocking pool and a panic is reported as an extraction failure.
pub async fn extract_resume_text(data: Bytes) -> Result<String, PdfError> {
    if data.is_empty() {
        return Err(PdfError::Empty);
    }
    if !is_pdf(&data) {
        return Err(PdfError::NotPdf);
    }

    let size = data.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| {
            warn!("PDF extraction task failed: {e}");
            PdfError::Extract("the PDF could not be processed".to_string())
        })?
        .map_err(|e| PdfError::Extract(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(PdfError::NoText);
    }

    debug!("Extracted {} chars from {size}-byte PDF", text.chars().count());
    Ok(text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two pages, each a single Helvetica line: "PageOneRustEngineer", "PageTwoKubernetesHelm".
    pub(crate) const TWO_PAGE_RESUME_PDF: &[u8] =
        include_bytes!("../../testdata/two_page_resume.pdf");

    #[test]
    fn test_is_pdf_checks_magic_bytes() {
        assert!(is_pdf(b"%PDF-1.7\n..."));
        assert!(!is_pdf(b"PK\x03\x04"));
        assert!(!is_pdf(b""));
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let err = extract_resume_text(Bytes::new()).await.unwrap_err();
        assert!(matches!(err, PdfError::Empty));
    }

    #[tokio::test]
    async fn test_non_pdf_upload_rejected() {
        let err = extract_resume_text(Bytes::from_static(b"Jane Doe\nRust engineer"))
            .await
            .unwrap_err();
        assert!(matches!(err, PdfError::NotPdf));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_extract_error() {
        let err = extract_resume_text(Bytes::from_static(b"%PDF-1.4\nthis is not a real pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, PdfError::Extract(_)));
    }

    #[tokio::test]
    async fn test_extracts_every_page_in_order() {
        let text = extract_resume_text(Bytes::from_static(TWO_PAGE_RESUME_PDF))
            .await
            .unwrap();

        let first = text.find("PageOneRustEngineer").expect("page one text");
        let second = text.find("PageTwoKubernetesHelm").expect("page two text");
        assert!(first < second, "pages out of order: {text:?}");
    }
}
