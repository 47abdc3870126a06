use std::path::Path;

use super::pdf::PdfTextExtractor;
use super::sanitize::normalize;
use super::types::{ExtractedDocument, ExtractionMethod, PageExtraction, PdfExtractor};
use super::ExtractionError;

/// What kind of document a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
    Unsupported,
}

impl DocumentFormat {
    /// Detect from magic bytes first, then from the file extension.
    pub fn detect(path: &Path, bytes: &[u8]) -> Self {
        if bytes.starts_with(b"%PDF") {
            return Self::Pdf;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("txt") | Some("text") => Self::PlainText,
            _ if std::str::from_utf8(bytes).is_ok() => Self::PlainText,
            _ => Self::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "plain_text",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Reads a lab report from disk and returns its normalized text.
/// The PDF backend is injected so tests can swap it out.
pub struct DocumentExtractor {
    pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new(Box::new(PdfTextExtractor))
    }
}

impl DocumentExtractor {
    pub fn new(pdf_extractor: Box<dyn PdfExtractor + Send + Sync>) -> Self {
        Self { pdf_extractor }
    }

    pub fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractionError> {
        let bytes = std::fs::read(path)?;
        let format = DocumentFormat::detect(path, &bytes);
        tracing::info!(
            path = %path.display(),
            format = format.as_str(),
            "Starting text extraction"
        );
        self.extract_bytes(&bytes, format)
    }

    pub fn extract_bytes(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<ExtractedDocument, ExtractionError> {
        let (method, mut pages) = match format {
            DocumentFormat::Pdf => {
                let pages = self.pdf_extractor.extract_text(bytes)?;
                (ExtractionMethod::PdfDirect, pages)
            }
            DocumentFormat::PlainText => {
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|e| ExtractionError::EncodingError(e.to_string()))?;
                let page = PageExtraction {
                    page_number: 1,
                    text,
                };
                (ExtractionMethod::PlainTextRead, vec![page])
            }
            DocumentFormat::Unsupported => return Err(ExtractionError::UnsupportedFormat),
        };

        for page in &mut pages {
            page.text = normalize(&page.text);
        }

        let document = ExtractedDocument::from_pages(method, pages);
        tracing::debug!(
            pages = document.page_count(),
            chars = document.full_text.len(),
            "Text extraction complete"
        );
        Ok(document)
    }

    /// Like `extract`, but an unreadable document degrades to empty text so
    /// downstream stages see zero rows instead of an error.
    pub fn extract_or_empty(&self, path: &Path) -> String {
        match self.extract(path) {
            Ok(document) => document.full_text,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Text extraction failed");
                String::new()
            }
        }
    }
}
