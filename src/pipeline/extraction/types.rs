use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// How text was pulled out of a document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtractionMethod {
    PdfDirect,
    PlainTextRead,
}

/// Per-page extraction result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageExtraction {
    pub page_number: usize,
    pub text: String,
}

/// Text of a whole document, pages joined by newlines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub method: ExtractionMethod,
    pub pages: Vec<PageExtraction>,
    pub full_text: String,
}

impl ExtractedDocument {
    pub fn from_pages(method: ExtractionMethod, pages: Vec<PageExtraction>) -> Self {
        let full_text = pages
            .iter()
            .map(|p| p.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            method,
            pages,
            full_text,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// PDF text extraction abstraction (allows mocking for tests)
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError>;
}
