pub mod types;
pub mod sanitize;
pub mod lines;
pub mod pdf;
pub mod orchestrator;

pub use types::*;
pub use sanitize::*;
pub use lines::*;
pub use pdf::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Text encoding error: {0}")]
    EncodingError(String),

    #[error("Unsupported format for extraction")]
    UnsupportedFormat,
}
