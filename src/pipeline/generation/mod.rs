pub mod types;
pub mod gemini;

pub use types::*;
pub use gemini::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generative API is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Generative API returned error (status {status}): {body}")]
    HttpStatus { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("No API key configured for the generative model")]
    MissingApiKey,
}
