//! Field extraction from OCR text.

mod parser;
pub mod rules;

pub use parser::LetterParser;

use crate::error::ExtractionError;
use crate::models::record::ExtractionResult;
use crate::queue::PreviewRequest;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Synchronous preview operation run by queue workers.
///
/// Implementations must be callable from many threads at once.
pub trait PreviewProcessor: Send + Sync {
    /// Turn one request into an extraction result.
    fn process(&self, request: &PreviewRequest) -> Result<ExtractionResult>;
}
