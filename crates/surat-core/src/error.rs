//! Error types for the surat-core library.

use thiserror::Error;
use uuid::Uuid;

use crate::queue::JobState;

/// Main error type for the surat library.
#[derive(Error, Debug)]
pub enum SuratError {
    /// Text source error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Preview queue error.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a document into raw text.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The document kind has no text source (images need an OCR pass first).
    #[error("unsupported document kind: {0}")]
    Unsupported(String),
}

/// Errors produced by a preview processor.
///
/// The rule-based extractors never fail; these exist for processors that wrap
/// them with extra steps.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The processor gave up with a message.
    #[error("{0}")]
    Failed(String),
}

/// Errors related to the preview queue.
#[derive(Error, Debug)]
pub enum QueueError {
    /// The queue could not be started.
    #[error("failed to start preview queue: {0}")]
    Init(String),

    /// The queue is not accepting work (shut down or workers gone).
    #[error("preview queue unavailable: {0}")]
    Unavailable(String),

    /// A job state change that would move backwards.
    #[error("invalid job transition for {id}: {from} -> {to}")]
    InvalidTransition { id: Uuid, from: JobState, to: JobState },
}

/// Result type for the surat library.
pub type Result<T> = std::result::Result<T, SuratError>;
