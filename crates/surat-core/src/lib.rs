//! Core library for letter and invoice metadata extraction.
//!
//! This crate provides:
//! - Rule-based field extraction from noisy OCR text (document number, date,
//!   subject, amounts in Rupiah, sender name) for Indonesian and English documents
//! - A confidence score telling operators how much correction a record needs
//! - An asynchronous preview queue with a bounded worker pool and per-job timeout
//! - A TTL result cache keyed by request parameters

pub mod cache;
pub mod error;
pub mod extract;
pub mod models;
pub mod queue;
pub mod source;

pub use cache::{CacheKey, ResultCache};
pub use error::{ExtractionError, QueueError, Result, SourceError, SuratError};
pub use extract::{LetterParser, PreviewProcessor};
pub use models::config::SuratConfig;
pub use models::record::{Confidence, ConfidenceReport, ExtractionResult, FieldResult, SenderSource};
pub use queue::{JobFailure, JobHandle, JobState, JobStatus, PreviewQueue, PreviewRequest};
pub use source::TextSource;
