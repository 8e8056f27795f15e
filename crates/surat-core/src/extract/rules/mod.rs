//! Rule-based field extractors for Indonesian and English letters and invoices.

pub mod amounts;
pub mod confidence;
pub mod dates;
pub mod fuzzy;
pub mod letter_number;
pub mod patterns;
pub mod sender;
pub mod subject;

pub use amounts::{extract_amounts, parse_rupiah_amount, AmountExtractor, Amounts};
pub use confidence::{score_confidence, tier_for_score, ConfidenceInput};
pub use dates::{extract_date, DateExtractor, DateLocale};
pub use fuzzy::{fuzzy_match_keyword, normalize_for_match};
pub use letter_number::{extract_letter_number, LetterNumber, LetterNumberExtractor, NumberRule};
pub use sender::{clean_name, extract_sender, SenderExtractor};
pub use subject::{extract_subject, SubjectExtractor};

/// Trait for field extractors.
///
/// Extractors are pure: they never fail, absence is part of `Output`.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Self::Output;
}

/// A tentative value ranked within one extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionCandidate {
    /// Candidate text.
    pub value: String,
    /// Ranking score, meaningful only inside one extractor call.
    pub score: u32,
}

impl ExtractionCandidate {
    pub fn new(value: impl Into<String>, score: u32) -> Self {
        Self {
            value: value.into(),
            score,
        }
    }
}

/// Split text into trimmed, non-empty lines.
pub(crate) fn content_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}
