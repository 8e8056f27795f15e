//! Extraction output record.
//!
//! Field names follow the flat record the persistence side expects, so the
//! JSON keys are fixed by `#[serde(rename)]` rather than derived.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse certainty label attached to a field or to a whole record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document zone a sender name was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderSource {
    /// Letterhead at the top of the document.
    Header,
    /// Closing signature block.
    Signature,
}

impl SenderSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Signature => "signature",
        }
    }
}

/// A single extracted field.
///
/// `value == None` means the field was not found. A present value is always
/// the top-ranked candidate of its extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldResult<T> {
    pub value: Option<T>,
    pub confidence: Confidence,
    pub source: Option<SenderSource>,
}

impl<T> FieldResult<T> {
    /// A field that was not found.
    pub fn not_found() -> Self {
        Self {
            value: None,
            confidence: Confidence::Low,
            source: None,
        }
    }

    pub fn found(value: T, confidence: Confidence, source: SenderSource) -> Self {
        Self {
            value: Some(value),
            confidence,
            source: Some(source),
        }
    }

    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

impl<T> Default for FieldResult<T> {
    fn default() -> Self {
        Self::not_found()
    }
}

/// Points awarded per scoring component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceDetails {
    pub letter_number: u32,
    pub date: u32,
    pub sender: u32,
    pub subject: u32,
    pub text_quality: u32,
}

impl ConfidenceDetails {
    pub fn total(&self) -> u32 {
        self.letter_number + self.date + self.sender + self.subject + self.text_quality
    }
}

/// Overall verdict of the confidence scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceReport {
    /// Weighted sum, 0-100.
    pub overall_score: u32,
    pub overall_confidence: Confidence,
    pub details: ConfidenceDetails,
}

/// Everything extracted from one OCR text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Best document number.
    #[serde(rename = "letterNumber")]
    pub letter_number: Option<String>,

    /// Up to five document number candidates, best first.
    pub candidates: Vec<String>,

    /// Letter date.
    #[serde(rename = "tanggalSurat")]
    pub letter_date: Option<NaiveDate>,

    /// Sender name.
    #[serde(rename = "namaPengirim")]
    pub sender_name: Option<String>,

    #[serde(rename = "senderConfidence")]
    pub sender_confidence: Confidence,

    #[serde(rename = "senderSource")]
    pub sender_source: Option<SenderSource>,

    /// Subject line or document heading.
    #[serde(rename = "perihal")]
    pub subject: Option<String>,

    /// Accepted amounts in insertion order.
    #[serde(rename = "nominalList")]
    pub amounts: Vec<Decimal>,

    /// Sum of `amounts`.
    #[serde(rename = "totalNominal")]
    pub total_amount: Decimal,

    /// Echo of the input text.
    #[serde(rename = "ocrRawText")]
    pub raw_text: String,

    #[serde(rename = "ocrConfidence")]
    pub confidence: ConfidenceReport,
}

impl ExtractionResult {
    /// Names of fields that were not found, in record order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.letter_number.is_none() {
            missing.push("letterNumber");
        }
        if self.letter_date.is_none() {
            missing.push("tanggalSurat");
        }
        if self.sender_name.is_none() {
            missing.push("namaPengirim");
        }
        if self.subject.is_none() {
            missing.push("perihal");
        }
        if self.amounts.is_empty() {
            missing.push("nominalList");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn sample() -> ExtractionResult {
        ExtractionResult {
            letter_number: Some("001/SK/XII/2025".to_string()),
            candidates: vec!["001/SK/XII/2025".to_string()],
            letter_date: NaiveDate::from_ymd_opt(2025, 12, 2),
            sender_name: Some("PT BOSOWA BANDAR AGENSI".to_string()),
            sender_confidence: Confidence::High,
            sender_source: Some(SenderSource::Header),
            subject: None,
            amounts: vec![Decimal::from_str("1500000").unwrap()],
            total_amount: Decimal::from_str("1500000").unwrap(),
            raw_text: "raw".to_string(),
            confidence: ConfidenceReport {
                overall_score: 85,
                overall_confidence: Confidence::High,
                details: ConfidenceDetails {
                    letter_number: 25,
                    date: 20,
                    sender: 25,
                    subject: 0,
                    text_quality: 15,
                },
            },
        }
    }

    #[test]
    fn test_serializes_flat_record_names() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["letterNumber"], "001/SK/XII/2025");
        assert_eq!(json["tanggalSurat"], "2025-12-02");
        assert_eq!(json["senderConfidence"], "high");
        assert_eq!(json["senderSource"], "header");
        assert!(json["perihal"].is_null());
        assert_eq!(json["totalNominal"].as_f64(), Some(1_500_000.0));
        assert_eq!(json["nominalList"][0].as_f64(), Some(1_500_000.0));
        assert_eq!(json["ocrConfidence"]["overallScore"], 85);
        assert_eq!(json["ocrConfidence"]["details"]["textQuality"], 15);
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(sample().missing_fields(), vec!["perihal"]);
    }

    #[test]
    fn test_details_total() {
        assert_eq!(sample().confidence.details.total(), 85);
    }
}
