//! Letter parser running every field extractor plus the confidence scorer.

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::record::ExtractionResult;
use crate::queue::PreviewRequest;

use super::rules::{
    score_confidence, AmountExtractor, ConfidenceInput, DateExtractor, FieldExtractor,
    LetterNumberExtractor, SenderExtractor, SubjectExtractor,
};
use super::{PreviewProcessor, Result};

/// Rule-based parser for letters and invoices.
pub struct LetterParser {
    letter_number: LetterNumberExtractor,
    date: DateExtractor,
    subject: SubjectExtractor,
    amounts: AmountExtractor,
    sender: SenderExtractor,
}

impl LetterParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            letter_number: LetterNumberExtractor::new(),
            date: DateExtractor::new(),
            subject: SubjectExtractor::new(),
            amounts: AmountExtractor::new(),
            sender: SenderExtractor::new(),
        }
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_max_candidates(config.max_candidates)
            .with_header_lines(config.header_lines)
            .with_subject_scan_lines(config.subject_scan_lines)
            .with_min_amount(config.min_amount)
    }

    /// Set how many document number candidates are reported.
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.letter_number = self.letter_number.with_max_candidates(max);
        self
    }

    /// Set how many leading lines count as letterhead.
    pub fn with_header_lines(mut self, lines: usize) -> Self {
        self.sender = self.sender.with_header_lines(lines);
        self
    }

    /// Set how many leading lines are searched for a document heading.
    pub fn with_subject_scan_lines(mut self, lines: usize) -> Self {
        self.subject = self.subject.with_scan_lines(lines);
        self
    }

    /// Set the smallest accepted amount.
    pub fn with_min_amount(mut self, min: u64) -> Self {
        self.amounts = self.amounts.with_min_amount(min);
        self
    }

    /// Extract every field from `text`.
    ///
    /// Never fails: fields that cannot be found are left empty and lower the
    /// confidence score instead.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        info!("Parsing letter from {} characters of text", text.len());

        let number = self.letter_number.extract(text);
        let letter_date = self.date.extract(text);
        let subject = self.subject.extract(text);
        let amounts = self.amounts.extract(text);
        let sender = self.sender.extract(text);

        let confidence = score_confidence(&ConfidenceInput {
            has_letter_number: number.value.is_some(),
            has_date: letter_date.is_some(),
            sender: sender.is_found().then_some(sender.confidence),
            has_subject: subject.is_some(),
            raw_text: text,
        });

        let result = ExtractionResult {
            letter_number: number.value,
            candidates: number.candidates,
            letter_date,
            sender_name: sender.value,
            sender_confidence: sender.confidence,
            sender_source: sender.source,
            subject,
            amounts: amounts.values,
            total_amount: amounts.total,
            raw_text: text.to_string(),
            confidence,
        };

        let missing = result.missing_fields();
        if !missing.is_empty() {
            debug!("Fields not found: {}", missing.join(", "));
        }
        debug!(
            "Extracted letter {:?} with confidence {} ({})",
            result.letter_number, result.confidence.overall_score, result.confidence.overall_confidence
        );

        result
    }
}

impl Default for LetterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewProcessor for LetterParser {
    fn process(&self, request: &PreviewRequest) -> Result<ExtractionResult> {
        Ok(self.parse(&request.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{Confidence, SenderSource};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    const LETTER: &str = "\
PT BOSOWA BANDAR AGENSI
CABANG MAKASSAR
Jl. Nusantara No. 12 Makassar
Telp. (0411) 123456
Nomor : 001/BBA-MKS/XII/2025
Perihal : Tagihan Jasa Keagenan
Makassar, 02 December 2025
Kepada Yth.
PT PELINDO IV
Jasa pandu 100.000,00
Jasa tunda 200.000,00
Jasa tambat 300.000,00
Hormat kami,
";

    #[test]
    fn test_parse_full_letter() {
        let result = LetterParser::new().parse(LETTER);

        assert_eq!(result.letter_number.as_deref(), Some("001/BBA-MKS/XII/2025"));
        assert_eq!(result.letter_date, NaiveDate::from_ymd_opt(2025, 12, 2));
        assert_eq!(result.subject.as_deref(), Some("Tagihan Jasa Keagenan"));
        assert_eq!(result.sender_name.as_deref(), Some("PT BOSOWA BANDAR AGENSI"));
        assert_eq!(result.sender_confidence, Confidence::High);
        assert_eq!(result.sender_source, Some(SenderSource::Header));
        assert_eq!(result.amounts.len(), 3);
        assert_eq!(result.total_amount, Decimal::from(600_000));
        assert_eq!(result.raw_text, LETTER);

        assert_eq!(result.confidence.details.letter_number, 25);
        assert_eq!(result.confidence.details.date, 20);
        assert_eq!(result.confidence.details.sender, 25);
        assert_eq!(result.confidence.details.subject, 15);
        assert_eq!(result.confidence.overall_confidence, Confidence::High);
        assert!(result.missing_fields().is_empty());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = LetterParser::new();
        assert_eq!(parser.parse(LETTER), parser.parse(LETTER));

        let first = serde_json::to_string(&parser.parse(LETTER)).unwrap();
        let second = serde_json::to_string(&parser.parse(LETTER)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_noise() {
        let result = LetterParser::new().parse("~~ ## ..");

        assert_eq!(result.letter_number, None);
        assert!(result.candidates.is_empty());
        assert_eq!(result.letter_date, None);
        assert_eq!(result.sender_name, None);
        assert_eq!(result.sender_source, None);
        assert_eq!(result.total_amount, Decimal::ZERO);
        assert_eq!(result.confidence.overall_score, 0);
        assert_eq!(result.confidence.overall_confidence, Confidence::Low);
    }

    #[test]
    fn test_builder_settings_reach_extractors() {
        let parser = LetterParser::new().with_min_amount(250_000);
        let result = parser.parse(LETTER);
        assert_eq!(result.amounts, vec![Decimal::from(300_000)]);

        let parser = LetterParser::from_config(&ExtractionConfig {
            max_candidates: 1,
            ..ExtractionConfig::default()
        });
        let result = parser.parse("No: 12/AB/2025\nRef 99/XY/OPS/2025");
        assert!(result.candidates.len() <= 1);
    }

    #[test]
    fn test_processor_accepts_blank_text() {
        let parser = LetterParser::new();
        let result = parser.process(&PreviewRequest::new("   \n ")).unwrap();
        assert_eq!(result.missing_fields().len(), 5);
        assert_eq!(result.confidence.overall_score, 0);

        let request = PreviewRequest::new(LETTER);
        assert_eq!(parser.process(&request).unwrap(), parser.parse(LETTER));
    }

    #[test]
    fn test_parse_survives_hostile_input() {
        let long_line = "9".repeat(100_000);
        let inputs = [
            "",
            "\u{0}",
            "Rp",
            "Rp.\nRp ,",
            "Rp 40.000.000.000.000.000.000.000.000.000\nRp 50.000.000.000.000.000.000.000.000.000",
            "Rp 999.999.999.999.999.999.999.999.999.999.999",
            "١٢/٠٣/٢٠٢٥",
            "Tanggal: ١٢ Desember ٢٠٢٥",
            "Makassar, 02 Decemberé 2025",
            "Senin, 1 Januariñ 2025",
            "Januari日本 2025\nSenin日本, 5",
            "No: ééé/ÄÖ/ß/2025",
            "Perihal:\u{0}\u{0}",
            "PT \u{200b}\nCV",
            long_line.as_str(),
        ];

        let parser = LetterParser::new();
        for input in inputs {
            let result = parser.parse(input);
            let sum: Decimal = result.amounts.iter().sum();
            assert_eq!(result.total_amount, sum, "input {:?}", input);
            assert!(result.confidence.overall_score <= 100);
            assert!(result.candidates.len() <= 5);
        }
    }
}
