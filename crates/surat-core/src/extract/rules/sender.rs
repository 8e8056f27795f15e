//! Sender name extraction from the letterhead or the signature block.

use tracing::debug;

use crate::models::record::{Confidence, FieldResult, SenderSource};

use super::patterns::{
    ADDRESSEE_LINE, ADDRESS_LINE, DATE_DMY, DATE_D_MONTH_Y, DATE_YMD, EMAIL, MONTH_WITH_YEAR,
    NUMBER_LABEL_LINE, PHONE, PHONE_LABEL, SIGNATURE_LINE, SUBJECT_LINE, TAX_ID_LINE,
    TITLE_CASE_WORDS, WEB_LINE,
};
use super::{content_lines, FieldExtractor};

/// Legal-entity and institution prefixes, compared case-insensitively.
pub const ENTITY_PREFIXES: &[&str] = &[
    "PT", "CV", "UD", "PD", "FA", "FIRMA", "KOPERASI", "YAYASAN", "PERUM", "PERSERO", "BANK",
    "KEMENTERIAN", "KEMENTRIAN", "DINAS", "PEMERINTAH", "BADAN", "KANTOR", "DIREKTORAT",
    "SEKRETARIAT", "UNIVERSITAS", "RUMAH SAKIT", "BPJS", "OTORITAS", "KSOP", "PELINDO",
];

/// Header score at which the letterhead is trusted outright.
pub const HIGH_HEADER_SCORE: u32 = 8;

/// Header score from which a fallback header name is `medium`.
pub const MEDIUM_HEADER_SCORE: u32 = 5;

/// Lines searched after a closing salutation.
pub const SIGNATURE_WINDOW: usize = 5;

/// Check for a legal-entity prefix ("PT", "PT.", "CV ...").
pub fn has_entity_prefix(line: &str) -> bool {
    let upper = line.trim().to_uppercase();
    ENTITY_PREFIXES.iter().any(|prefix| {
        upper.strip_prefix(*prefix).is_some_and(|rest| {
            rest.chars().next().is_none_or(|c| !c.is_alphanumeric())
        })
    })
}

/// Share of uppercase letters among all letters.
pub fn uppercase_ratio(line: &str) -> f32 {
    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 {
        return 0.0;
    }
    let upper = line.chars().filter(|c| c.is_uppercase()).count();
    upper as f32 / letters as f32
}

/// Whether a line reads like an organisation name.
pub fn is_company_like(line: &str) -> bool {
    uppercase_ratio(line) > 0.6 || has_entity_prefix(line) || TITLE_CASE_WORDS.is_match(line.trim())
}

/// Lines that cannot be a sender name: address, contact details, ids,
/// labels, addressee and dates.
pub fn is_excluded(line: &str) -> bool {
    ADDRESS_LINE.is_match(line)
        || PHONE_LABEL.is_match(line)
        || WEB_LINE.is_match(line)
        || TAX_ID_LINE.is_match(line)
        || NUMBER_LABEL_LINE.is_match(line)
        || SUBJECT_LINE.is_match(line)
        || ADDRESSEE_LINE.is_match(line)
        || DATE_DMY.is_match(line)
        || DATE_YMD.is_match(line)
        || DATE_D_MONTH_Y.is_match(line)
        || MONTH_WITH_YEAR.is_match(line)
        || PHONE.is_match(line)
        || EMAIL.is_match(line)
        || line.chars().filter(|c| c.is_alphabetic()).count() < 2
}

/// Letterhead score of a line at `index` among the leading lines.
pub fn header_score(line: &str, index: usize) -> u32 {
    let mut score = 0;
    if has_entity_prefix(line) {
        score += 10;
    }
    if is_company_like(line) {
        score += 5;
    }
    score += match index {
        0 => 3,
        1 => 2,
        2 => 1,
        _ => 0,
    };
    if (10..=60).contains(&line.chars().count()) {
        score += 2;
    }
    score
}

/// Remove quote characters and collapse whitespace.
pub fn clean_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '"' | '\'' | '`' | '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sender field extractor.
pub struct SenderExtractor {
    header_lines: usize,
}

impl SenderExtractor {
    pub fn new() -> Self {
        Self { header_lines: 8 }
    }

    /// Set how many leading lines count as letterhead.
    pub fn with_header_lines(mut self, lines: usize) -> Self {
        self.header_lines = lines;
        self
    }

    /// Best letterhead line and its score; earlier lines win ties.
    fn best_header<'a>(&self, lines: &[&'a str]) -> Option<(&'a str, u32)> {
        let mut best: Option<(&str, u32)> = None;
        for (index, line) in lines.iter().take(self.header_lines).enumerate() {
            if is_excluded(line) {
                continue;
            }
            let score = header_score(&clean_name(line), index);
            debug!("Header candidate {:?} scored {}", line, score);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((*line, score));
            }
        }
        best
    }

    /// First organisation-like line following a closing salutation.
    fn signature_name<'a>(lines: &[&'a str]) -> Option<&'a str> {
        lines.iter().enumerate().find_map(|(i, line)| {
            if !SIGNATURE_LINE.is_match(line) {
                return None;
            }
            lines
                .iter()
                .skip(i + 1)
                .take(SIGNATURE_WINDOW)
                .find(|l| !is_excluded(l) && (has_entity_prefix(l) || is_company_like(l)))
                .copied()
        })
    }
}

impl Default for SenderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for SenderExtractor {
    type Output = FieldResult<String>;

    fn extract(&self, text: &str) -> FieldResult<String> {
        let lines = content_lines(text);
        let header = self.best_header(&lines);

        if let Some((line, score)) = header {
            if score >= HIGH_HEADER_SCORE {
                return FieldResult::found(clean_name(line), Confidence::High, SenderSource::Header);
            }
        }

        if let Some(line) = Self::signature_name(&lines) {
            return FieldResult::found(clean_name(line), Confidence::Medium, SenderSource::Signature);
        }

        match header {
            Some((line, score)) => {
                let confidence = if score >= MEDIUM_HEADER_SCORE {
                    Confidence::Medium
                } else {
                    Confidence::Low
                };
                FieldResult::found(clean_name(line), confidence, SenderSource::Header)
            }
            None => FieldResult::not_found(),
        }
    }
}

/// Extract the sender name from text.
pub fn extract_sender(text: &str) -> FieldResult<String> {
    SenderExtractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_letterhead_company() {
        let result = extract_sender("PT BOSOWA BANDAR AGENSI\nCABANG MAKASSAR");

        assert!(result.value.as_deref().unwrap().contains("PT BOSOWA"));
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.source, Some(SenderSource::Header));
    }

    #[test]
    fn test_contact_lines_are_skipped() {
        let text = "Jl. Nusantara No. 12 Makassar\nTelp. (0411) 123456\n\"CV. Karya  Mandiri\"";
        let result = extract_sender(text);

        assert_eq!(result.value.as_deref(), Some("CV. Karya Mandiri"));
        assert_eq!(result.confidence, Confidence::High);
    }

    #[test]
    fn test_signature_block() {
        let text = "\
Nomor: 12/ABC/2025
Perihal: Penawaran
Kepada Yth. Bapak Manager
di tempat
dengan hormat,
bersama surat ini kami sampaikan penawaran
harga untuk jasa keagenan kapal
atas perhatiannya kami ucapkan terima kasih
Hormat kami,
PT SAMUDERA INDONESIA";
        let result = extract_sender(text);

        assert_eq!(result.value.as_deref(), Some("PT SAMUDERA INDONESIA"));
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.source, Some(SenderSource::Signature));
    }

    #[test]
    fn test_weak_header_fallback() {
        let result = extract_sender("surat ini dibuat\nuntuk keperluan");
        assert_eq!(result.value.as_deref(), Some("surat ini dibuat"));
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.source, Some(SenderSource::Header));

        let result = extract_sender("Nomor: 1/A/2025\nPerihal: x\nKepada Yth\nterima");
        assert_eq!(result.value.as_deref(), Some("terima"));
        assert_eq!(result.confidence, Confidence::Low);
    }

    #[test]
    fn test_no_sender() {
        assert_eq!(extract_sender(""), FieldResult::not_found());
        assert_eq!(
            extract_sender("Telp 0411-123456\nemail: info@contoh.co.id"),
            FieldResult::not_found()
        );
    }

    #[test]
    fn test_entity_prefix() {
        assert!(has_entity_prefix("PT. Pelabuhan Indonesia"));
        assert!(has_entity_prefix("bank mandiri"));
        assert!(has_entity_prefix("PT"));
        assert!(!has_entity_prefix("PTSD Clinic"));
        assert!(!has_entity_prefix("Banking Solutions"));
    }

    #[test]
    fn test_header_score_rules() {
        assert_eq!(header_score("PT BOSOWA BANDAR AGENSI", 0), 20);
        assert_eq!(header_score("CABANG MAKASSAR", 1), 9);
        assert_eq!(header_score("lorem", 5), 0);
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  \u{201c}PT  ABC\u{201d} "), "PT ABC");
        assert_eq!(clean_name("CV 'Maju'"), "CV Maju");
    }
}
