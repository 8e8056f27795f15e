//! Subject ("Perihal") extraction.

use super::patterns::SUBJECT_LABEL;
use super::FieldExtractor;

/// Known document-type headings, longest first so that
/// "PROFORMA INVOICE" wins over "INVOICE".
pub const DOCUMENT_HEADINGS: &[&str] = &[
    "DISBURSEMENT ACCOUNT",
    "STATEMENT OF ACCOUNT",
    "SURAT PEMBERITAHUAN",
    "SURAT PERMOHONAN",
    "SURAT KETERANGAN",
    "SURAT PENAWARAN",
    "PROFORMA INVOICE",
    "SURAT PERINTAH",
    "SURAT UNDANGAN",
    "PURCHASE ORDER",
    "DELIVERY ORDER",
    "SURAT EDARAN",
    "BERITA ACARA",
    "SURAT TUGAS",
    "SURAT KUASA",
    "CREDIT NOTE",
    "DEBIT NOTE",
    "NOTA DINAS",
    "QUOTATION",
    "KWITANSI",
    "FAKTUR",
    "INVOICE",
    "RECEIPT",
];

/// Subject field extractor.
pub struct SubjectExtractor {
    scan_lines: usize,
}

impl SubjectExtractor {
    pub fn new() -> Self {
        Self { scan_lines: 15 }
    }

    /// Set how many leading lines are searched for a heading.
    pub fn with_scan_lines(mut self, lines: usize) -> Self {
        self.scan_lines = lines;
        self
    }

    fn labelled(text: &str) -> Option<String> {
        text.lines()
            .filter_map(|line| SUBJECT_LABEL.captures(line))
            .map(|caps| caps[1].trim().to_string())
            .find(|rest| !rest.is_empty())
    }

    fn heading(&self, text: &str) -> Option<String> {
        text.lines().take(self.scan_lines).find_map(|line| {
            let upper = line.to_uppercase();
            DOCUMENT_HEADINGS
                .iter()
                .find(|heading| upper.contains(*heading))
                .map(|heading| heading.to_string())
        })
    }
}

impl Default for SubjectExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for SubjectExtractor {
    type Output = Option<String>;

    fn extract(&self, text: &str) -> Option<String> {
        Self::labelled(text).or_else(|| self.heading(text))
    }
}

/// Extract the subject from text.
pub fn extract_subject(text: &str) -> Option<String> {
    SubjectExtractor::new().extract(text)
}
