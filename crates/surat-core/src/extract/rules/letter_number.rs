//! Document number extraction ("Nomor", "No. Surat", "Invoice No").

use tracing::debug;

use super::fuzzy::matches_any_keyword;
use super::patterns::{
    NUMBER_B_PREFIX, NUMBER_INVOICE, NUMBER_ROMAN_YEAR, NUMBER_SEGMENTED, PHONE, PHONE_LABEL,
};
use super::{content_lines, ExtractionCandidate, FieldExtractor};

/// Label keywords announcing a document number.
pub const NUMBER_KEYWORDS: &[&str] = &["nomor", "no", "invoice", "invoice no", "no surat"];

/// Minimum candidate length when no labelled line yields anything.
pub const MIN_FALLBACK_LEN: usize = 5;

const MONTHS_FULL: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "januari", "februari", "maret", "mei", "juni", "juli",
    "agustus", "oktober", "desember",
];

const MONTHS_ABBR: &[&str] = &[
    "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "agu",
    "agt", "agst", "okt", "des", "nop",
];

const ROMAN_MONTHS: &[&str] = &[
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// Scoring rules applied to every document number candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberRule {
    /// 5 points for three or more `/`/`-` segments, 2 for two.
    Segments,
    /// 2 points for a run of at least three digits.
    DigitRun,
    /// 1 point for a run of at least four digits.
    FourDigitRun,
    /// 1 point for a Roman numeral segment (month in Indonesian numbering).
    RomanNumeral,
    /// 2 points for length 10+, 1 for 8+.
    Length,
    /// 1 point when it starts with a letter and contains a digit.
    LetterLeadWithDigit,
}

impl NumberRule {
    pub const ALL: [NumberRule; 6] = [
        NumberRule::Segments,
        NumberRule::DigitRun,
        NumberRule::FourDigitRun,
        NumberRule::RomanNumeral,
        NumberRule::Length,
        NumberRule::LetterLeadWithDigit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Segments => "segments",
            Self::DigitRun => "digit_run",
            Self::FourDigitRun => "four_digit_run",
            Self::RomanNumeral => "roman_numeral",
            Self::Length => "length",
            Self::LetterLeadWithDigit => "letter_lead_with_digit",
        }
    }

    /// Points this rule gives `candidate`.
    pub fn points(&self, candidate: &str) -> u32 {
        match self {
            Self::Segments => {
                let segments = candidate
                    .split(['/', '-'])
                    .filter(|s| !s.is_empty())
                    .count();
                match segments {
                    n if n >= 3 => 5,
                    2 => 2,
                    _ => 0,
                }
            }
            Self::DigitRun => u32::from(longest_digit_run(candidate) >= 3) * 2,
            Self::FourDigitRun => u32::from(longest_digit_run(candidate) >= 4),
            Self::RomanNumeral => u32::from(
                candidate
                    .split(['/', '-', '.', ' '])
                    .any(|s| ROMAN_MONTHS.contains(&s)),
            ),
            Self::Length => match candidate.chars().count() {
                n if n >= 10 => 2,
                n if n >= 8 => 1,
                _ => 0,
            },
            Self::LetterLeadWithDigit => {
                let starts_alpha = candidate.chars().next().is_some_and(char::is_alphabetic);
                u32::from(starts_alpha && candidate.chars().any(|c| c.is_ascii_digit()))
            }
        }
    }
}

/// Total score of a candidate over all [`NumberRule`]s.
pub fn score_candidate(candidate: &str) -> u32 {
    NumberRule::ALL.iter().map(|rule| rule.points(candidate)).sum()
}

fn longest_digit_run(s: &str) -> usize {
    let mut best = 0;
    let mut run = 0;
    for c in s.chars() {
        if c.is_ascii_digit() {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

/// Whether a candidate names a calendar month and is probably a date.
pub fn mentions_month(candidate: &str) -> bool {
    let segments = candidate
        .split(['/', '-', '.', ' '])
        .filter(|s| !s.is_empty());

    for (i, segment) in segments.enumerate() {
        let word: String = segment
            .chars()
            .take_while(|c| c.is_alphabetic())
            .collect::<String>()
            .to_lowercase();
        if word.is_empty() {
            continue;
        }

        if MONTHS_FULL.contains(&word.as_str()) || MONTHS_ABBR.contains(&word.as_str()) {
            return true;
        }

        // OCR-garbled month in the leading segment ("Macember/2025")
        if i == 0
            && word.chars().count() >= 4
            && MONTHS_FULL
                .iter()
                .filter(|m| m.len() >= 5)
                .any(|m| strsim::levenshtein(&word, m) <= 2)
        {
            return true;
        }
    }

    false
}

/// Document number extraction result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterNumber {
    /// Highest ranked candidate that is not date-like.
    pub value: Option<String>,
    /// Deduplicated candidates, ranked ones first, then date-like ones.
    pub candidates: Vec<String>,
}

/// Document number field extractor.
pub struct LetterNumberExtractor {
    max_candidates: usize,
}

impl LetterNumberExtractor {
    pub fn new() -> Self {
        Self { max_candidates: 5 }
    }

    /// Set how many candidates are reported.
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// Collect raw candidates from one line, in pattern order.
    fn scan_line(line: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();

        let patterns = [
            &*NUMBER_SEGMENTED,
            &*NUMBER_ROMAN_YEAR,
            &*NUMBER_INVOICE,
            &*NUMBER_B_PREFIX,
        ];

        for pattern in patterns {
            for m in pattern.find_iter(line) {
                let cleaned: String = m
                    .as_str()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .trim_end_matches(['.', '-', '/'])
                    .to_string();

                if cleaned.chars().any(|c| c.is_ascii_digit()) && !found.contains(&cleaned) {
                    found.push(cleaned);
                }
            }
        }

        found
    }
}

impl Default for LetterNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn push_unique(into: &mut Vec<String>, values: impl IntoIterator<Item = String>) {
    for value in values {
        if !into.contains(&value) {
            into.push(value);
        }
    }
}

impl FieldExtractor for LetterNumberExtractor {
    type Output = LetterNumber;

    fn extract(&self, text: &str) -> LetterNumber {
        let lines = content_lines(text);
        let mut raw: Vec<String> = Vec::new();

        // Labelled lines first
        for (i, line) in lines.iter().enumerate() {
            if PHONE.is_match(line) || !matches_any_keyword(line, NUMBER_KEYWORDS) {
                continue;
            }

            let mut found = Self::scan_line(line);
            if found.is_empty() {
                if let Some(next) = lines.get(i + 1).filter(|l| !PHONE.is_match(l)) {
                    found = Self::scan_line(next);
                }
            }
            push_unique(&mut raw, found);
        }

        // Whole-text fallback
        if raw.is_empty() {
            for line in lines.iter().filter(|l| !PHONE_LABEL.is_match(l)) {
                let found = Self::scan_line(line)
                    .into_iter()
                    .filter(|c| c.chars().count() >= MIN_FALLBACK_LEN);
                push_unique(&mut raw, found);
            }
        }

        let (dated, plain): (Vec<String>, Vec<String>) =
            raw.into_iter().partition(|c| mentions_month(c));

        let mut ranked: Vec<ExtractionCandidate> = plain
            .into_iter()
            .map(|c| {
                let score = score_candidate(&c);
                ExtractionCandidate::new(c, score)
            })
            .collect();
        // Stable sort keeps scan order among equal scores
        ranked.sort_by(|a, b| b.score.cmp(&a.score));

        debug!(
            "Document number candidates: {:?}, date-like: {:?}",
            ranked, dated
        );

        let value = ranked.first().map(|c| c.value.clone());
        let candidates = ranked
            .into_iter()
            .map(|c| c.value)
            .chain(dated)
            .take(self.max_candidates)
            .collect();

        LetterNumber { value, candidates }
    }
}

/// Extract the document number from text.
pub fn extract_letter_number(text: &str) -> LetterNumber {
    LetterNumberExtractor::new().extract(text)
}
