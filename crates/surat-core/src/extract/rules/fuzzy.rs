//! Edit-distance keyword matching tolerant to OCR noise ("N0" for "No").

/// Maximum edit distance for a token to count as a keyword match.
pub const MAX_KEYWORD_DISTANCE: usize = 2;

/// Normalize text for keyword comparison.
///
/// Lowercases, reads `0` as `o`, drops everything except letters, digits,
/// whitespace and `/.-`, and collapses whitespace.
pub fn normalize_for_match(s: &str) -> String {
    let mapped: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c == '0' { 'o' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '/' | '.' | '-'))
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check whether `line` carries `keyword`, allowing OCR misreads.
///
/// Every keyword subtoken must either occur inside some line token or be
/// within [`MAX_KEYWORD_DISTANCE`] edits of one.
pub fn fuzzy_match_keyword(line: &str, keyword: &str) -> bool {
    let line = normalize_for_match(line);
    let keyword = normalize_for_match(keyword);

    let tokens: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
    let wanted: Vec<&str> = keyword.split(' ').filter(|t| !t.is_empty()).collect();

    if tokens.is_empty() || wanted.is_empty() {
        return false;
    }

    wanted.iter().all(|kw| {
        tokens
            .iter()
            .any(|t| t.contains(kw) || strsim::levenshtein(t, kw) <= MAX_KEYWORD_DISTANCE)
    })
}

/// Check a line against a keyword set.
pub fn matches_any_keyword(line: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| fuzzy_match_keyword(line, kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_edits_still_match() {
        // m->d and a->e
        assert!(fuzzy_match_keyword("Macember 2025", "december"));
        assert!(!fuzzy_match_keyword("Maxxmber 2025", "december"));
    }

    #[test]
    fn test_normalize_for_match() {
        assert_eq!(normalize_for_match("N0 :  725/SO"), "no 725/so");
        assert_eq!(normalize_for_match("  Invoice\tNo.#1 "), "invoice no.1");
    }

    #[test]
    fn test_fuzzy_match_ocr_noise() {
        assert!(fuzzy_match_keyword("N0: 123/ABC/2025", "no"));
        assert!(fuzzy_match_keyword("Nomer : 001/SK", "nomor"));
        assert!(fuzzy_match_keyword("INVOICE NO. INV-2025-001", "invoice no"));
        assert!(!fuzzy_match_keyword("Makassar", "invoice"));
    }

    #[test]
    fn test_fuzzy_match_requires_every_subtoken() {
        assert!(!fuzzy_match_keyword("surat pembaritahuan", "no surat xxxxxxxxx"));
        assert!(!fuzzy_match_keyword("", "no"));
    }
}
