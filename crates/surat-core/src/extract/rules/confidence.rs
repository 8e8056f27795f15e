//! Overall confidence scoring.
//!
//! The score is a plain weighted sum of per-field points. Every weight lives
//! in one of the constants below so each rule can be checked on its own.

use crate::models::record::{Confidence, ConfidenceDetails, ConfidenceReport};

pub const LETTER_NUMBER_POINTS: u32 = 25;
pub const DATE_POINTS: u32 = 20;
pub const SUBJECT_POINTS: u32 = 15;

/// Sender points by the sender extractor's own confidence.
pub const SENDER_HIGH_POINTS: u32 = 25;
pub const SENDER_MEDIUM_POINTS: u32 = 15;
pub const SENDER_LOW_POINTS: u32 = 5;

/// Text-quality bands as (exclusive lower ratio bound, points), best first.
pub const TEXT_QUALITY_BANDS: [(f64, u32); 3] = [(0.5, 15), (0.3, 10), (0.1, 5)];

pub const HIGH_TIER_SCORE: u32 = 70;
pub const MEDIUM_TIER_SCORE: u32 = 40;

/// What the scorer needs to know about one extraction.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceInput<'a> {
    pub has_letter_number: bool,
    pub has_date: bool,
    /// `None` when no sender was found.
    pub sender: Option<Confidence>,
    pub has_subject: bool,
    pub raw_text: &'a str,
}

/// Map a 0-100 score onto a tier.
pub fn tier_for_score(score: u32) -> Confidence {
    if score >= HIGH_TIER_SCORE {
        Confidence::High
    } else if score >= MEDIUM_TIER_SCORE {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Share of alphanumeric characters in the text; 0 for empty text.
pub fn alphanumeric_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let alnum = text.chars().filter(|c| c.is_alphanumeric()).count();
    alnum as f64 / total as f64
}

fn text_quality_points(text: &str) -> u32 {
    let ratio = alphanumeric_ratio(text);
    TEXT_QUALITY_BANDS
        .iter()
        .find(|(bound, _)| ratio > *bound)
        .map_or(0, |(_, points)| *points)
}

fn sender_points(sender: Option<Confidence>) -> u32 {
    match sender {
        Some(Confidence::High) => SENDER_HIGH_POINTS,
        Some(Confidence::Medium) => SENDER_MEDIUM_POINTS,
        Some(Confidence::Low) => SENDER_LOW_POINTS,
        None => 0,
    }
}

/// Combine field presence and text quality into one report.
pub fn score_confidence(input: &ConfidenceInput<'_>) -> ConfidenceReport {
    let details = ConfidenceDetails {
        letter_number: if input.has_letter_number { LETTER_NUMBER_POINTS } else { 0 },
        date: if input.has_date { DATE_POINTS } else { 0 },
        sender: sender_points(input.sender),
        subject: if input.has_subject { SUBJECT_POINTS } else { 0 },
        text_quality: text_quality_points(input.raw_text),
    };

    let overall_score = details.total().min(100);
    ConfidenceReport {
        overall_score,
        overall_confidence: tier_for_score(overall_score),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(text: &str) -> ConfidenceInput<'_> {
        ConfidenceInput {
            has_letter_number: false,
            has_date: false,
            sender: None,
            has_subject: false,
            raw_text: text,
        }
    }

    #[test]
    fn test_everything_found() {
        let report = score_confidence(&ConfidenceInput {
            has_letter_number: true,
            has_date: true,
            sender: Some(Confidence::High),
            has_subject: true,
            ..input("PT ABC 001/SK/2025")
        });

        assert_eq!(report.overall_score, 100);
        assert_eq!(report.overall_confidence, Confidence::High);
        assert_eq!(
            report.details,
            ConfidenceDetails {
                letter_number: 25,
                date: 20,
                sender: 25,
                subject: 15,
                text_quality: 15,
            }
        );
    }

    #[test]
    fn test_sender_points_follow_sender_confidence() {
        for (sender, points) in [
            (Some(Confidence::High), 25),
            (Some(Confidence::Medium), 15),
            (Some(Confidence::Low), 5),
            (None, 0),
        ] {
            let report = score_confidence(&ConfidenceInput { sender, ..input("") });
            assert_eq!(report.details.sender, points);
        }
    }

    #[test]
    fn test_text_quality_bands() {
        assert_eq!(score_confidence(&input("abcd")).details.text_quality, 15);
        // 2 of 5 alphanumeric
        assert_eq!(score_confidence(&input("ab   ")).details.text_quality, 10);
        // 1 of 5
        assert_eq!(score_confidence(&input("a ...")).details.text_quality, 5);
        assert_eq!(score_confidence(&input("  ...  ...")).details.text_quality, 0);
        assert_eq!(score_confidence(&input("")).details.text_quality, 0);
    }

    #[test]
    fn test_tiers_are_monotonic() {
        let mut previous = Confidence::Low;
        for score in 0..=100 {
            let tier = tier_for_score(score);
            assert!(tier >= previous, "tier dropped at score {score}");
            previous = tier;
        }
        assert_eq!(tier_for_score(39), Confidence::Low);
        assert_eq!(tier_for_score(40), Confidence::Medium);
        assert_eq!(tier_for_score(69), Confidence::Medium);
        assert_eq!(tier_for_score(70), Confidence::High);
    }

    #[test]
    fn test_date_and_number_only_is_medium() {
        let report = score_confidence(&ConfidenceInput {
            has_letter_number: true,
            has_date: true,
            ..input("")
        });
        assert_eq!(report.overall_score, 45);
        assert_eq!(report.overall_confidence, Confidence::Medium);
    }
}
