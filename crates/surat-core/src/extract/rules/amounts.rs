//! Rupiah amount extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{
    BANK_LINE, ID_GROUPED_COMMA_DECIMAL, ID_GROUPED_DOT_CENTS, LINE_END_AMOUNT, RUPIAH_AMOUNT,
};
use super::FieldExtractor;

/// Accepted amounts and their sum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Amounts {
    /// Distinct values in the order they were accepted.
    pub values: Vec<Decimal>,
    /// Arithmetic sum of `values`, not checked against any stated total.
    pub total: Decimal,
}

impl Amounts {
    /// Add a value unless it is below `min`, already present, or would
    /// overflow the total.
    ///
    /// Duplicates are detected by numeric value only, so "1.500.000" and
    /// "1.500.000,00" count once while two different amounts always count.
    fn accept(&mut self, value: Decimal, min: Decimal) -> bool {
        if value < min || self.values.contains(&value) {
            return false;
        }
        let Some(total) = self.total.checked_add(value) else {
            return false;
        };
        self.values.push(value);
        self.total = total;
        true
    }
}

/// Amount field extractor.
pub struct AmountExtractor {
    min_amount: Decimal,
}

impl AmountExtractor {
    pub fn new() -> Self {
        Self {
            min_amount: Decimal::from(1000),
        }
    }

    /// Set the smallest accepted amount.
    pub fn with_min_amount(mut self, min: u64) -> Self {
        self.min_amount = Decimal::from(min);
        self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = Amounts;

    fn extract(&self, text: &str) -> Amounts {
        let mut amounts = Amounts::default();

        // "Rp" prefixed figures anywhere
        for caps in RUPIAH_AMOUNT.captures_iter(text) {
            if let Some(value) = parse_rupiah_amount(&caps[1]) {
                amounts.accept(value, self.min_amount);
            }
        }

        // Grouped figures closing a line, skipping bank details
        for line in text.lines().filter(|l| !BANK_LINE.is_match(l)) {
            if let Some(caps) = LINE_END_AMOUNT.captures(line) {
                if let Some(value) = parse_rupiah_amount(&caps[1]) {
                    amounts.accept(value, self.min_amount);
                }
            }
        }

        amounts
    }
}

/// Extract amounts from text with the default minimum.
pub fn extract_amounts(text: &str) -> Amounts {
    AmountExtractor::new().extract(text)
}

/// Parse an Indonesian-formatted number ("1.500.000,00", "1.500.00", "2500").
///
/// `.` groups thousands and `,` marks decimals. A token grouped by `.` that
/// ends in a two-digit group is read as cents only when it has more than one
/// `.`; a single `.` is treated as a thousands separator.
pub fn parse_rupiah_amount(token: &str) -> Option<Decimal> {
    let token = token.trim();

    let normalized = if ID_GROUPED_COMMA_DECIMAL.is_match(token) {
        token.replace('.', "").replace(',', ".")
    } else if ID_GROUPED_DOT_CENTS.is_match(token) {
        if token.matches('.').count() > 1 {
            let split = token.rfind('.')?;
            format!("{}.{}", token[..split].replace('.', ""), &token[split + 1..])
        } else {
            token.replace('.', "")
        }
    } else {
        token.replace('.', "").replace(',', ".")
    };

    Decimal::from_str(&normalized).ok().map(|d| d.normalize())
}
