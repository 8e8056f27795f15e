//! Date extraction for Indonesian and English letters.

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use super::patterns::{
    DATE_DMY, DATE_D_MONTH_Y, DATE_D_MONTH_Y_DASHED, DATE_WEEKDAY_D_MONTH_Y, DATE_YMD,
};
use super::FieldExtractor;

/// Concrete formats tried, in order, against every date-shaped match.
///
/// Tokens: `D`/`DD` day, `M`/`MM` month number, `MMM`/`MMMM` short/long month
/// name, `YY`/`YYYY` year, `dddd` weekday name. Anything else is literal.
pub const DATE_FORMATS: &[&str] = &[
    "DD/MM/YYYY",
    "D/M/YYYY",
    "DD-MM-YYYY",
    "D-M-YYYY",
    "DD.MM.YYYY",
    "D.M.YYYY",
    "D/M/YY",
    "D-M-YY",
    "D.M.YY",
    "YYYY-MM-DD",
    "YYYY/MM/DD",
    "YYYY.MM.DD",
    "YYYY-M-D",
    "YYYY/M/D",
    "D MMMM YYYY",
    "D MMM YYYY",
    "D MMM. YYYY",
    "dddd D MMMM YYYY",
    "dddd D MMM YYYY",
    "D-MMMM-YYYY",
    "D-MMM-YYYY",
    "D-MMM-YY",
];

/// Month and weekday vocabulary used while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLocale {
    Indonesian,
    English,
}

impl DateLocale {
    pub const ALL: [DateLocale; 2] = [DateLocale::Indonesian, DateLocale::English];

    fn months(&self) -> [&'static str; 12] {
        match self {
            Self::Indonesian => [
                "januari", "februari", "maret", "april", "mei", "juni", "juli", "agustus",
                "september", "oktober", "november", "desember",
            ],
            Self::English => [
                "january", "february", "march", "april", "may", "june", "july", "august",
                "september", "october", "november", "december",
            ],
        }
    }

    fn months_short(&self) -> [&'static str; 12] {
        match self {
            Self::Indonesian => [
                "jan", "feb", "mar", "apr", "mei", "jun", "jul", "agt", "sep", "okt", "nov", "des",
            ],
            Self::English => [
                "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
            ],
        }
    }

    /// Weekday names, Monday first.
    fn weekdays(&self) -> [&'static str; 7] {
        match self {
            Self::Indonesian => ["senin", "selasa", "rabu", "kamis", "jumat", "sabtu", "minggu"],
            Self::English => [
                "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
            ],
        }
    }
}

/// Strip commas and collapse whitespace in a matched date.
pub fn normalize_date_text(s: &str) -> String {
    s.replace(',', " ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn take_digits(rest: &mut &str, min: usize, max: usize) -> Option<u32> {
    let available = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if available < min {
        return None;
    }
    let n = available.min(max);
    let value = rest[..n].parse().ok()?;
    *rest = &rest[n..];
    Some(value)
}

/// Consume the longest name from `names` (case-insensitive), returning its index.
fn take_name(rest: &mut &str, names: &[&str]) -> Option<usize> {
    let (index, name) = names
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            rest.get(..name.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(name))
        })
        .max_by_key(|(_, name)| name.len())?;
    *rest = &rest[name.len()..];
    Some(index)
}

/// Parse `input` with one concrete format, requiring the whole input to match.
pub fn parse_strict(input: &str, format: &str, locale: DateLocale) -> Option<NaiveDate> {
    let mut rest = input;
    let mut fmt = format;
    let (mut day, mut month, mut year, mut weekday) = (None, None, None, None);

    while !fmt.is_empty() {
        if let Some(f) = fmt.strip_prefix("YYYY") {
            year = Some(take_digits(&mut rest, 4, 4)? as i32);
            fmt = f;
        } else if let Some(f) = fmt.strip_prefix("YY") {
            let yy = take_digits(&mut rest, 2, 2)? as i32;
            year = Some(if yy <= 68 { 2000 + yy } else { 1900 + yy });
            fmt = f;
        } else if let Some(f) = fmt.strip_prefix("MMMM") {
            month = Some(take_name(&mut rest, &locale.months())? as u32 + 1);
            fmt = f;
        } else if let Some(f) = fmt.strip_prefix("MMM") {
            month = Some(take_name(&mut rest, &locale.months_short())? as u32 + 1);
            fmt = f;
        } else if let Some(f) = fmt.strip_prefix("MM") {
            month = Some(take_digits(&mut rest, 2, 2)?);
            fmt = f;
        } else if let Some(f) = fmt.strip_prefix('M') {
            month = Some(take_digits(&mut rest, 1, 2)?);
            fmt = f;
        } else if let Some(f) = fmt.strip_prefix("DD") {
            day = Some(take_digits(&mut rest, 2, 2)?);
            fmt = f;
        } else if let Some(f) = fmt.strip_prefix('D') {
            day = Some(take_digits(&mut rest, 1, 2)?);
            fmt = f;
        } else if let Some(f) = fmt.strip_prefix("dddd") {
            weekday = Some(take_name(&mut rest, &locale.weekdays())? as u32);
            fmt = f;
        } else {
            let literal = fmt.chars().next()?;
            rest = rest.strip_prefix(literal)?;
            fmt = &fmt[literal.len_utf8()..];
        }
    }

    if !rest.is_empty() {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year?, month?, day?)?;
    match weekday {
        Some(wd) if date.weekday().num_days_from_monday() != wd => None,
        _ => Some(date),
    }
}

/// Try every format under every locale.
pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let normalized = normalize_date_text(s);
    DATE_FORMATS.iter().find_map(|format| {
        DateLocale::ALL
            .iter()
            .find_map(|locale| parse_strict(&normalized, format, *locale))
    })
}

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    fn patterns() -> [&'static Regex; 5] {
        [
            &*DATE_DMY,
            &*DATE_YMD,
            &*DATE_D_MONTH_Y,
            &*DATE_WEEKDAY_D_MONTH_Y,
            &*DATE_D_MONTH_Y_DASHED,
        ]
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = Option<NaiveDate>;

    fn extract(&self, text: &str) -> Option<NaiveDate> {
        Self::patterns()
            .into_iter()
            .flat_map(|pattern| pattern.find_iter(text))
            .find_map(|m| parse_date_text(m.as_str()))
    }
}

/// Extract the letter date from text.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    DateExtractor::new().extract(text)
}
