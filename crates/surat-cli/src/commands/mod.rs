//! Subcommands and the output formats they share.

pub mod batch;
pub mod config;
pub mod preview;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use rust_decimal::Decimal;
use surat_core::{ExtractionResult, SuratConfig};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("surat")
        .join("config.json")
}

/// Load the explicit config file, or the default one if it exists, or defaults.
pub fn load_config(config_path: Option<&str>) -> Result<SuratConfig> {
    match config_path {
        Some(path) => SuratConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path)),
        None => {
            let path = default_config_path();
            if path.exists() {
                SuratConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))
            } else {
                Ok(SuratConfig::default())
            }
        }
    }
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

const CSV_HEADER: [&str; 10] = [
    "letter_number",
    "letter_date",
    "sender_name",
    "sender_confidence",
    "sender_source",
    "subject",
    "amounts",
    "total_amount",
    "overall_score",
    "overall_confidence",
];

fn format_csv(result: &ExtractionResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;

    let amounts = result
        .amounts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(";");

    wtr.write_record([
        result.letter_number.clone().unwrap_or_default(),
        result.letter_date.map(|d| d.to_string()).unwrap_or_default(),
        result.sender_name.clone().unwrap_or_default(),
        result.sender_confidence.to_string(),
        result
            .sender_source
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        result.subject.clone().unwrap_or_default(),
        amounts,
        result.total_amount.to_string(),
        result.confidence.overall_score.to_string(),
        result.confidence.overall_confidence.to_string(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();
    let or_dash = |v: Option<&str>| v.unwrap_or("-").to_string();

    output.push_str(&format!(
        "Document number: {}\n",
        or_dash(result.letter_number.as_deref())
    ));
    if result.candidates.len() > 1 {
        output.push_str(&format!("  Candidates: {}\n", result.candidates.join(", ")));
    }
    output.push_str(&format!(
        "Date: {}\n",
        result
            .letter_date
            .map(|d| d.format("%d %B %Y").to_string())
            .unwrap_or_else(|| "-".to_string())
    ));

    match (&result.sender_name, result.sender_source) {
        (Some(name), Some(source)) => output.push_str(&format!(
            "Sender: {} ({}, {})\n",
            name,
            result.sender_confidence,
            source.as_str()
        )),
        (Some(name), None) => output.push_str(&format!("Sender: {}\n", name)),
        (None, _) => output.push_str("Sender: -\n"),
    }
    output.push_str(&format!("Subject: {}\n", or_dash(result.subject.as_deref())));

    if !result.amounts.is_empty() {
        output.push_str("\nAmounts:\n");
        for amount in &result.amounts {
            output.push_str(&format!("  {}\n", format_rupiah(*amount)));
        }
        output.push_str(&format!("Total: {}\n", format_rupiah(result.total_amount)));
    }

    let missing = result.missing_fields();
    if !missing.is_empty() {
        output.push_str(&format!("\nMissing: {}\n", missing.join(", ")));
    }

    output
}

/// Rupiah with `.` thousands separators and `,` decimals.
pub fn format_rupiah(amount: Decimal) -> String {
    let amount = amount.normalize();
    let text = amount.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}Rp {},{}", sign, grouped, frac),
        None => format!("{}Rp {}", sign, grouped),
    }
}
