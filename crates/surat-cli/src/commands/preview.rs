//! Preview command - extract metadata from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use surat_core::{ExtractionResult, LetterParser, TextSource};

use super::{format_result, load_config, OutputFormat};

/// Arguments for the preview command.
#[derive(Args)]
pub struct PreviewArgs {
    /// Input file (OCR text or text-based PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show the confidence breakdown
    #[arg(long)]
    show_confidence: bool,
}

pub async fn run(args: PreviewArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let source = TextSource::from_config(&config.source, &args.input)?;
    info!("Previewing {} as {}", args.input.display(), source.name());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading text...");
    let text = source
        .read_file(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    pb.set_position(40);

    if text.trim().is_empty() {
        pb.abandon_with_message("No text");
        anyhow::bail!("No text could be read from {}", args.input.display());
    }

    pb.set_message("Extracting fields...");
    let parser = LetterParser::from_config(&config.extraction);
    let result = parser.parse(&text);
    pb.finish_and_clear();

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        print_confidence(&result);
    }

    info!("Preview finished in {:?}", start.elapsed());
    Ok(())
}

/// Breakdown goes to stderr so stdout stays a single document.
fn print_confidence(result: &ExtractionResult) {
    let report = &result.confidence;
    let label = match report.overall_confidence {
        surat_core::Confidence::High => style(report.overall_confidence.as_str()).green(),
        surat_core::Confidence::Medium => style(report.overall_confidence.as_str()).yellow(),
        surat_core::Confidence::Low => style(report.overall_confidence.as_str()).red(),
    };

    eprintln!();
    eprintln!("{}", style("Confidence:").bold());
    eprintln!("  Overall:       {} ({})", report.overall_score, label);
    eprintln!("  Letter number: {}", report.details.letter_number);
    eprintln!("  Date:          {}", report.details.date);
    eprintln!("  Sender:        {}", report.details.sender);
    eprintln!("  Subject:       {}", report.details.subject);
    eprintln!("  Text quality:  {}", report.details.text_quality);
}
