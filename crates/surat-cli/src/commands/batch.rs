//! Batch command - run many documents through the preview queue.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use surat_core::models::config::SuratConfig;
use surat_core::{
    ExtractionResult, JobHandle, JobState, LetterParser, PreviewQueue, PreviewRequest,
    ResultCache, TextSource,
};

use super::{format_result, load_config, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of queue workers (default: queue.concurrency from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Per-document timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of one document.
struct FileOutcome {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
}

impl FileOutcome {
    fn failed(path: PathBuf, error: String) -> Self {
        Self {
            path,
            result: None,
            error: Some(error),
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let queue = start_queue(&args, &config)?;
    let submitter = format!("surat-cli-{}", std::process::id());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut outcomes = Vec::with_capacity(files.len());
    let mut pending: Vec<(PathBuf, JobHandle)> = Vec::new();

    for path in files {
        match read_request(&path, &config) {
            Ok(request) => {
                let handle = queue.enqueue(request, &submitter)?;
                debug!("Queued {} as job {}", path.display(), handle.job_id);
                pending.push((path, handle));
            }
            Err(e) => {
                if !args.continue_on_error {
                    queue.shutdown().await;
                    error!("Failed to read {}: {}", path.display(), e);
                    anyhow::bail!("Processing failed: {}", e);
                }
                warn!("Failed to read {}: {}", path.display(), e);
                outcomes.push(FileOutcome::failed(path, e.to_string()));
                pb.inc(1);
            }
        }
    }

    while !pending.is_empty() {
        tokio::time::sleep(POLL_INTERVAL).await;

        let mut still_pending = Vec::with_capacity(pending.len());
        for (path, handle) in pending {
            let Some(status) = queue.get_job_for_user(handle.job_id, &submitter) else {
                outcomes.push(FileOutcome::failed(path, "job is no longer tracked".to_string()));
                pb.inc(1);
                continue;
            };

            match status.state {
                JobState::Completed => {
                    outcomes.push(FileOutcome {
                        path,
                        result: status.result,
                        error: None,
                    });
                    pb.inc(1);
                }
                JobState::Failed => {
                    let message = status.error.unwrap_or_else(|| "unknown error".to_string());
                    if !args.continue_on_error {
                        pb.abandon();
                        queue.shutdown().await;
                        error!("Failed to process {}: {}", path.display(), message);
                        anyhow::bail!("Processing failed: {}", message);
                    }
                    warn!("Failed to process {}: {}", path.display(), message);
                    outcomes.push(FileOutcome::failed(path, message));
                    pb.inc(1);
                }
                JobState::Waiting | JobState::Active => still_pending.push((path, handle)),
            }
        }
        pending = still_pending;
    }

    pb.finish_with_message("Complete");
    queue.shutdown().await;

    if let Some(output_dir) = &args.output_dir {
        for outcome in &outcomes {
            if let Some(result) = &outcome.result {
                let output_name = outcome
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("letter");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_result(result, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = outcomes.iter().filter(|o| o.result.is_some()).count();
    let failed = outcomes.len() - successful;

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!("  {} successful", style(successful).green());
    if failed > 0 {
        println!("  {} failed", style(failed).red());
    }

    Ok(())
}

fn start_queue(args: &BatchArgs, config: &SuratConfig) -> anyhow::Result<PreviewQueue> {
    let mut queue_config = config.queue.clone();
    if let Some(jobs) = args.jobs {
        queue_config.concurrency = jobs;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        queue_config.timeout_ms = timeout_ms;
    }

    let cache = config
        .cache
        .enabled
        .then(|| Arc::new(ResultCache::from_config(&config.cache)));
    let parser = Arc::new(LetterParser::from_config(&config.extraction));

    Ok(PreviewQueue::start(&queue_config, parser, cache)?)
}

fn read_request(path: &Path, config: &SuratConfig) -> anyhow::Result<PreviewRequest> {
    let source = TextSource::from_config(&config.source, path)?;
    let text = source.read_file(path)?;

    Ok(PreviewRequest::new(text)
        .with_param("file", path.display().to_string())
        .with_param("source", source.name()))
}

fn write_summary(path: &Path, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "status",
        "letter_number",
        "letter_date",
        "sender_name",
        "subject",
        "total_amount",
        "overall_score",
        "overall_confidence",
        "error",
    ])?;

    for outcome in outcomes {
        let file = outcome.path.display().to_string();
        match &outcome.result {
            Some(result) => wtr.write_record([
                file,
                "success".to_string(),
                result.letter_number.clone().unwrap_or_default(),
                result.letter_date.map(|d| d.to_string()).unwrap_or_default(),
                result.sender_name.clone().unwrap_or_default(),
                result.subject.clone().unwrap_or_default(),
                result.total_amount.to_string(),
                result.confidence.overall_score.to_string(),
                result.confidence.overall_confidence.to_string(),
                String::new(),
            ])?,
            None => wtr.write_record([
                file,
                "error".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                outcome.error.clone().unwrap_or_default(),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}
