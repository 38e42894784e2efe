//! Batch processing command for multiple OCR result files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use invox_core::{InvoiceRecord, OcrResult};

use super::{build_pipeline, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern (OCR result .json files)
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file records
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Enable the AI extraction pass (reads INVOX_API_KEY)
    #[arg(long)]
    ai: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<InvoiceRecord>,
    error: Option<String>,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
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

    let pipeline = build_pipeline(&config, args.ai)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        match process_file(&path, &pipeline) {
            Ok(record) => {
                results.push(ProcessResult {
                    path,
                    record: Some(record),
                    error: None,
                });
            }
            Err(e) => {
                let message = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), message);
                    results.push(ProcessResult {
                        path,
                        record: None,
                        error: Some(message),
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), message);
                    anyhow::bail!("Processing failed: {message}");
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    // Write per-file outputs
    if let Some(ref output_dir) = args.output_dir {
        for result in results.iter().filter(|r| r.record.is_some()) {
            let record = result.record.as_ref().unwrap();
            let stem = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("record");
            let output_path = output_dir.join(format!("{stem}.record.json"));
            fs::write(&output_path, serde_json::to_string_pretty(record)?)?;
        }
    }

    if let Some(ref summary_path) = args.summary {
        write_summary(summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let succeeded = results.iter().filter(|r| r.record.is_some()).count();
    let failed = results.len() - succeeded;

    println!(
        "{} Processed {} files in {:.1}s ({} failed)",
        style("✓").green(),
        succeeded,
        start.elapsed().as_secs_f32(),
        failed
    );

    Ok(())
}

fn process_file(path: &PathBuf, pipeline: &invox_core::Pipeline) -> anyhow::Result<InvoiceRecord> {
    let ocr: OcrResult = serde_json::from_str(&fs::read_to_string(path)?)?;
    Ok(pipeline.run(&ocr))
}

fn write_summary(path: &PathBuf, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "vendor",
        "amount",
        "date",
        "invoice_number",
        "tax_amount",
        "currency",
        "confidence",
        "extraction_method",
        "error",
    ])?;

    for result in results {
        match &result.record {
            Some(record) => wtr.write_record([
                result.path.display().to_string(),
                record.vendor.clone(),
                record.amount.to_string(),
                record.date.clone(),
                record.invoice_number.clone(),
                record.tax_amount.to_string(),
                record.currency.clone(),
                record.confidence.as_str().to_string(),
                record.extraction_method.as_str().to_string(),
                String::new(),
            ])?,
            None => wtr.write_record([
                result.path.display().to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                result.error.clone().unwrap_or_default(),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}
