//! Process command - extract data from a single OCR result file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use invox_core::{InvoiceRecord, OcrResult};

use super::{build_pipeline, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (OCR result as JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Enable the AI extraction pass (reads INVOX_API_KEY)
    #[arg(long)]
    ai: bool,

    /// Show extraction confidence summary
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if extension != "json" {
        anyhow::bail!(
            "Unsupported file format: {extension} (expected an OCR result .json file)"
        );
    }

    info!("Processing file: {}", args.input.display());

    let ocr: OcrResult = serde_json::from_str(&fs::read_to_string(&args.input)?)?;
    let pipeline = build_pipeline(&config, args.ai)?;
    let record = pipeline.run(&ocr);

    let output = format_record(&record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{output}");
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Record confidence: {}, method: {}",
            style("ℹ").blue(),
            record.confidence.as_str(),
            record.extraction_method.as_str()
        );
        for warning in &record.metadata.warnings {
            println!("{} {}", style("!").yellow(), warning);
        }
    }

    Ok(())
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Vendor:  {}\n", record.vendor));
    output.push_str(&format!("Invoice: {}\n", record.invoice_number));
    output.push_str(&format!("Date:    {}\n", record.date));
    output.push_str(&format!(
        "Amount:  {} {}\n",
        record.amount, record.currency
    ));
    output.push_str(&format!(
        "Tax:     {} {}\n",
        record.tax_amount, record.currency
    ));

    if !record.line_items.is_empty() {
        output.push('\n');
        output.push_str("Line items:\n");
        for item in &record.line_items {
            output.push_str(&format!("  {} - {}\n", item.description, item.amount));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "Confidence: {} ({})\n",
        record.confidence.as_str(),
        record.extraction_method.as_str()
    ));

    output
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use invox_core::{Confidence, ExtractionMethod};

    use super::*;

    fn record() -> InvoiceRecord {
        InvoiceRecord {
            vendor: "Acme Corp".to_string(),
            amount: Decimal::new(12000, 2),
            date: "2024-03-15".to_string(),
            invoice_number: "INV-01".to_string(),
            tax_amount: Decimal::ZERO,
            currency: "USD".to_string(),
            line_items: Vec::new(),
            confidence: Confidence::High,
            extraction_method: ExtractionMethod::RuleOnly,
            metadata: Default::default(),
        }
    }

    #[test]
    fn json_output_round_trips() {
        let output = format_record(&record(), OutputFormat::Json).unwrap();
        let parsed: InvoiceRecord = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.vendor, "Acme Corp");
    }

    #[test]
    fn text_output_summarizes_the_record() {
        let output = format_record(&record(), OutputFormat::Text).unwrap();
        assert!(output.contains("Acme Corp"));
        assert!(output.contains("120.00 USD"));
        assert!(output.contains("high (rule_only)"));
    }
}
