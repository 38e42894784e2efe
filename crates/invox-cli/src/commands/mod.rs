//! CLI subcommands.

pub mod batch;
pub mod process;

use std::sync::Arc;
use std::time::Duration;

use invox_core::{Pipeline, PipelineConfig};
use invox_inference::HttpProvider;

/// Load configuration from the optional `--config` path.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PipelineConfig> {
    match config_path {
        Some(path) => Ok(PipelineConfig::from_file(std::path::Path::new(path))?),
        None => Ok(PipelineConfig::default()),
    }
}

/// Build the pipeline, attaching the HTTP inference provider when `--ai` is
/// set. Endpoint settings come from the environment:
/// `INVOX_API_KEY` (required), `INVOX_API_URL`, `INVOX_MODEL`.
pub fn build_pipeline(config: &PipelineConfig, ai: bool) -> anyhow::Result<Pipeline> {
    let pipeline = Pipeline::new(config.clone());

    if !ai {
        return Ok(pipeline);
    }

    let api_key = std::env::var("INVOX_API_KEY")
        .map_err(|_| anyhow::anyhow!("INVOX_API_KEY env var required for --ai"))?;
    let base_url = std::env::var("INVOX_API_URL")
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    let model = std::env::var("INVOX_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

    let provider = HttpProvider::new(
        base_url,
        model,
        api_key,
        Duration::from_secs(config.ai_timeout_secs),
    )?;

    Ok(pipeline.with_provider(Arc::new(provider)))
}
