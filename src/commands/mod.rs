pub mod check;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use shiftwork::config::{has_pipeline_extension, DEFAULT_LOG_LEVEL, PIPELINE_FILE_EXTENSION};
use shiftwork::{logging, PipelineConfig};

/// Load a pipeline file, then start logging at the command-line level, the
/// pipeline's own level, or the default, in that order.
fn load_pipeline(pipeline_path: &Path, log_level: Option<&str>) -> Result<PipelineConfig> {
    let config = PipelineConfig::load(pipeline_path)
        .with_context(|| format!("Failed to parse pipeline: {}", pipeline_path.display()))?;

    let level = log_level
        .or(config.log_level.as_deref())
        .unwrap_or(DEFAULT_LOG_LEVEL);
    logging::init(level);

    if !has_pipeline_extension(pipeline_path) {
        tracing::warn!(
            "{} does not have a .{} extension",
            pipeline_path.display(),
            PIPELINE_FILE_EXTENSION
        );
    }

    config.validate()?;
    Ok(config)
}
