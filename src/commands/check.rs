use std::path::Path;

use anyhow::Result;

/// Execute the `check` command: validate a pipeline file and list its stages.
pub fn execute(pipeline_path: &Path, log_level: Option<&str>) -> Result<()> {
    let config = super::load_pipeline(pipeline_path, log_level)?;

    println!("Pipeline '{}': OK", config.name);
    for (i, stage) in config.stages.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, stage);
        if let shiftwork::StageKind::Gang { stages } = &stage.kind {
            for inner in stages {
                println!("        - {}", inner);
            }
        }
    }
    Ok(())
}
