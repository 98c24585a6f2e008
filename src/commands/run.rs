use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use shiftwork::pipeline::{Pull, Supply, Value};

/// Execute the `run` command: wire a pipeline onto JSON-lines input and print
/// each output value as one JSON line.
pub fn execute(
    pipeline_path: &Path,
    input: Option<&Path>,
    limit: Option<u64>,
    log_level: Option<&str>,
) -> Result<()> {
    let config = super::load_pipeline(pipeline_path, log_level)?;

    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("Failed to open input: {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let tail = config
        .assemble(Supply::plugin(JsonLines::new(reader)))
        .with_context(|| format!("Failed to assemble pipeline '{}'", config.name))?;

    tracing::info!(
        "Running pipeline '{}' ({} stages)",
        config.name,
        config.stages.len()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut emitted = 0u64;
    while limit.map_or(true, |max| emitted < max) {
        let Some(value) = tail.pull()? else {
            break;
        };
        serde_json::to_writer(&mut out, &value)?;
        writeln!(out)?;
        emitted += 1;
    }
    out.flush()?;

    tracing::info!("Pipeline '{}' emitted {} values", config.name, emitted);
    Ok(())
}

/// Upstream that parses one JSON value per non-blank line, on demand.
struct JsonLines<R> {
    reader: RefCell<R>,
    line: Cell<usize>,
}

impl<R: BufRead> JsonLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader: RefCell::new(reader),
            line: Cell::new(0),
        }
    }
}

impl<R: BufRead> Pull for JsonLines<R> {
    fn pull(&self) -> shiftwork::Result<Option<Value>> {
        let mut reader = self.reader.borrow_mut();
        let mut buf = String::new();
        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line.set(self.line.get() + 1);
            if buf.trim().is_empty() {
                continue;
            }
            let value = serde_json::from_str(buf.trim()).map_err(|e| {
                shiftwork::ShiftworkError::from(e)
                    .with_context(format!("input line {}", self.line.get()))
            })?;
            return Ok(Some(value));
        }
    }
}
