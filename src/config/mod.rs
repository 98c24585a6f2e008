//! Configuration module for shiftwork
//!
//! A pipeline file is TOML describing a chain of built-in stages that the
//! `shiftwork` binary wires onto its input.
//!
//! # Example
//!
//! ```toml
//! name = "orders"
//! log_level = "info"
//!
//! [defaults]
//! gathering = 10
//!
//! [[stages]]
//! kind = "has_field"
//! field = "id"
//!
//! [[stages]]
//! kind = "pluck"
//! field = "id"
//!
//! [[stages]]
//! kind = "batch"
//! ```
//!
//! Every stage accepts `tags = [..]` and `enabled = false`. A disabled stage
//! stays in the chain but passes values through untouched.

use crate::error::{Result, ResultExt, ShiftworkError};
use crate::pipeline::stages::{
    batch, filter, relay, side_effect, splitter, trailing, BatchOptions, SideEffectMode,
    DEFAULT_TRAIL_LENGTH,
};
use crate::pipeline::{criterion, Gang, Supply, Task, Value, Worker};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Pipeline file extension
pub const PIPELINE_FILE_EXTENSION: &str = "toml";

/// Log level used when neither the command line nor the pipeline sets one
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Whether `path` carries the pipeline file extension
pub fn has_pipeline_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PIPELINE_FILE_EXTENSION))
}

/// A configured chain of stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name, used in log output
    #[serde(default = "default_name")]
    pub name: String,
    /// Log level filter (error, warn, info, debug, trace)
    #[serde(default)]
    pub log_level: Option<String>,
    /// Fallback options for stages that leave them unset
    #[serde(default)]
    pub defaults: StageDefaults,
    /// Stages, most-upstream first
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

fn default_name() -> String {
    "pipeline".to_string()
}

/// Fallback stage options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageDefaults {
    /// Batch size for `batch` stages without their own `gathering`
    pub gathering: usize,
    /// Window size for `trailing` stages without their own `size`
    pub trailing: usize,
    /// Side-effect mode for `tap` stages without their own `hardened`
    pub side_effect: SideEffectMode,
}

impl Default for StageDefaults {
    fn default() -> Self {
        Self {
            gathering: BatchOptions::default().gathering,
            trailing: DEFAULT_TRAIL_LENGTH,
            side_effect: SideEffectMode::Normal,
        }
    }
}

/// One configured stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(flatten)]
    pub kind: StageKind,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Built-in stage behaviors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageKind {
    /// Emit array elements one at a time; strings split on `separator`
    /// (whitespace when unset)
    Split {
        #[serde(default)]
        separator: Option<String>,
    },
    /// Drop `null` values
    Compact,
    /// Replace each object with one of its fields (`null` when missing)
    Pluck { field: String },
    /// Keep only objects that carry `field`
    HasField { field: String },
    /// Gather values into arrays
    Batch {
        #[serde(default)]
        gathering: Option<usize>,
    },
    /// Sliding window, most recent first
    Trailing {
        #[serde(default)]
        size: Option<usize>,
    },
    /// Log each value and pass it on
    Tap {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        hardened: Option<bool>,
    },
    /// A nested chain presented as one stage
    Gang { stages: Vec<StageConfig> },
}

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Split { .. } => "split",
            StageKind::Compact => "compact",
            StageKind::Pluck { .. } => "pluck",
            StageKind::HasField { .. } => "has_field",
            StageKind::Batch { .. } => "batch",
            StageKind::Trailing { .. } => "trailing",
            StageKind::Tap { .. } => "tap",
            StageKind::Gang { .. } => "gang",
        }
    }
}

impl fmt::Display for StageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StageKind::Pluck { field } | StageKind::HasField { field } => {
                write!(f, "{} {:?}", self.kind.name(), field)?
            }
            StageKind::Batch {
                gathering: Some(n),
            } => write!(f, "batch of {}", n)?,
            StageKind::Trailing { size: Some(n) } => write!(f, "trailing {}", n)?,
            StageKind::Tap { label: Some(l), .. } => write!(f, "tap {:?}", l)?,
            StageKind::Gang { stages } => write!(f, "gang of {}", stages.len())?,
            other => write!(f, "{}", other.name())?,
        }
        if !self.tags.is_empty() {
            write!(f, " [{}]", self.tags.join(", "))?;
        }
        if !self.enabled {
            write!(f, " (disabled)")?;
        }
        Ok(())
    }
}

impl PipelineConfig {
    /// Load a pipeline file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ShiftworkError::Config(format!("Failed to read pipeline file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&content).with_context(|| format!("{:?}", path))
    }

    /// Parse a pipeline from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ShiftworkError::Config(format!("Failed to parse pipeline: {}", e)))
    }

    /// Serialize the pipeline back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ShiftworkError::Config(format!("Failed to serialize pipeline: {}", e)))
    }

    /// Check the pipeline for structural problems
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(ShiftworkError::Config(format!(
                "Pipeline '{}' has no stages",
                self.name
            )));
        }
        if self.defaults.gathering == 0 {
            return Err(ShiftworkError::Config(
                "defaults.gathering must be at least 1".to_string(),
            ));
        }
        if self.defaults.trailing == 0 {
            return Err(ShiftworkError::Config(
                "defaults.trailing must be at least 1".to_string(),
            ));
        }
        for (index, stage) in self.stages.iter().enumerate() {
            stage
                .validate(false)
                .with_context(|| format!("stage {} ({})", index, stage.kind.name()))?;
        }
        Ok(())
    }

    /// Wire the configured stages onto `source` and return the tail of the
    /// chain, ready to be pulled.
    pub fn assemble(&self, source: impl Into<Supply>) -> Result<Supply> {
        self.validate()?;
        let mut tail = source.into();
        for (index, stage) in self.stages.iter().enumerate() {
            tail = stage
                .attach(tail, &self.defaults)
                .with_context(|| format!("stage {} ({})", index, stage.kind.name()))?;
        }
        tracing::debug!(
            "Assembled pipeline '{}' with {} stages",
            self.name,
            self.stages.len()
        );
        Ok(tail)
    }
}

impl StageConfig {
    pub fn new(kind: StageKind) -> Self {
        Self {
            kind,
            tags: Vec::new(),
            enabled: true,
        }
    }

    fn validate(&self, nested: bool) -> Result<()> {
        let invalid = |msg: &str| Err(ShiftworkError::Config(msg.to_string()));
        match &self.kind {
            StageKind::Pluck { field } | StageKind::HasField { field } if field.is_empty() => {
                invalid("field must not be empty")
            }
            StageKind::Split {
                separator: Some(sep),
            } if sep.is_empty() => invalid("separator must not be empty"),
            StageKind::Batch { gathering: Some(0) } => invalid("gathering must be at least 1"),
            StageKind::Trailing { size: Some(0) } => invalid("size must be at least 1"),
            StageKind::Gang { .. } if nested => invalid("gangs cannot be nested"),
            StageKind::Gang { stages } if stages.is_empty() => invalid("gang has no stages"),
            StageKind::Gang { stages } => {
                for (index, stage) in stages.iter().enumerate() {
                    stage
                        .validate(true)
                        .with_context(|| format!("gang stage {} ({})", index, stage.kind.name()))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn attach(&self, supply: Supply, defaults: &StageDefaults) -> Result<Supply> {
        if let StageKind::Gang { stages } = &self.kind {
            let workers = stages
                .iter()
                .map(|stage| stage.build_worker(defaults))
                .collect::<Result<Vec<_>>>()?;
            let mut builder = Gang::builder(workers).tags(self.tags.clone());
            if !self.enabled {
                builder = builder.criterion(criterion(|_| false));
            }
            let gang = builder.build()?;
            gang.set_supply(supply)?;
            return Ok(gang.into());
        }

        let worker = self.build_worker(defaults)?;
        worker.set_supply(supply)?;
        Ok(worker.into())
    }

    fn build_worker(&self, defaults: &StageDefaults) -> Result<Worker> {
        let worker = match &self.kind {
            StageKind::Split { separator } => {
                let separator = separator.clone();
                splitter(Task::consumer(move |value| {
                    Ok(Some(split_value(value, separator.as_deref())))
                }))?
            }
            StageKind::Compact => filter(Task::predicate(|value: &Value| !value.is_null()))?,
            StageKind::Pluck { field } => {
                let field = field.clone();
                relay(Task::consumer(move |value| {
                    Ok(Some(value.get(&field).cloned().unwrap_or(Value::Null)))
                }))?
            }
            StageKind::HasField { field } => {
                let field = field.clone();
                filter(Task::predicate(move |value: &Value| {
                    value.get(&field).is_some()
                }))?
            }
            StageKind::Batch { gathering } => batch(
                BatchOptions::gathering(gathering.unwrap_or(defaults.gathering)),
                None,
            )?,
            StageKind::Trailing { size } => trailing(size.unwrap_or(defaults.trailing))?,
            StageKind::Tap { label, hardened } => {
                let label = label.clone().unwrap_or_else(|| "tap".to_string());
                let mode = match hardened {
                    Some(true) => SideEffectMode::Hardened,
                    Some(false) => SideEffectMode::Normal,
                    None => defaults.side_effect,
                };
                side_effect(
                    Task::consumer(move |value| {
                        tracing::info!("{}: {}", label, value);
                        Ok(None)
                    }),
                    mode,
                )?
            }
            StageKind::Gang { .. } => {
                return Err(ShiftworkError::Config("gangs cannot be nested".to_string()))
            }
        };

        for tag in &self.tags {
            worker.add_tag(tag.as_str());
        }
        if !self.enabled {
            worker.add_criterion(criterion(|_| false));
        }
        Ok(worker)
    }
}

fn split_value(value: Value, separator: Option<&str>) -> Value {
    match value {
        Value::String(s) => {
            let parts: Vec<Value> = match separator {
                Some(sep) => s.split(sep).map(Value::from).collect(),
                None => s.split_whitespace().map(Value::from).collect(),
            };
            Value::Array(parts)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stages::source;
    use serde_json::json;

    fn drain(tail: &Supply) -> Vec<Value> {
        std::iter::from_fn(|| tail.pull().unwrap()).collect()
    }

    #[test]
    fn test_pipeline_extension() {
        assert!(has_pipeline_extension("orders.toml"));
        assert!(has_pipeline_extension("dir/ORDERS.TOML"));
        assert!(!has_pipeline_extension("orders.yaml"));
        assert!(!has_pipeline_extension("orders"));
    }

    #[test]
    fn test_parse_stages() {
        let config = PipelineConfig::from_toml_str(
            r#"
            name = "demo"

            [[stages]]
            kind = "pluck"
            field = "id"
            tags = ["ids"]

            [[stages]]
            kind = "batch"
            gathering = 2
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "demo");
        assert_eq!(config.log_level, None);
        assert_eq!(config.stages.len(), 2);
        assert_eq!(
            config.stages[0].kind,
            StageKind::Pluck {
                field: "id".to_string()
            }
        );
        assert_eq!(config.stages[0].tags, vec!["ids".to_string()]);
        assert!(config.stages[0].enabled);
        assert!(!config.stages[1].enabled);
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_toml_str("[[stages]]\nkind = \"compact\"\n").unwrap();
        assert_eq!(config.name, "pipeline");
        assert_eq!(config.defaults, StageDefaults::default());
        assert_eq!(config.defaults.trailing, DEFAULT_TRAIL_LENGTH);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = PipelineConfig::from_toml_str("[[stages]]\nkind = \"explode\"\n").unwrap_err();
        assert!(matches!(err, ShiftworkError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_empty() {
        let config = PipelineConfig::from_toml_str("name = \"empty\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nested_gang() {
        let inner = StageConfig::new(StageKind::Gang {
            stages: vec![StageConfig::new(StageKind::Compact)],
        });
        let config = PipelineConfig {
            name: "nested".to_string(),
            log_level: None,
            defaults: StageDefaults::default(),
            stages: vec![StageConfig::new(StageKind::Gang {
                stages: vec![inner],
            })],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("nested"));
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        for kind in [
            StageKind::Batch { gathering: Some(0) },
            StageKind::Trailing { size: Some(0) },
        ] {
            let config = PipelineConfig {
                name: "zero".to_string(),
                log_level: None,
                defaults: StageDefaults::default(),
                stages: vec![StageConfig::new(kind)],
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_assemble_runs_chain() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [[stages]]
            kind = "has_field"
            field = "n"

            [[stages]]
            kind = "pluck"
            field = "n"

            [[stages]]
            kind = "batch"
            gathering = 2
            "#,
        )
        .unwrap();

        let input = source(json!([{"n": 1}, {"m": 2}, {"n": 3}, {"n": 4}])).unwrap();
        let tail = config.assemble(input).unwrap();
        assert_eq!(drain(&tail), vec![json!([1, 3]), json!([4])]);
    }

    #[test]
    fn test_disabled_stage_is_transparent() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [[stages]]
            kind = "compact"
            enabled = false
            "#,
        )
        .unwrap();
        let tail = config.assemble(source(json!([1, null, 2])).unwrap()).unwrap();
        assert_eq!(drain(&tail), vec![json!(1), Value::Null, json!(2)]);
    }

    #[test]
    fn test_split_and_gang() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [[stages]]
            kind = "gang"
            tags = ["words"]

            [[stages.stages]]
            kind = "split"

            [[stages.stages]]
            kind = "trailing"
            "#,
        )
        .unwrap();
        let tail = config.assemble(source(json!(["a b c"])).unwrap()).unwrap();
        assert!(tail.as_gang().is_some());
        assert_eq!(drain(&tail), vec![json!(["b", "a"]), json!(["c", "b"])]);
    }

    #[test]
    fn test_tap_passes_values_through() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [[stages]]
            kind = "tap"
            label = "seen"
            hardened = true
            "#,
        )
        .unwrap();
        let tail = config.assemble(source(json!([{"a": 1}])).unwrap()).unwrap();
        assert_eq!(drain(&tail), vec![json!({"a": 1})]);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut stage = StageConfig::new(StageKind::Trailing { size: Some(3) });
        stage.tags = vec!["window".to_string()];
        let config = PipelineConfig {
            name: "trip".to_string(),
            log_level: Some("debug".to_string()),
            defaults: StageDefaults::default(),
            stages: vec![stage],
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_display_stage() {
        let mut stage = StageConfig::new(StageKind::Batch { gathering: Some(5) });
        stage.tags = vec!["bulk".to_string()];
        stage.enabled = false;
        assert_eq!(stage.to_string(), "batch of 5 [bulk] (disabled)");
        assert_eq!(StageConfig::new(StageKind::Compact).to_string(), "compact");
    }
}
