//! Run configuration loaded from TOML, YAML, or JSON files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::perf::scenarios::find_scenario;
use crate::report::OutputFormat;
use crate::workload::{AccumulatorMode, Workload};

pub const DEFAULT_HISTORY_LIMIT: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub scenario: String,
    /// Falls back to the scenario's default when unset.
    pub round_size: Option<usize>,
    /// Unbounded when unset.
    pub rounds: Option<u64>,
    pub accumulator: AccumulatorMode,
    pub format: OutputFormat,
    pub record_dir: Option<PathBuf>,
    pub history_limit: usize,
    pub notes: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scenario: "append_squares".to_string(),
            round_size: None,
            rounds: None,
            accumulator: AccumulatorMode::Reset,
            format: OutputFormat::Text,
            record_dir: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            notes: None,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| anyhow!("config {} has no extension", path.display()))?;
        Self::parse(&src, &ext).with_context(|| format!("parse config {}", path.display()))
    }

    /// Parses `src` in the format named by `ext` (`toml`, `yaml`/`yml`, `json`).
    pub fn parse(src: &str, ext: &str) -> Result<Self> {
        let config: RunConfig = match ext {
            "toml" => toml::from_str(src)?,
            "yaml" | "yml" => serde_yaml::from_str(src)?,
            "json" => serde_json::from_str(src)?,
            other => bail!("unsupported config format '{}'", other),
        };
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let scenario = find_scenario(&self.scenario)?;
        if let Some(round_size) = self.round_size {
            scenario.build(self.accumulator).validate(round_size)?;
        }
        if self.history_limit == 0 {
            bail!("history_limit must be at least 1");
        }
        Ok(())
    }

    /// Round size to run with after applying the scenario default.
    pub fn effective_round_size(&self) -> Result<usize> {
        match self.round_size {
            Some(size) => Ok(size),
            None => Ok(find_scenario(&self.scenario)?.default_round_size()),
        }
    }
}
