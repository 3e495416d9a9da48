use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT: &str = "target/site/jacoco/jacoco.xml";
pub const DEFAULT_OUT_JSON: &str = "lines_to_cover.json";
pub const DEFAULT_OUT_CSV: &str = "lines_to_cover.csv";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportSettings,
}

/// Export settings, every field optional so CLI flags can layer on top
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub out_json: Option<PathBuf>,
    #[serde(default)]
    pub out_csv: Option<PathBuf>,
    /// Per-file CSV is skipped when unset
    #[serde(default)]
    pub per_file_out: Option<PathBuf>,
    /// Sonar project key embedded as `component.key`
    #[serde(default)]
    pub project_key: Option<String>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub input: PathBuf,
    pub out_json: PathBuf,
    pub out_csv: PathBuf,
    pub per_file_out: Option<PathBuf>,
    pub project_key: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }
}

impl ExportSettings {
    /// Fill unset fields from `fallback`
    pub fn or(self, fallback: ExportSettings) -> ExportSettings {
        ExportSettings {
            input: self.input.or(fallback.input),
            out_json: self.out_json.or(fallback.out_json),
            out_csv: self.out_csv.or(fallback.out_csv),
            per_file_out: self.per_file_out.or(fallback.per_file_out),
            project_key: self.project_key.or(fallback.project_key),
        }
    }

    /// Apply built-in defaults
    pub fn resolve(self) -> Options {
        Options {
            input: self.input.unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
            out_json: self.out_json.unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_JSON)),
            out_csv: self.out_csv.unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_CSV)),
            per_file_out: self.per_file_out,
            project_key: self.project_key,
        }
    }
}
