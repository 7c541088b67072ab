//! Configuration management for the CLI.
//!
//! Precedence, lowest first: built-in defaults, `~/.docket/config.toml` (or
//! `--config`), environment variables (including a `.env` file), then
//! command-line flags.

use crate::error::{CliError, Result};
use docket_document::DocumentConfig;
use docket_llm::{ProviderKind, ProviderOverrides};
use docket_pipeline::{PipelineOptions, ProviderSettings, SelectionConfig, DEFAULT_MAX_WORKERS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Which extractors to use
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Document extraction settings
    #[serde(default)]
    pub document: DocumentConfig,

    /// Per-provider settings keyed by provider key
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderOverrides>,

    /// Benchmark pool settings
    #[serde(default)]
    pub benchmark: BenchmarkSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Benchmark pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSettings {
    /// Concurrent (provider, document) tasks
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Append per-file timing columns
    #[serde(default = "default_true")]
    pub timing: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".docket").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match Self::path() {
                Ok(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };
        let contents = fs::read_to_string(&path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.document.validate().map_err(CliError::Config)?;
        if self.benchmark.max_workers == 0 {
            return Err(CliError::Config("benchmark.max_workers must be greater than 0".into()));
        }
        for key in self.providers.keys() {
            key.parse::<ProviderKind>()
                .map_err(|e| CliError::Config(format!("[providers.{}]: {}", key, e)))?;
        }
        Ok(())
    }

    /// Apply `DOC_EXTRACTOR`, `EVENT_EXTRACTOR` and `ENABLE_PERFORMANCE_TIMING`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        if let Some(doc) = read("DOC_EXTRACTOR") {
            self.selection.doc_extractor = doc;
        }
        if let Some(event) = read("EVENT_EXTRACTOR") {
            self.selection.event_extractor = event;
        }
        if let Some(timing) = read("ENABLE_PERFORMANCE_TIMING") {
            self.settings.timing = timing.eq_ignore_ascii_case("true");
        }
    }

    /// Resolve every provider: defaults, file section, then environment.
    pub fn provider_settings<F>(&self, lookup: F) -> Result<ProviderSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = ProviderSettings::new();
        for (key, overrides) in &self.providers {
            let kind = key
                .parse::<ProviderKind>()
                .map_err(|e| CliError::Config(e.to_string()))?;
            settings.apply(kind, overrides);
        }
        for kind in ProviderKind::ALL {
            settings.apply(kind, &ProviderOverrides::from_lookup(kind, &lookup));
        }
        Ok(settings)
    }

    /// Pipeline switches.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            timing: self.settings.timing,
        }
    }
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            timing: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_max_workers() -> usize {
    DEFAULT_MAX_WORKERS
}
