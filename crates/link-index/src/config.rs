use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default file looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "link-index.toml";

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding `pages/*.json`.
    pub notebook_dir: Option<PathBuf>,
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists.
    ///
    /// An explicit path that does not exist is an error; a missing default file is not.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply command-line overrides on top of file values.
    pub fn with_overrides(mut self, notebook_dir: Option<PathBuf>, log_filter: Option<String>) -> Self {
        if notebook_dir.is_some() {
            self.notebook_dir = notebook_dir;
        }
        if log_filter.is_some() {
            self.log_filter = log_filter;
        }
        self
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn notebook_dir(&self) -> anyhow::Result<&Path> {
        self.notebook_dir
            .as_deref()
            .context("no notebook directory configured (use --notebook or notebook_dir)")
    }
}
