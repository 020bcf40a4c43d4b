//! Runtime configuration: which backend to use and where logs go.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::backend::{
    AnalyticBackend, CommandTransport, EmbeddedFunction, FeatureSetFile, LocalClipBackend,
    RemoteFunctionBackend,
};
use crate::error::{ConfigError, Result};
use crate::operations::DEFAULT_PRECISION;

const DEFAULT_FUNCTION: &str = "algis.calc_seismodensity";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Stored function reached through an external command.
    Remote {
        #[serde(default = "default_function")]
        function_name: String,
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
    /// Local clip of a polyline feature set file.
    Local { dataset: PathBuf },
    /// Stored function emulated in-process over a local dataset.
    Embedded {
        #[serde(default = "default_function")]
        function_name: String,
        dataset: PathBuf,
    },
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub backend: BackendConfig,
    /// Append-only log file; stderr when absent. Rotation is left to
    /// external tooling such as logrotate.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// `tracing_subscriber::EnvFilter` directives.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Decimal digits per serialized coordinate.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn default_function() -> String {
    DEFAULT_FUNCTION.to_owned()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_log_filter() -> String {
    "info".to_owned()
}

fn default_precision() -> usize {
    DEFAULT_PRECISION
}

impl Config {
    /// Reads and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read, parsed or
    /// validated.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the text is invalid.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(1..=17).contains(&self.precision) {
            return Err(ConfigError::Invalid {
                field: "precision",
                reason: format!("{} is outside 1..=17", self.precision),
            });
        }
        match &self.backend {
            BackendConfig::Remote {
                function_name,
                command,
                timeout_ms,
                ..
            } => {
                check_function_name(function_name)?;
                if command.trim().is_empty() {
                    return Err(ConfigError::Invalid {
                        field: "command",
                        reason: "must not be empty".into(),
                    });
                }
                if *timeout_ms == 0 {
                    return Err(ConfigError::Invalid {
                        field: "timeout_ms",
                        reason: "must be positive".into(),
                    });
                }
            }
            BackendConfig::Embedded { function_name, .. } => check_function_name(function_name)?,
            BackendConfig::Local { .. } => {}
        }
        Ok(())
    }

    /// Builds the configured backend.
    #[must_use]
    pub fn build_backend(&self) -> Box<dyn AnalyticBackend> {
        match &self.backend {
            BackendConfig::Remote {
                function_name,
                command,
                args,
                timeout_ms,
            } => {
                let transport = CommandTransport::new(
                    command.as_str(),
                    args.clone(),
                    Duration::from_millis(*timeout_ms),
                );
                Box::new(
                    RemoteFunctionBackend::new(function_name.as_str(), transport)
                        .with_precision(self.precision),
                )
            }
            BackendConfig::Local { dataset } => {
                Box::new(LocalClipBackend::new(FeatureSetFile::new(dataset)))
            }
            BackendConfig::Embedded {
                function_name,
                dataset,
            } => {
                let function = EmbeddedFunction::new(FeatureSetFile::new(dataset));
                Box::new(
                    RemoteFunctionBackend::new(function_name.as_str(), function)
                        .with_precision(self.precision),
                )
            }
        }
    }
}

/// Function names end up verbatim in the query text.
fn check_function_name(name: &str) -> std::result::Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: "function_name",
            reason: format!("{name:?} is not a plain identifier"),
        })
    }
}
