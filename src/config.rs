//! Export configuration

use crate::aggregate::{DEFAULT_PACE_EVERY, DEFAULT_PACE_PAUSE};
use crate::output::EmptyPolicy;
use crate::region::DEFAULT_MAPPING_URL;
use crate::source::ripestat::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_RIPESTAT_URL, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Invalid configuration value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid configuration: {0}")]
pub struct ConfigError(pub String);

/// Configuration for an export run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Mapping document: URL or local path
    pub mapping: String,
    /// Root of the written artifacts (default: `.`)
    pub output_dir: PathBuf,
    /// Root of existing per-country files for the local source (default: `.`)
    pub input_dir: PathBuf,
    /// RIPEstat Data API root
    pub ripestat_url: String,
    /// `User-Agent` for all HTTP requests
    pub user_agent: String,
    /// Per-request timeout (default: 60s)
    pub request_timeout: Duration,
    /// Pause after this many registry calls; 0 disables pacing (default: 25)
    pub pace_every: usize,
    /// Length of each pacing pause (default: 1s)
    pub pace_pause: Duration,
    /// Handling of empty artifacts (default: skip)
    pub empty_policy: EmptyPolicy,
    /// Write `metadata.json` (default: true)
    pub write_metadata: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            mapping: DEFAULT_MAPPING_URL.to_string(),
            output_dir: PathBuf::from("."),
            input_dir: PathBuf::from("."),
            ripestat_url: DEFAULT_RIPESTAT_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            pace_every: DEFAULT_PACE_EVERY,
            pace_pause: DEFAULT_PACE_PAUSE,
            empty_policy: EmptyPolicy::default(),
            write_metadata: true,
        }
    }
}

impl ExportConfig {
    /// Create a new ExportConfig builder
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mapping.trim().is_empty() {
            return Err(ConfigError("mapping must be specified".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError("user_agent must not be empty".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }
        if !self.ripestat_url.starts_with("http://") && !self.ripestat_url.starts_with("https://")
        {
            return Err(ConfigError(format!(
                "ripestat_url must be an http(s) URL, got {:?}",
                self.ripestat_url
            )));
        }
        Ok(())
    }
}

/// Builder for ExportConfig
#[derive(Debug, Default)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mapping URL or path
    pub fn mapping(mut self, mapping: impl Into<String>) -> Self {
        self.config.mapping = mapping.into();
        self
    }

    /// Set the output root
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the root of existing per-country files
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    /// Set the RIPEstat API root
    pub fn ripestat_url(mut self, url: impl Into<String>) -> Self {
        self.config.ripestat_url = url.into();
        self
    }

    /// Set the HTTP user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the pacing batch size and pause
    pub fn pacing(mut self, every: usize, pause: Duration) -> Self {
        self.config.pace_every = every;
        self.config.pace_pause = pause;
        self
    }

    /// Set the empty artifact policy
    pub fn empty_policy(mut self, policy: EmptyPolicy) -> Self {
        self.config.empty_policy = policy;
        self
    }

    /// Enable or disable `metadata.json`
    pub fn write_metadata(mut self, enabled: bool) -> Self {
        self.config.write_metadata = enabled;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ExportConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
