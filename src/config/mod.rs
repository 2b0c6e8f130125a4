mod parser;
use crate::constants::*;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use parser::{default_config_path, load_client_config, resolve_client_config};

/// Settings for the Gemini CLI client
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Executable name or path of the Gemini CLI
    pub executable: String,
    /// Seconds a single invocation may run before it is killed
    pub timeout_secs: f64,
    /// Model used when the caller does not pass one
    pub model: String,
    /// Directory receiving decoded data-URI images
    pub attachment_dir: PathBuf,
    /// Feed the prompt on stdin instead of through `-p`
    pub prompt_via_stdin: bool,
    /// Pass `--sandbox` to the CLI
    pub sandbox: bool,
    /// Arguments placed before the generated flags
    pub extra_args: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            executable: DEFAULT_EXECUTABLE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            model: DEFAULT_MODEL.to_string(),
            attachment_dir: PathBuf::from(DEFAULT_ATTACHMENT_DIR),
            prompt_via_stdin: false,
            sandbox: false,
            extra_args: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Converts `timeout_secs` into a `Duration`
    ///
    /// # Returns
    /// * `Result<Duration>` - The timeout, or a config error when it is not a positive finite number
    pub fn timeout(&self) -> Result<Duration> {
        if !(self.timeout_secs.is_finite() && self.timeout_secs > 0.0) {
            return Err(Error::Config(format!(
                "timeout must be a positive number of seconds, got {}",
                self.timeout_secs
            )));
        }
        Duration::try_from_secs_f64(self.timeout_secs).map_err(|e| Error::Config(e.to_string()))
    }

    /// Overrides fields from `GEMINI_CMD`, `GEMINI_TIMEOUT` and `GEMINI_MODEL`
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(executable) = lookup(ENV_EXECUTABLE).filter(|v| !v.trim().is_empty()) {
            self.executable = executable;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT).filter(|v| !v.trim().is_empty()) {
            self.timeout_secs = timeout.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a number, got '{}'", ENV_TIMEOUT, timeout))
            })?;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.model = model;
        }
        Ok(())
    }
}
