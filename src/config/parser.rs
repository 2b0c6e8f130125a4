use super::ClientConfig;
use crate::constants::APP_NAME;
use crate::errors::Result;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Loads and parses a client configuration from a YAML file
///
/// Missing keys fall back to their defaults.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML configuration file
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read
/// * The YAML content cannot be parsed into a ClientConfig
pub fn load_client_config(file_path: &Path) -> Result<ClientConfig> {
    let yaml_str = fs::read_to_string(file_path)?;
    let config: ClientConfig = serde_yaml::from_str(&yaml_str)?;
    info!("Loaded client configuration from {}", file_path.display());
    Ok(config)
}

/// Per-user configuration file, e.g. `~/.config/gemini-relay/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.yaml"))
}

/// Builds the effective configuration: defaults, then the YAML file, then environment.
///
/// An explicit path must exist; the per-user file is only read when present.
pub fn resolve_client_config(explicit: Option<&Path>) -> Result<ClientConfig> {
    let mut config = match explicit {
        Some(path) => load_client_config(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => load_client_config(&path)?,
            None => {
                debug!("No configuration file found, using defaults");
                ClientConfig::default()
            }
        },
    };
    config.apply_env()?;
    Ok(config)
}
