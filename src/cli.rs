use crate::config::ClientConfig;
use crate::errors::{Error, Result};
use crate::llm::{ChatContentPart, ChatMessage};
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Command line interface for the application
#[derive(Parser, Debug)]
#[command(name = "gemini-relay", version, about = "Chat with Gemini through its CLI")]
pub struct Cli {
    /// YAML configuration file, defaults to the per-user config if present
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Gemini CLI executable name or path
    #[arg(long = "cmd")]
    pub executable: Option<String>,

    /// Seconds to wait for the CLI before killing it
    #[arg(short, long)]
    pub timeout: Option<f64>,

    /// Model passed to the CLI
    #[arg(short, long)]
    pub model: Option<String>,

    /// Send the prompt on stdin instead of as an argument
    #[arg(long)]
    pub stdin: bool,

    /// Run the CLI with --sandbox
    #[arg(long)]
    pub sandbox: bool,

    /// System instruction prepended to the conversation
    #[arg(short, long)]
    pub system: Option<String>,

    /// User prompt; without it (and without --messages) an interactive chat starts
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Image attached to the prompt: a local file or an http(s) URL (repeatable)
    #[arg(short, long = "image")]
    pub images: Vec<String>,

    /// JSON or YAML file holding the full message list
    #[arg(long, conflicts_with_all = ["prompt", "system", "images"])]
    pub messages: Option<PathBuf>,

    /// Sets the logging verbosity level for the application
    /// Possible values: "error", "warn", "info", "debug", "trace"
    #[arg(long, default_value_t = String::from("warn"))]
    pub logging_level: String,

    /// Also write logs to a daily rotating file under ./logs
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Applies command-line overrides on top of a resolved configuration
    pub fn apply_to(&self, config: &mut ClientConfig) {
        if let Some(executable) = &self.executable {
            config.executable = executable.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        config.prompt_via_stdin |= self.stdin;
        config.sandbox |= self.sandbox;
    }

    /// Builds the conversation from `--messages` or from `--system`, `--prompt` and `--image`
    ///
    /// # Returns
    /// * `Result<Option<Vec<ChatMessage>>>` - `None` when no prompt source was given
    pub fn initial_messages(&self) -> Result<Option<Vec<ChatMessage>>> {
        if let Some(path) = &self.messages {
            return load_messages(path).map(Some);
        }

        let Some(prompt) = &self.prompt else {
            return Ok(None);
        };

        let mut messages = Vec::new();
        if let Some(system) = &self.system {
            messages.push(ChatMessage::system(system.as_str()));
        }

        if self.images.is_empty() {
            messages.push(ChatMessage::user(prompt.as_str()));
        } else {
            let mut parts = vec![ChatContentPart::text(prompt.as_str())];
            for image in &self.images {
                parts.push(image_part(image)?);
            }
            messages.push(ChatMessage::user(parts));
        }

        Ok(Some(messages))
    }
}

/// Loads a message list from a `.yaml`/`.yml` or JSON file
pub fn load_messages(path: &Path) -> Result<Vec<ChatMessage>> {
    let raw = fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    let messages: Vec<ChatMessage> = if is_yaml {
        serde_yaml::from_str(&raw)?
    } else {
        serde_json::from_str(&raw)?
    };
    debug!("Loaded {} messages from {}", messages.len(), path.display());
    Ok(messages)
}

/// Turns an `--image` argument into a content part.
///
/// URLs pass through; local files are inlined as base64 data URIs.
pub fn image_part(source: &str) -> Result<ChatContentPart> {
    let lower = source.to_ascii_lowercase();
    if ["http://", "https://", "data:"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        return Ok(ChatContentPart::image_url(source));
    }

    let path = Path::new(source);
    let bytes = fs::read(path)
        .map_err(|e| Error::InvalidImage(format!("cannot read '{}': {}", source, e)))?;
    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };

    Ok(ChatContentPart::image_url(format!(
        "data:{};base64,{}",
        mime,
        STANDARD.encode(bytes)
    )))
}
