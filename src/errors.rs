use std::time::Duration;

/// Errors surfaced by the client and its configuration layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Gemini CLI timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("Gemini CLI failed ({}): {stderr}", describe_exit(.code))]
    ExecutionFailed { code: Option<i32>, stderr: String },
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "killed by signal".to_string(),
    }
}
