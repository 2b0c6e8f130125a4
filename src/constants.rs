/// Executable looked up on `PATH` when none is configured
pub const DEFAULT_EXECUTABLE: &str = "gemini";

/// Seconds a single CLI invocation may run before it is killed
pub const DEFAULT_TIMEOUT_SECS: f64 = 60.0;

/// Model passed with `-m` when the caller does not pick one
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Directory that receives decoded data-URI images. Relative to the working
/// directory because the CLI only resolves `@path` references inside it.
pub const DEFAULT_ATTACHMENT_DIR: &str = ".gemini_tmp";

/// Environment variable overriding the executable
pub const ENV_EXECUTABLE: &str = "GEMINI_CMD";

/// Environment variable overriding the timeout, in seconds
pub const ENV_TIMEOUT: &str = "GEMINI_TIMEOUT";

/// Environment variable overriding the model
pub const ENV_MODEL: &str = "GEMINI_MODEL";

/// Name of the per-user configuration directory and log file prefix
pub const APP_NAME: &str = "gemini-relay";
