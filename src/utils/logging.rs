use crate::constants::APP_NAME;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the logging system with the specified log level.
///
/// Console output goes to stderr so the CLI answer on stdout stays clean.
///
/// # Arguments
///
/// * `log_level` - The desired log level or filter directive (e.g. "info", "gemini_relay=debug")
/// * `with_file` - Whether to also log to a daily rotating file in the "logs" directory.
pub fn init_logging(log_level: &str, with_file: bool) {
    let filter = match EnvFilter::try_new(log_level) {
        Ok(f) => f,
        Err(_) => {
            eprintln!("Invalid log level '{}', defaulting to 'warn'", log_level);
            EnvFilter::new("warn")
        }
    };

    let stderr_layer = fmt::layer()
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if with_file {
        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, "logs", format!("{}.log", APP_NAME));

        let file_layer = fmt::layer()
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }
}
