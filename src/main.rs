//! Main entry point for the application.
//!
//! Loads environment variables and configuration, initializes logging, and
//! sends a conversation to the Gemini CLI.
//!
//! The application can be started in different modes:
//! - With a message file (`--messages`)
//! - With a one-shot prompt (`--prompt`, optionally `--system` and `--image`)
//! - Without either, as an interactive chat

use clap::Parser;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Input};
use gemini_relay::cli::Cli;
use gemini_relay::config::resolve_client_config;
use gemini_relay::{utils, ChatMessage, Error, GeminiClient};
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Main entry point that initializes and runs the application.
///
/// # Initialization steps:
/// 1. Parse CLI arguments
/// 2. Initialize logging system
/// 3. Load environment variables
/// 4. Resolve the client configuration
/// 5. Run a single request or the interactive chat
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    utils::init_logging(&cli.logging_level, cli.log_file);

    if let Err(e) = dotenvy::dotenv() {
        info!("No .env file loaded: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", "error:".red().bold(), e.to_string().red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> gemini_relay::Result<()> {
    let mut config = resolve_client_config(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    let client = GeminiClient::from_config(&config)?;
    info!(
        "Using '{}' with model {} ({}s timeout)",
        client.executable(),
        client.model(),
        client.timeout().as_secs_f64()
    );

    match cli.initial_messages()? {
        Some(messages) => {
            let answer = ask(&client, &messages).await?;
            println!("{}", answer);
        }
        None => chat(&client, cli.system.as_deref()).await?,
    }
    Ok(())
}

/// Runs one request with a spinner on stderr
async fn ask(client: &GeminiClient, messages: &[ChatMessage]) -> gemini_relay::Result<String> {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner} [{elapsed_precise}] {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Waiting for {}...", client.model()));

    let result = client.generate_default(messages).await;
    spinner.finish_and_clear();
    result
}

/// Interactive chat: keeps the history and replays it on every turn
///
/// Fails when the terminal cannot be read, e.g. when stdin is not a TTY.
async fn chat(client: &GeminiClient, system: Option<&str>) -> gemini_relay::Result<()> {
    println!(
        "{}",
        format!("Chatting with {} (empty line or 'exit' to quit)", client.model())
            .bold()
            .cyan()
    );

    let mut history: Vec<ChatMessage> = system.map(ChatMessage::system).into_iter().collect();

    loop {
        let input: String = match Input::with_theme(&ColorfulTheme::default())
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()
        {
            Ok(input) => input,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    e,
                )));
            }
        };

        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("exit") {
            break;
        }

        history.push(ChatMessage::user(input));
        match ask(client, &history).await {
            Ok(answer) => {
                println!("{} {}", "gemini:".green().bold(), answer);
                history.push(ChatMessage::assistant(answer));
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e.to_string().red());
                // Drop the unanswered turn so the next one starts clean.
                history.pop();
            }
        }
    }
    Ok(())
}
