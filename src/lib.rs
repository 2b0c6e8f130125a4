//! Async client that answers chat conversations by running the Gemini CLI.
//!
//! Messages (text and images) are flattened into one prompt, the CLI runs as
//! a subprocess with a timeout, and its trimmed stdout is the answer.
//!
//! ```no_run
//! use gemini_relay::{ChatMessage, GeminiClient};
//!
//! # async fn demo() -> gemini_relay::Result<()> {
//! let client = GeminiClient::default();
//! let answer = client
//!     .generate(&[ChatMessage::user("Hello World!")], "gemini-2.5-pro")
//!     .await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod llm;
pub mod utils;

pub use config::ClientConfig;
pub use errors::{Error, Result};
pub use llm::{
    build_prompt, ChatContentPart, ChatMessage, GeminiClient, ImageUrl, LlmProvider,
    MessageContent, Role,
};
