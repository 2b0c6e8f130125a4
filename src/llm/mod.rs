mod attachment;
mod gemini_client;
mod message;
mod prompt;
mod provider;

pub use attachment::*;
pub use gemini_client::*;
pub use message::*;
pub use prompt::*;
pub use provider::*;
