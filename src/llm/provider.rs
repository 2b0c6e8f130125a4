use crate::errors::Result;
use crate::llm::ChatMessage;
use async_trait::async_trait;
use std::fmt::Debug;

/// Backend able to answer a chat conversation
#[async_trait]
pub trait LlmProvider: Debug + Send + Sync {
    async fn call_llm_api(&self, messages: Vec<ChatMessage>) -> Result<String>;
}
