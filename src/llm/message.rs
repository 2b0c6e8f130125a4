use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of the message sender
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Lowercase name used as the line prefix in the prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image reference carried by an `image_url` part
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageUrl {
    /// Either an http(s) URL or a `data:<mime>;base64,<payload>` URI
    pub url: String,
}

/// One unit of a structured chat message
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ChatContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ChatContentPart::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ChatContentPart::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

/// Message body: plain text or an ordered list of parts
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<Vec<ChatContentPart>> for MessageContent {
    fn from(parts: Vec<ChatContentPart>) -> Self {
        MessageContent::Parts(parts)
    }
}

/// Represents a chat message with a role and content
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: Role,
    /// Plain text or multimodal parts
    pub content: MessageContent,
}

impl ChatMessage {
    /// Creates a new chat message
    ///
    /// # Arguments
    /// * `role` - Role of the message sender
    /// * `content` - Text or a list of content parts
    ///
    /// # Returns
    /// * `ChatMessage` - New chat message instance
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        ChatMessage {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_openai_style_messages() {
        let raw = r#"[
            {"role": "system", "content": "Be brief."},
            {"role": "user", "content": [
                {"type": "text", "text": "What is this?"},
                {"type": "image_url", "image_url": {"url": "https://example.com/cat.png"}}
            ]}
        ]"#;

        let messages: Vec<ChatMessage> = serde_json::from_str(raw).unwrap();

        assert_eq!(messages[0], ChatMessage::system("Be brief."));
        assert_eq!(
            messages[1],
            ChatMessage::user(vec![
                ChatContentPart::text("What is this?"),
                ChatContentPart::image_url("https://example.com/cat.png"),
            ])
        );
    }

    #[test]
    fn rejects_unknown_role() {
        let raw = r#"{"role": "tool", "content": "x"}"#;
        assert!(serde_json::from_str::<ChatMessage>(raw).is_err());
    }

    #[test]
    fn text_part_requires_text() {
        let raw = r#"{"type": "text"}"#;
        assert!(serde_json::from_str::<ChatContentPart>(raw).is_err());
    }

    #[test]
    fn serializes_parts_with_type_tag() {
        let part = ChatContentPart::image_url("data:image/png;base64,AAAA");
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["type"], "image_url");
        assert_eq!(value["image_url"]["url"], "data:image/png;base64,AAAA");
    }
}
