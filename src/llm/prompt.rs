use crate::errors::{Error, Result};
use crate::llm::attachment::Attachments;
use crate::llm::{ChatContentPart, ChatMessage, MessageContent};
use std::path::Path;

/// Serialized request for the CLI: prompt text plus the files it references
#[derive(Debug)]
pub struct Prompt {
    pub text: String,
    pub attachments: Attachments,
}

/// Flattens chat messages into the single prompt string the CLI reads.
///
/// Each message becomes one `role: content` line. Text parts are concatenated,
/// remote images become ` <image>URL</image>` and data-URI images are decoded
/// into `attachment_dir` and referenced as ` @PATH`. http(s) URLs are passed
/// through verbatim, without further validation.
///
/// # Arguments
/// * `messages` - Conversation to serialize, must not be empty
/// * `attachment_dir` - Directory receiving decoded images
///
/// # Returns
/// * `Result<Prompt>` - Prompt text and the attachment guard
pub async fn build_prompt(messages: &[ChatMessage], attachment_dir: &Path) -> Result<Prompt> {
    if messages.is_empty() {
        return Err(Error::InvalidRequest("at least one message is required".into()));
    }

    let mut attachments = Attachments::new();
    let mut lines = Vec::with_capacity(messages.len());

    for message in messages {
        let body = match &message.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => {
                let mut body = String::new();
                for part in parts {
                    match part {
                        ChatContentPart::Text { text } => body.push_str(text),
                        ChatContentPart::ImageUrl { image_url } => {
                            let reference =
                                image_reference(&image_url.url, attachment_dir, &mut attachments)
                                    .await?;
                            body.push(' ');
                            body.push_str(&reference);
                        }
                    }
                }
                body
            }
        };
        lines.push(format!("{}: {}", message.role, body));
    }

    Ok(Prompt {
        text: lines.join("\n"),
        attachments,
    })
}

async fn image_reference(
    url: &str,
    attachment_dir: &Path,
    attachments: &mut Attachments,
) -> Result<String> {
    let scheme = url
        .split_once(':')
        .map(|(scheme, _)| scheme.trim().to_ascii_lowercase())
        .ok_or_else(|| Error::InvalidImage(format!("'{}' has no URL scheme", url)))?;

    match scheme.as_str() {
        "data" => {
            let path = attachments.save_data_url(attachment_dir, url).await?;
            Ok(format!("@{}", path.display()))
        }
        "http" | "https" => Ok(format!("<image>{}</image>", url)),
        other => Err(Error::InvalidImage(format!(
            "unsupported scheme '{}' in '{}'",
            other, url
        ))),
    }
}
