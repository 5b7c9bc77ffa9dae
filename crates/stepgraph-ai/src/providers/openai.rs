//! OpenAI provider implementation.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::MetadataProvider;
use crate::metadata::AssemblyMetadata;
use crate::prompt;

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key
                .unwrap_or_else(|| std::env::var("OPENAI_API_KEY").unwrap_or_default()),
            model: "gpt-4o-mini".to_string(),
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    async fn complete(&self, user_content: MessageContent) -> Result<Option<AssemblyMetadata>> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: MessageContent::Text(
                        "You are a helpful assistant that generates metadata for CAD assemblies."
                            .to_string(),
                    ),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_content,
                },
            ],
            temperature: 0.2,
            max_tokens: 1000,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error: {}", error_text);
        }

        let chat_response: ChatResponse = response.json().await?;
        let content = chat_response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();
        debug!(
            tokens = chat_response.usage.as_ref().map(|u| u.total_tokens),
            "metadata completion received"
        );

        let Some(json_str) = prompt::extract_json(content) else {
            warn!("model reply contained no JSON object");
            return Ok(None);
        };
        let value: serde_json::Value =
            serde_json::from_str(json_str).context("Failed to parse metadata JSON")?;
        // An empty object is the model's signal that the inputs carried
        // no usable information.
        if value.as_object().is_some_and(|m| m.is_empty()) {
            return Ok(None);
        }
        let metadata: AssemblyMetadata =
            serde_json::from_value(value).context("Unexpected metadata JSON shape")?;
        Ok(if metadata.is_empty() { None } else { Some(metadata) })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[async_trait::async_trait]
impl MetadataProvider for OpenAiProvider {
    async fn from_part_names(
        &self,
        file_name: &str,
        part_names: &[String],
    ) -> Result<Option<AssemblyMetadata>> {
        let content = MessageContent::Text(prompt::name_prompt(file_name, part_names));
        self.complete(content).await
    }

    async fn from_images(
        &self,
        file_name: &str,
        images: &[Vec<u8>],
    ) -> Result<Option<AssemblyMetadata>> {
        let mut parts = vec![ContentPart::Text {
            text: prompt::image_prompt(file_name),
        }];
        for png in images {
            parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:image/png;base64,{}", BASE64.encode(png)),
                },
            });
        }
        self.complete(MessageContent::Parts(parts)).await
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_parts_serialize_as_data_uris() {
        let part = ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:image/png;base64,{}", BASE64.encode(b"png-bytes")),
            },
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["type"], "image_url");
        assert!(json["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }

    #[test]
    fn text_content_serializes_as_plain_string() {
        let msg = ChatMessage {
            role: "user".to_string(),
            content: MessageContent::Text("hello".to_string()),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"], "hello");
    }
}
