use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AiError, AiProvider};
use crate::config::AiConfig;

/// OpenAI-compatible chat completions client.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    vision_model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(cfg: &AiConfig, api_key: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            vision_model: cfg.vision_model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        })
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(model = %request.model, "sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(AiError::RateLimited);
            }
            return Err(AiError::Api(format!("{}: {}", status, error_text)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::Api(format!("Failed to parse response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(system),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Text(prompt),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        self.send(&request).await
    }

    async fn complete_with_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime: &str,
    ) -> Result<String, AiError> {
        let data_url = format!(
            "data:{};base64,{}",
            mime,
            general_purpose::STANDARD.encode(image)
        );
        let request = ChatRequest {
            model: &self.vision_model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ]),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        self.send(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vision_request_serializes_parts() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: "what?" },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,AA==".into(),
                        },
                    },
                ]),
            }],
            temperature: 0.2,
            max_tokens: 10,
        };
        let v = serde_json::to_value(&request).unwrap();
        let parts = &v["messages"][0]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,AA==");
    }

    #[test]
    fn text_message_is_plain_string() {
        let msg = ChatMessage {
            role: "system",
            content: MessageContent::Text("hi"),
        };
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["content"], "hi");
    }
}
