//! Anthropic Messages API selector

use super::{parse_selection, selection_instruction, SelectorError, SelectorProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 500;

/// Selector backed by the Anthropic Messages API
pub struct AnthropicSelector {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl AnthropicSelector {
    pub fn new(api_key: Option<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            model: model.into(),
            base_url: "https://api.anthropic.com".to_string(),
        }
    }

    /// Override the endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SelectorProvider for AnthropicSelector {
    fn provider_name(&self) -> &'static str {
        "anthropic"
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn select_files(
        &self,
        prompt: &str,
        available: &[String],
    ) -> Result<Vec<String>, SelectorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SelectorError::MissingCredential {
                provider: "anthropic",
            })?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: selection_instruction(available),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SelectorError::RequestFailed { status, message });
        }

        let parsed: MessagesResponse = response.json().await?;
        let text = parsed
            .content
            .first()
            .and_then(|block| block.text.as_deref())
            .ok_or_else(|| SelectorError::InvalidResponse {
                message: "response carried no text content".to_string(),
            })?;

        parse_selection(text).ok_or_else(|| SelectorError::InvalidResponse {
            message: "no JSON array found in response".to_string(),
        })
    }
}
