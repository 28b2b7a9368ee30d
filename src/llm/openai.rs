//! OpenAI Chat Completions selector

use super::{parse_selection, selection_instruction, SelectorError, SelectorProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Selector backed by the OpenAI Chat Completions API. Requests JSON-object
/// output, so the model may wrap the array in a `files` field; the shared
/// parser unwraps both shapes.
pub struct OpenAiSelector {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiSelector {
    pub fn new(api_key: Option<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            model: model.into(),
            base_url: "https://api.openai.com".to_string(),
        }
    }

    /// Override the endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SelectorProvider for OpenAiSelector {
    fn provider_name(&self) -> &'static str {
        "openai"
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
            .ok_or(SelectorError::MissingCredential { provider: "openai" })?;

        let instruction = selection_instruction(available);
        let body = CompletionsRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &instruction,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.0,
            response_format: json!({ "type": "json_object" }),
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SelectorError::RequestFailed { status, message });
        }

        let parsed: CompletionsResponse = response.json().await?;
        let content = parsed
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| SelectorError::InvalidResponse {
                message: "response carried no message content".to_string(),
            })?;

        parse_selection(content).ok_or_else(|| SelectorError::InvalidResponse {
            message: "no JSON array found in response".to_string(),
        })
    }
}
