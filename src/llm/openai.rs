//! OpenAI chat completions and Responses API client

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use super::CompletionModel;
use crate::config::ModelConfig;
use crate::http::{check_status, invalid_response, transport_error};
use crate::{ErrorCode, TripBriefError};

const PROVIDER: &str = "OpenAI";

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    #[must_use]
    pub fn new(client: Client, config: &ModelConfig, api_key: String) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.name.clone(),
            temperature: config.temperature,
        }
    }

    /// Ask `model` to answer `input` with the hosted web search tool enabled
    #[instrument(skip(self, input))]
    pub async fn web_search(&self, model: &str, input: &str) -> crate::Result<String> {
        let url = format!("{}/responses", self.base_url);
        let body = json!({
            "model": model,
            "tools": [{"type": "web_search_preview"}],
            "input": input,
        });

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;
        let parsed: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| invalid_response(PROVIDER, e))?;

        let text = parsed.output_text();
        debug!(
            "Web search answered with {} chars in {:.3}s",
            text.len(),
            start.elapsed().as_secs_f64()
        );
        if text.trim().is_empty() {
            return Err(TripBriefError::api(
                "OpenAI web search returned no text",
                ErrorCode::ApiInvalidResponse,
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    #[instrument(skip(self, system, user), fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> crate::Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        info!("Requesting completion ({} prompt chars)", user.len());
        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| invalid_response(PROVIDER, e))?;

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 30 {
            warn!("Slow completion: {:.3}s", elapsed.as_secs_f64());
        }

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                TripBriefError::api(
                    "OpenAI returned an empty completion",
                    ErrorCode::ApiInvalidResponse,
                )
            })?;

        info!(
            "Completion received: {} chars in {:.3}s",
            content.len(),
            elapsed.as_secs_f64()
        );
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Responses API body; only assistant message text is kept
#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

impl ResponsesResponse {
    fn output_text(&self) -> String {
        let mut parts = Vec::new();
        for item in &self.output {
            if let OutputItem::Message { content } = item {
                for part in content {
                    if let ContentPart::OutputText { text } = part {
                        parts.push(text.as_str());
                    }
                }
            }
        }
        parts.join("\n")
    }
}
