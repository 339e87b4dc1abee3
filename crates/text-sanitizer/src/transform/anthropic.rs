use super::prompt::build_prompt;
use super::{TextTransformer, TransformOutcome, TransformRequest};
use crate::config::ServiceConfig;
use crate::utils::error::{Result, SanitizerError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Messages API client used as the transformation service.
pub struct AnthropicTransformer {
    client: Client,
    config: ServiceConfig,
}

impl AnthropicTransformer {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }
}

/// Map a non-success response to either a rejection or a retryable error.
fn classify_failure(status: StatusCode, body: &str) -> Result<TransformOutcome> {
    if body.to_lowercase().contains("content filtering") {
        return Ok(TransformOutcome::Rejected);
    }

    Err(SanitizerError::ServiceError(format!("{} - {}", status, body)))
}

fn first_text(response: MessagesResponse) -> Result<String> {
    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| SanitizerError::ServiceError("No text content in response".to_string()))
}

#[async_trait]
impl TextTransformer for AnthropicTransformer {
    async fn transform(&self, request: TransformRequest) -> Result<TransformOutcome> {
        let prompt = build_prompt(&request.text, request.position, request.total);
        debug!("Prompt for chunk {}:\n{}", request.position, prompt);

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let outcome = classify_failure(status, &body);
            if matches!(outcome, Ok(TransformOutcome::Rejected)) {
                warn!(
                    "Content filter triggered for chunk {}. Returning original chunk.",
                    request.position
                );
            }
            return outcome;
        }

        let parsed: MessagesResponse = response.json().await?;
        let cleaned = first_text(parsed)?;

        let preview: String = cleaned.chars().take(500).collect();
        debug!("Raw API response for chunk {}:\n{}...", request.position, preview);
        info!("Successfully cleaned chunk {}", request.position);

        Ok(TransformOutcome::Cleaned(cleaned))
    }
}
