// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::LlmClient;
use crate::config::Config;
use crate::domain::{AiAnalysisContext, DeletionAnalysisResult};
use crate::error::{Error, Result};
use crate::services::sanitizer::ResponseSanitizer;

const BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "anthropic";
const BASE_BACKOFF_MS: u64 = 500;

pub struct AnthropicClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    delta: Option<ContentDelta>,
    error: Option<StreamError>,
}

#[derive(Deserialize)]
struct ContentDelta {
    text: Option<String>,
}

#[derive(Deserialize)]
struct StreamError {
    message: String,
}

fn provider_error(message: impl Into<String>) -> Error {
    Error::Provider {
        provider: PROVIDER.into(),
        message: message.into(),
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

impl AnthropicClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                provider_error(
                    "API key not configured; set DANGLE_API_KEY, ANTHROPIC_API_KEY or run `dangle set-key`",
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config
                .anthropic_base_url
                .as_deref()
                .unwrap_or(BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
            api_key: SecretString::from(api_key),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
        })
    }

    /// Send one system + user exchange and return the streamed text.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        cancel: CancellationToken,
    ) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let request = MessagesRequest {
            model: &self.model,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: true,
        };

        let response = self.send_with_retry(&request, &cancel).await?;
        self.read_stream(response, &cancel).await
    }

    async fn send_with_retry(
        &self,
        request: &MessagesRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        let url = format!("{}/messages", self.base_url);
        let mut attempt = 0;

        loop {
            let sent = tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                sent = self
                    .client
                    .post(&url)
                    .header("x-api-key", self.api_key.expose_secret())
                    .header("anthropic-version", API_VERSION)
                    .header("content-type", "application/json")
                    .json(request)
                    .send() => sent,
            };

            let retry_reason = match sent {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if is_retryable(response.status()) && attempt < self.max_retries => {
                    format!("HTTP {}", response.status())
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(provider_error(format!("HTTP {status}: {body}")));
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < self.max_retries => {
                    e.to_string()
                }
                Err(e) if e.is_timeout() => return Err(provider_error("request timed out")),
                Err(e) => return Err(provider_error(e.to_string())),
            };

            let delay = Duration::from_millis(BASE_BACKOFF_MS << attempt.min(6));
            attempt += 1;
            warn!(
                attempt,
                reason = %retry_reason,
                delay_ms = delay.as_millis() as u64,
                "retrying anthropic request"
            );

            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn read_stream(&self, response: Response, cancel: &CancellationToken) -> Result<String> {
        let mut stream = std::pin::pin!(response.bytes_stream());
        let mut full_response = String::new();
        let mut line_buffer = String::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(Error::Cancelled);
                }
                chunk = stream.next() => {
                    let Some(chunk) = chunk else { break };
                    let chunk = chunk.map_err(|e| provider_error(e.to_string()))?;

                    line_buffer.push_str(&String::from_utf8_lossy(&chunk));

                    while let Some(newline_pos) = line_buffer.find('\n') {
                        let line = line_buffer[..newline_pos].trim().to_string();
                        line_buffer.drain(..=newline_pos);

                        // SSE format: "event: <type>" followed by "data: <json>"
                        let Some(data) = line.strip_prefix("data:") else {
                            continue;
                        };

                        let Ok(event) = serde_json::from_str::<StreamEvent>(data.trim()) else {
                            continue;
                        };

                        match event.event_type.as_str() {
                            "content_block_delta" => {
                                if let Some(text) = event.delta.and_then(|d| d.text) {
                                    full_response.push_str(&text);
                                }
                            }
                            "message_stop" => {
                                return Ok(full_response.trim().to_string());
                            }
                            "error" => {
                                let message = event
                                    .error
                                    .map(|e| e.message)
                                    .unwrap_or_else(|| "stream error".into());
                                return Err(provider_error(message));
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        Ok(full_response.trim().to_string())
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn analyze_deletions(
        &self,
        context: &AiAnalysisContext,
        cancel: CancellationToken,
    ) -> Result<DeletionAnalysisResult> {
        let user = context.user_message();
        debug!(
            model = %self.model,
            prompt_chars = context.system_prompt.len() + user.len(),
            "requesting deletion analysis"
        );

        let raw = self.complete(&context.system_prompt, &user, cancel).await?;
        if raw.is_empty() {
            return Err(provider_error("empty response"));
        }

        debug!(raw_len = raw.len(), "sanitizing analysis response");
        ResponseSanitizer::sanitize(&raw)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
