use crate::domain::ports::{CompletionRequest, CompletionService, CredentialSource};
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiClient<C: CredentialSource> {
    client: Client,
    endpoint: String,
    timeout: Duration,
    credentials: C,
}

impl<C: CredentialSource> OpenAiClient<C> {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, credentials: C) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
            credentials,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl<C: CredentialSource> CompletionService for OpenAiClient<C> {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<String, ServiceError> {
        let api_key = self
            .credentials
            .api_key()
            .ok_or(ServiceError::MissingCredential)?;

        let body = serde_json::json!({
            "model": request.model,
            "messages": [
                {"role": "user", "content": request.prompt},
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let url = self.completions_url();
        tracing::debug!("🌐 Sending completion request to: {} (model {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        tracing::debug!("🌐 Completion response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_transport_error(e)
            } else {
                ServiceError::MalformedResponse(format!("body is not JSON: {}", e))
            }
        })?;

        let content = json
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .ok_or_else(|| {
                ServiceError::MalformedResponse("missing choices[0].message.content".to_string())
            })?;

        if content.is_empty() {
            return Err(ServiceError::MalformedResponse("empty completion".to_string()));
        }

        Ok(content.to_string())
    }
}
