//! LLM provider adapter (spec.md §6's `LLMClient.generate` contract).
//! A thin `reqwest`-based client; `prompt_core::opro::LlmClient` is
//! synchronous because OPRO's algorithm is otherwise pure CPU-bound
//! logic, so this bridges into the Tokio runtime with `block_in_place`
//! the way the teacher's `HttpClient` wraps `reqwest` for synchronous
//! call sites. Grounded in the teacher's `HttpClient`/`GitHubClient`.

use std::time::Duration;

use prompt_types::{ids, DomainError, Result};
use serde_json::json;

use prompt_core::opro::LlmClient;

pub struct HttpLlmClient {
    client: reqwest::Client,
    api_base: String,
    provider: String,
    model: String,
}

impl HttpLlmClient {
    pub fn new(api_base: impl Into<String>, provider: impl Into<String>, model: impl Into<String>, timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            api_base: api_base.into(),
            provider: provider.into(),
            model: model.into(),
        }
    }

    async fn generate_async(&self, meta_prompt: &str) -> Result<String> {
        let url = format!("{}/v1/completions", self.api_base.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "prompt": meta_prompt,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, &self.provider, &self.model, meta_prompt.len()))?;

        let response = response.error_for_status().map_err(|e| {
            map_reqwest_error(e, &self.provider, &self.model, meta_prompt.len())
        })?;

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            map_reqwest_error(e, &self.provider, &self.model, meta_prompt.len())
        })?;

        payload
            .get("text")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                DomainError::llm_provider(
                    "LLM response missing \"text\" field",
                    ids::LLM_UNKNOWN_ERROR,
                    Some(self.provider.clone()),
                    Some(self.model.clone()),
                    None,
                )
            })
    }
}

fn map_reqwest_error(
    error: reqwest::Error,
    provider: &str,
    model: &str,
    prompt_length: usize,
) -> DomainError {
    let error_id = if error.is_timeout() {
        ids::LLM_TIMEOUT
    } else if error.is_connect() {
        ids::LLM_CONNECTION_FAILED
    } else {
        ids::LLM_UNKNOWN_ERROR
    };

    tracing::error!(error_id, provider, model, prompt_length, %error, "LLM call failed");

    DomainError::llm_provider(
        format!("LLM call failed: {error}"),
        error_id,
        Some(provider.to_string()),
        Some(model.to_string()),
        Some(error.to_string()),
    )
    .with_context("prompt_length", prompt_length.to_string())
}

impl LlmClient for HttpLlmClient {
    fn generate(&self, meta_prompt: &str) -> Result<String> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(self.generate_async(meta_prompt))
        })
    }

    fn backend(&self) -> &str {
        "http"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_client_carries_the_configured_model() {
        let client = HttpLlmClient::new("http://localhost:9", "openai", "gpt-test", 5);
        assert_eq!(client.model(), "gpt-test");
        assert_eq!(client.backend(), "http");
    }
}
