//! Typed client for the RAG backend's document endpoints.
//!
//! Settings load/save live in [`super::settings_api`]; everything here is a
//! thin JSON forwarder with no retries.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::BackendConfig;
use crate::models::{
    AddDocumentsRequest, CrawlRequest, PromptResponse, SearchResponse, StatusResponse,
};
use crate::settings::LlmProvider;

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build backend HTTP client")?;
        Ok(Self { http, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    /// POST /add - ingest raw document texts
    pub async fn add_documents(&self, contents: &[String]) -> Result<StatusResponse> {
        let req = AddDocumentsRequest {
            contents: contents.to_vec(),
        };
        self.post_json("/add", &req).await
    }

    /// POST /search - semantic search with the backend's current metric
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResponse> {
        let req = BackendSearchRequest { query, limit };
        self.post_json("/search", &req).await
    }

    /// POST /prompt - retrieval-augmented answer
    pub async fn prompt(
        &self,
        prompt: &str,
        provider: LlmProvider,
        model: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<PromptResponse> {
        let req = BackendPromptRequest {
            prompt,
            provider,
            model,
            api_key,
        };
        self.post_json("/prompt", &req).await
    }

    /// POST /crawl - crawl a page and ingest its sections
    pub async fn crawl(&self, link: &str) -> Result<StatusResponse> {
        let req = CrawlRequest {
            link: link.to_string(),
        };
        self.post_json("/crawl", &req).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.endpoint(path);

        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to call backend {path}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Backend {path} returned {status}: {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse backend {path} response"))
    }
}

#[derive(Serialize)]
struct BackendSearchRequest<'a> {
    query: &'a str,
    limit: usize,
}

#[derive(Serialize)]
struct BackendPromptRequest<'a> {
    prompt: &'a str,
    provider: LlmProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    /// Always present on the wire, `null` when there is no key to send.
    #[serde(rename = "apiKey")]
    api_key: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_prompt_request_wire_shape() {
        let req = BackendPromptRequest {
            prompt: "what is rust?",
            provider: LlmProvider::OpenAi,
            model: None,
            api_key: Some("sk-1"),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"prompt": "what is rust?", "provider": "openai", "apiKey": "sk-1"})
        );
    }

    #[test]
    fn test_prompt_request_sends_null_key() {
        let req = BackendPromptRequest {
            prompt: "hi",
            provider: LlmProvider::Ollama,
            model: Some("llama3.2"),
            api_key: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["apiKey"], serde_json::Value::Null);
        assert_eq!(value["model"], "llama3.2");
    }

    #[test]
    fn test_endpoint_uses_configured_base() {
        let client = BackendClient::new(BackendConfig {
            base_url: "http://backend:7998".to_string(),
            ..BackendConfig::default()
        })
        .unwrap();
        assert_eq!(client.endpoint("/crawl"), "http://backend:7998/crawl");
        assert_eq!(client.base_url(), "http://backend:7998");
    }
}
