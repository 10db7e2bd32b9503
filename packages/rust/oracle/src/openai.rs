//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use docreview_shared::{DocReviewError, OracleConfig, Result, resolve_api_key};

use crate::{ChatMessage, Oracle};

/// Maximum length of an API error body quoted in error messages.
const MAX_ERROR_BODY_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    /// Content can be null in some API responses (e.g., refusal or moderation).
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`Oracle`] backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiOracle {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
    api_key: String,
}

impl OpenAiOracle {
    /// Build a client from the `[oracle]` config section.
    ///
    /// The API key is resolved from the configured env var; it is never
    /// stored in the config file itself.
    pub fn from_config(config: &docreview_shared::AppConfig) -> Result<Self> {
        let api_key = resolve_api_key(config)?;
        Self::new(&config.oracle, api_key)
    }

    /// Build a client with an explicit API key.
    pub fn new(config: &OracleConfig, api_key: String) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            DocReviewError::config(format!("invalid oracle base_url {}: {e}", config.base_url))
        })?;
        let endpoint = join_endpoint(&base)?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("docreview/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocReviewError::Oracle(format!("client build: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key,
        })
    }
}

/// Append `chat/completions` to the base URL, tolerating a missing trailing slash.
fn join_endpoint(base: &Url) -> Result<Url> {
    let mut s = base.as_str().to_string();
    if !s.ends_with('/') {
        s.push('/');
    }
    Url::parse(&s)
        .and_then(|u| u.join("chat/completions"))
        .map_err(|e| DocReviewError::config(format!("invalid oracle base_url: {e}")))
}

/// Truncate a response body for quoting in error messages.
fn truncate_body(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    #[instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocReviewError::Oracle(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocReviewError::Oracle(format!(
                "HTTP {status}: {}",
                truncate_body(&body)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DocReviewError::Oracle(format!("invalid response body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DocReviewError::Oracle("response contained no content".into()))?;

        debug!(bytes = content.len(), "oracle response received");
        Ok(content)
    }
}
