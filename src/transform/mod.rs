//! # transform: the remote generative text service behind [`TextTransformer`]
//!
//! [`LlmTransformer`] prefixes every input with a fixed instruction prompt and sends it
//! to one of two backends, chosen explicitly by [`Backend`]:
//! - [`Backend::OpenAi`]: `POST /v1/chat/completions`
//! - [`Backend::Gemini`]: `POST /v1beta/models/{model}:generateContent`
//!
//! Both are interchangeable from the traversal's point of view. The API key is handed to
//! [`LlmTransformer::new`] by the caller; this module never reads the environment.
//!
//! Failures (transport, non-success status, undecodable or empty response) surface as
//! [`TransformError`] and are never retried.

mod gemini;
mod openai;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::contract::{Backend, TextTransformer, TransformError};

/// Instruction prefix used when no prompt file is configured.
pub const DEFAULT_PROMPT: &str = include_str!("../../prompts/reorganize.txt");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub backend: Backend,
    /// Model name; the backend's default when unset.
    pub model: Option<String>,
    /// File holding the instruction prefix; the bundled prompt when unset.
    pub prompt_path: Option<PathBuf>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Service root, e.g. `https://api.openai.com`; the backend's public endpoint when unset.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            model: None,
            prompt_path: None,
            max_tokens: 500,
            temperature: 0.5,
            base_url: None,
            timeout_secs: 120,
        }
    }
}

impl TransformConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to read prompt file {path}: {source}")]
    Prompt {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Reads the instruction prefix from `path`, or returns the bundled one.
pub fn load_prompt(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(p) => Ok(fs::read_to_string(p)?.trim().to_string()),
        None => Ok(DEFAULT_PROMPT.trim().to_string()),
    }
}

/// The text actually sent to the service: prefix, blank line, input.
pub fn build_prompt(prefix: &str, text: &str) -> String {
    format!("{}\n\n{}", prefix.trim(), text)
}

pub struct LlmTransformer {
    backend: Backend,
    client: Client,
    api_key: String,
    model: String,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    base_url: String,
}

impl LlmTransformer {
    pub fn new(config: &TransformConfig, api_key: impl Into<String>) -> Result<Self, SetupError> {
        let prompt = load_prompt(config.prompt_path.as_deref()).map_err(|source| {
            SetupError::Prompt {
                path: config.prompt_path.clone().unwrap_or_default(),
                source,
            }
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| match config.backend {
                Backend::OpenAi => openai::DEFAULT_BASE_URL.to_string(),
                Backend::Gemini => gemini::DEFAULT_BASE_URL.to_string(),
            })
            .trim_end_matches('/')
            .to_string();

        info!(
            backend = %config.backend,
            model = config.model(),
            base_url = %base_url,
            prompt_chars = prompt.len(),
            "Initialised text transformer"
        );
        Ok(Self {
            backend: config.backend,
            client,
            api_key: api_key.into(),
            model: config.model().to_string(),
            prompt,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            base_url,
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextTransformer for LlmTransformer {
    async fn transform(&self, text: &str) -> Result<String, TransformError> {
        let prompt = build_prompt(&self.prompt, text);
        debug!(backend = %self.backend, model = %self.model, chars = prompt.len(), "Sending text");
        let result = match self.backend {
            Backend::OpenAi => openai::complete(self, &prompt).await,
            Backend::Gemini => gemini::complete(self, &prompt).await,
        };
        match &result {
            Ok(out) => debug!(backend = %self.backend, chars = out.len(), "Received text"),
            Err(e) => error!(backend = %self.backend, error = %e, "Text transformation failed"),
        }
        result
    }
}

/// Sends `request` and decodes a JSON body, mapping every failure to [`TransformError`].
async fn send_json<R: DeserializeOwned>(
    backend: Backend,
    request: RequestBuilder,
) -> Result<R, TransformError> {
    let response = request
        .send()
        .await
        .map_err(|source| TransformError::Request { backend, source })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransformError::Status {
            backend,
            status: status.as_u16(),
            body,
        });
    }

    response.json::<R>().await.map_err(|e| TransformError::Decode {
        backend,
        message: e.to_string(),
    })
}

/// Empty or whitespace-only replies count as no content.
fn non_empty(backend: Backend, text: Option<String>) -> Result<String, TransformError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(TransformError::EmptyResponse { backend }),
    }
}
