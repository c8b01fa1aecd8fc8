//! # contract: seams between the traversal pipeline and its external collaborators
//!
//! Two traits are defined here:
//! - [`TextTransformer`]: given a piece of text, return the reorganised text or fail.
//!   Backed in production by a remote generative text service (see [`crate::transform`]).
//! - [`DocumentConverter`]: given a markdown file, write a rich document next to it or fail.
//!   Backed in production by pandoc (see [`crate::convert`]).
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, so tests can drive the traversal with
//!   `MockTextTransformer` / `MockDocumentConverter` and count calls.
//! - Mocks are exported when the `test-export-mocks` feature is on (default), so the
//!   integration tests under `tests/` can use them too.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use mockall::automock;

/// Which generative text service a transformer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// OpenAI chat completions (model family "gpt").
    #[value(name = "openai", alias = "gpt")]
    #[serde(alias = "gpt")]
    OpenAi,
    /// Google Gemini generateContent.
    Gemini,
}

impl Backend {
    pub fn default_model(&self) -> &'static str {
        match self {
            Backend::OpenAi => "gpt-4o-mini",
            Backend::Gemini => "gemini-1.5-flash",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::OpenAi => "openai",
            Backend::Gemini => "gemini",
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Gemini
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The text service could not produce usable output for one input.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("request to {backend} failed: {source}")]
    Request {
        backend: Backend,
        #[source]
        source: reqwest::Error,
    },
    #[error("{backend} returned status {status}: {body}")]
    Status {
        backend: Backend,
        status: u16,
        body: String,
    },
    #[error("{backend} response could not be decoded: {message}")]
    Decode { backend: Backend, message: String },
    #[error("{backend} returned no content")]
    EmptyResponse { backend: Backend },
}

/// The document converter could not produce the requested document.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("failed to launch converter '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("converter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Rewrites one text. Implemented by the remote-service client and by mocks in testing.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TextTransformer: Send + Sync {
    /// Returns the transformed text, or an error when no usable content came back.
    async fn transform(&self, text: &str) -> Result<String, TransformError>;
}

/// Converts a markdown file into a document file.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait DocumentConverter: Send + Sync {
    fn convert(&self, markdown: &Path, document: &Path) -> Result<(), ConvertError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_cli_names_and_aliases() {
        use clap::ValueEnum;
        assert_eq!(Backend::from_str("openai", true).unwrap(), Backend::OpenAi);
        assert_eq!(Backend::from_str("GPT", true).unwrap(), Backend::OpenAi);
        assert_eq!(Backend::from_str("gemini", false).unwrap(), Backend::Gemini);
        assert!(Backend::from_str("claude", true).is_err());
    }

    #[test]
    fn backend_default_models() {
        assert_eq!(Backend::OpenAi.default_model(), "gpt-4o-mini");
        assert_eq!(Backend::Gemini.default_model(), "gemini-1.5-flash");
        assert_eq!(Backend::default(), Backend::Gemini);
    }

    #[test]
    fn backend_deserialises_lowercase() {
        let b: Backend = serde_yaml::from_str("openai").unwrap();
        assert_eq!(b, Backend::OpenAi);
        let b: Backend = serde_yaml::from_str("gpt").unwrap();
        assert_eq!(b, Backend::OpenAi);
    }
}
