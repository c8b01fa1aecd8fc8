// Google Gemini generateContent backend.
//
// The model name goes in the URL path and the API key in the `key` query parameter.

use serde::{Deserialize, Serialize};

use super::{non_empty, send_json, LlmTransformer};
use crate::contract::{Backend, TransformError};

pub(super) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

fn request_body(prompt: &str, max_tokens: u32, temperature: f32) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: max_tokens,
            temperature,
        },
    }
}

/// Text parts of the first candidate, concatenated.
fn extract_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    Some(text)
}

pub(super) async fn complete(t: &LlmTransformer, prompt: &str) -> Result<String, TransformError> {
    let url = format!("{}/v1beta/models/{}:generateContent", t.base_url, t.model);
    let body = request_body(prompt, t.max_tokens, t.temperature);
    let request = t
        .client
        .post(&url)
        .query(&[("key", t.api_key.as_str())])
        .json(&body);
    let response: GenerateResponse = send_json(Backend::Gemini, request).await?;
    non_empty(Backend::Gemini, extract_text(response))
}
