// OpenAI chat completions backend.

use serde::{Deserialize, Serialize};

use super::{non_empty, send_json, LlmTransformer};
use crate::contract::{Backend, TransformError};

pub(super) const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn request_body<'a>(model: &'a str, prompt: &'a str, max_tokens: u32, temperature: f32) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens,
        temperature,
    }
}

fn extract_text(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
}

pub(super) async fn complete(t: &LlmTransformer, prompt: &str) -> Result<String, TransformError> {
    let url = format!("{}/v1/chat/completions", t.base_url);
    let body = request_body(&t.model, prompt, t.max_tokens, t.temperature);
    let request = t.client.post(&url).bearer_auth(&t.api_key).json(&body);
    let response: ChatResponse = send_json(Backend::OpenAi, request).await?;
    non_empty(Backend::OpenAi, extract_text(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_has_single_user_message() {
        let body = request_body("gpt-4o-mini", "prompt text", 500, 0.5);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "prompt text");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn extracts_first_choice_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"tidy"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).as_deref(), Some("tidy"));
    }

    #[test]
    fn no_choices_means_no_text() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(extract_text(response).is_none());
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(extract_text(response).is_none());
    }
}
