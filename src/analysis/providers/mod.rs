//! Backend call shapes for analysis requests.
//!
//! Two providers can actually service an analysis call: OpenAI (bearer auth,
//! fixed endpoint) and Azure OpenAI (endpoint + deployment + api-version
//! addressing). Everything else fails immediately without network IO.

mod azure;
mod openai;

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::AnalysisConfig;
use crate::routing::ProviderId;

pub use openai::transcribe;

/// Terminal result of an analysis call. Failures are ordinary values; nothing
/// here is retried.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn success(text: String, raw: Option<Value>) -> Self {
        Self {
            ok: true,
            text: Some(text),
            raw,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            text: None,
            raw: None,
            error: Some(error.into()),
        }
    }
}

/// One part of the structured user-turn input.
#[derive(Debug, Clone)]
pub enum ContentPart {
    /// Plain text (prompts, document snippets).
    Text(String),
    /// Inline image, as a URL or a base64 data URL.
    ImageUrl(String),
    /// Provider-side file handle.
    FileId(String),
}

impl ContentPart {
    fn to_value(&self) -> Value {
        match self {
            Self::Text(text) => json!({ "type": "input_text", "text": text }),
            Self::ImageUrl(url) => json!({ "type": "input_image", "image_url": url }),
            Self::FileId(id) => json!({ "type": "input_file", "file_id": id }),
        }
    }
}

/// Build the single-turn request body shared by both call shapes. Streaming is
/// explicitly off; the instruction override is attached only when non-empty.
fn build_request_body(model: &str, parts: &[ContentPart], instructions: &str) -> Value {
    let content: Vec<Value> = parts.iter().map(ContentPart::to_value).collect();
    let mut body = json!({
        "model": model,
        "input": [{ "role": "user", "content": content }],
        "stream": false,
    });
    if !instructions.is_empty() {
        body["instructions"] = Value::String(instructions.to_string());
    }
    body
}

/// Concatenate all `output_text` fragments across all `message` output items,
/// in order, trimmed.
fn extract_output_text(payload: &Value) -> String {
    let mut parts = String::new();
    if let Some(output) = payload.get("output").and_then(Value::as_array) {
        for item in output {
            if item.get("type").and_then(Value::as_str) != Some("message") {
                continue;
            }
            if let Some(content) = item.get("content").and_then(Value::as_array) {
                for chunk in content {
                    if chunk.get("type").and_then(Value::as_str) == Some("output_text") {
                        if let Some(text) = chunk.get("text").and_then(Value::as_str) {
                            parts.push_str(text);
                        }
                    }
                }
            }
        }
    }
    parts.trim().to_string()
}

/// Dispatch the structured input to the active provider's call shape.
pub async fn dispatch(parts: &[ContentPart], config: &AnalysisConfig) -> AnalysisResult {
    match config.provider {
        ProviderId::OpenAi => openai::respond(parts, config).await,
        ProviderId::Azure => azure::respond(parts, config).await,
        other => AnalysisResult::failure(format!(
            "Provider '{}' does not support analysis yet.",
            other.id()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_output_text_joins_message_fragments() {
        let payload = json!({
            "output": [
                { "type": "reasoning", "content": [{ "type": "output_text", "text": "skip" }] },
                { "type": "message", "content": [
                    { "type": "output_text", "text": "  Hello" },
                    { "type": "refusal", "refusal": "no" },
                    { "type": "output_text", "text": " world" }
                ]},
                { "type": "message", "content": [{ "type": "output_text", "text": "!  " }] }
            ]
        });
        assert_eq!(extract_output_text(&payload), "Hello world!");
    }

    #[test]
    fn test_extract_output_text_empty_payload() {
        assert_eq!(extract_output_text(&json!({})), "");
        assert_eq!(extract_output_text(&json!({ "output": [] })), "");
    }

    #[test]
    fn test_build_request_body_shape() {
        let parts = vec![
            ContentPart::Text("describe".to_string()),
            ContentPart::FileId("file-123".to_string()),
        ];
        let body = build_request_body("gpt-4o-mini", &parts, "");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["stream"], false);
        assert!(body.get("instructions").is_none());
        let content = &body["input"][0]["content"];
        assert_eq!(content[0]["type"], "input_text");
        assert_eq!(content[1]["file_id"], "file-123");

        let body = build_request_body("gpt-4o-mini", &parts, "be brief");
        assert_eq!(body["instructions"], "be brief");
    }

    #[tokio::test]
    async fn test_unsupported_provider_fails_without_io() {
        let mut config = AnalysisConfig::default();
        config.provider = ProviderId::Local;
        config.local.endpoint = "http://localhost:8080".to_string();
        let result = dispatch(&[ContentPart::Text("hi".to_string())], &config).await;
        assert!(!result.ok);
        assert_eq!(
            result.error.as_deref(),
            Some("Provider 'local' does not support analysis yet.")
        );
    }
}
