//! OpenAI call shapes: Responses API for text/vision, multipart upload for
//! audio transcription.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;

use super::{build_request_body, extract_output_text, AnalysisResult, ContentPart};

const RESPONSES_ENDPOINT: &str = "https://api.openai.com/v1/responses";
const TRANSCRIPTIONS_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Text/vision calls finish quickly; transcription of long audio does not.
const RESPOND_TIMEOUT: Duration = Duration::from_secs(60);
const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(300);

/// Send a single-turn analysis request to the Responses API.
pub(super) async fn respond(parts: &[ContentPart], config: &AnalysisConfig) -> AnalysisResult {
    if config.openai.api_key.is_empty() {
        return AnalysisResult::failure("OpenAI API key is missing.");
    }

    let model = config.openai.analysis_model();
    let body = build_request_body(model, parts, &config.instructions);
    debug!(model, parts = parts.len(), "openai analysis request");

    let client = Client::builder()
        .timeout(RESPOND_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client");

    let response = match client
        .post(RESPONSES_ENDPOINT)
        .bearer_auth(&config.openai.api_key)
        .json(&body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => return AnalysisResult::failure(err.to_string()),
    };

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        warn!(%status, "openai analysis request failed");
        return AnalysisResult::failure(text);
    }

    let payload: Value = match response.json().await {
        Ok(payload) => payload,
        Err(err) => return AnalysisResult::failure(err.to_string()),
    };

    AnalysisResult::success(extract_output_text(&payload), Some(payload))
}

/// Transcribe an audio file and return the transcript text verbatim.
pub async fn transcribe(path: &Path, config: &AnalysisConfig) -> AnalysisResult {
    if config.openai.api_key.is_empty() {
        return AnalysisResult::failure("OpenAI API key is missing.");
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return AnalysisResult::failure(format!("Audio file is not readable: {}", err))
        }
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio".to_string());

    let form = reqwest::multipart::Form::new()
        .part(
            "file",
            reqwest::multipart::Part::bytes(bytes).file_name(file_name),
        )
        .text("model", config.openai.transcribe_model.clone());

    debug!(model = %config.openai.transcribe_model, "openai transcription request");

    let client = Client::builder()
        .timeout(TRANSCRIBE_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client");

    let response = match client
        .post(TRANSCRIPTIONS_ENDPOINT)
        .bearer_auth(&config.openai.api_key)
        .multipart(form)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => return AnalysisResult::failure(err.to_string()),
    };

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        warn!(%status, "openai transcription request failed");
        return AnalysisResult::failure(text);
    }

    let payload: Value = match response.json().await {
        Ok(payload) => payload,
        Err(err) => return AnalysisResult::failure(err.to_string()),
    };

    let transcript = payload
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    AnalysisResult::success(transcript, Some(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_fails_without_io() {
        let config = AnalysisConfig::default();
        let result = respond(&[ContentPart::Text("hi".to_string())], &config).await;
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("OpenAI API key is missing."));

        let result = transcribe(Path::new("/tmp/none.mp3"), &config).await;
        assert_eq!(result.error.as_deref(), Some("OpenAI API key is missing."));
    }
}
