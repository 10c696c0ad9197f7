//! Azure OpenAI call shape: the same Responses request addressed by
//! endpoint + deployment + api-version, authenticated with an `api-key`
//! header.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;

use super::{build_request_body, extract_output_text, AnalysisResult, ContentPart};

const RESPOND_TIMEOUT: Duration = Duration::from_secs(60);

fn build_url(endpoint: &str, api_version: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    if api_version.is_empty() {
        format!("{}/openai/v1/responses", base)
    } else {
        format!("{}/openai/v1/responses?api-version={}", base, api_version)
    }
}

/// Send a single-turn analysis request to an Azure OpenAI deployment.
pub(super) async fn respond(parts: &[ContentPart], config: &AnalysisConfig) -> AnalysisResult {
    let azure = &config.azure;
    if azure.api_key.is_empty() || azure.endpoint.is_empty() || azure.deployment.is_empty() {
        return AnalysisResult::failure("Azure OpenAI config is missing.");
    }

    // The deployment name takes the model slot in the request body.
    let body = build_request_body(&azure.deployment, parts, &config.instructions);
    let url = build_url(&azure.endpoint, &azure.api_version);
    debug!(deployment = %azure.deployment, parts = parts.len(), "azure analysis request");

    let client = Client::builder()
        .timeout(RESPOND_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client");

    let response = match client
        .post(&url)
        .header("api-key", &azure.api_key)
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
        warn!(%status, "azure analysis request failed");
        return AnalysisResult::failure(text);
    }

    let payload: Value = match response.json().await {
        Ok(payload) => payload,
        Err(err) => return AnalysisResult::failure(err.to_string()),
    };

    AnalysisResult::success(extract_output_text(&payload), Some(payload))
}
