//! Analysis configuration: provider credentials, endpoints, and the active
//! provider selector.
//!
//! Loaded from an optional TOML file, then overridden by environment
//! variables. A provider counts as available only when its credential set is
//! complete.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::routing::{ProviderFlags, ProviderId};

/// OpenAI credentials and model selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key; empty means the provider is not configured.
    #[serde(default)]
    pub api_key: String,
    /// Default chat/vision model.
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// Optional model override used for analysis calls.
    #[serde(default)]
    pub analysis_model: String,
    /// Model used for audio transcription.
    #[serde(default = "default_transcribe_model")]
    pub transcribe_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_openai_model(),
            analysis_model: String::new(),
            transcribe_model: default_transcribe_model(),
        }
    }
}

impl OpenAiConfig {
    /// Model to use for analysis calls: the analysis override when set,
    /// otherwise the default model.
    pub fn analysis_model(&self) -> &str {
        if self.analysis_model.is_empty() {
            &self.model
        } else {
            &self.analysis_model
        }
    }
}

/// Azure OpenAI addressing: endpoint + deployment + API version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AzureConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub deployment: String,
    #[serde(default)]
    pub api_version: String,
}

/// Local model server (bare endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LocalConfig {
    #[serde(default)]
    pub endpoint: String,
}

/// Custom provider endpoint with an optional auth header pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CustomConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub auth_header: String,
    #[serde(default)]
    pub auth_value: String,
}

/// Per-request analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Active provider for analysis calls.
    #[serde(default = "default_provider")]
    pub provider: ProviderId,
    /// Instruction text overriding the default system prompt; empty means
    /// none. Declared before the provider tables so TOML serialization stays
    /// valid.
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub custom: CustomConfig,
}

fn default_provider() -> ProviderId {
    ProviderId::OpenAi
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_transcribe_model() -> String {
    "gpt-4o-mini-transcribe".to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            instructions: String::new(),
            openai: OpenAiConfig::default(),
            azure: AzureConfig::default(),
            local: LocalConfig::default(),
            custom: CustomConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration: TOML file if given (or `heph.toml` in the current
    /// directory when present), then environment overrides on top.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw)?
            }
            None => {
                let default_path = Path::new("heph.toml");
                if default_path.exists() {
                    let raw = std::fs::read_to_string(default_path)?;
                    toml::from_str(&raw)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(config.with_env_overrides())
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `HEPH_PROVIDER`: "openai", "azure", "local", or "custom"
    /// - `OPENAI_API_KEY`, `HEPH_OPENAI_MODEL`, `HEPH_OPENAI_ANALYSIS_MODEL`,
    ///   `HEPH_OPENAI_TRANSCRIBE_MODEL`
    /// - `AZURE_OPENAI_API_KEY`, `AZURE_OPENAI_ENDPOINT`,
    ///   `AZURE_OPENAI_DEPLOYMENT`, `AZURE_OPENAI_API_VERSION`
    /// - `HEPH_LOCAL_ENDPOINT`
    /// - `HEPH_CUSTOM_ENDPOINT`, `HEPH_CUSTOM_AUTH_HEADER`,
    ///   `HEPH_CUSTOM_AUTH_VALUE`
    /// - `HEPH_INSTRUCTIONS`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("HEPH_PROVIDER") {
            if let Some(provider) = ProviderId::from_id(&val) {
                self.provider = provider;
            }
        }
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.openai.api_key = val;
        }
        if let Ok(val) = std::env::var("HEPH_OPENAI_MODEL") {
            self.openai.model = val;
        }
        if let Ok(val) = std::env::var("HEPH_OPENAI_ANALYSIS_MODEL") {
            self.openai.analysis_model = val;
        }
        if let Ok(val) = std::env::var("HEPH_OPENAI_TRANSCRIBE_MODEL") {
            self.openai.transcribe_model = val;
        }
        if let Ok(val) = std::env::var("AZURE_OPENAI_API_KEY") {
            self.azure.api_key = val;
        }
        if let Ok(val) = std::env::var("AZURE_OPENAI_ENDPOINT") {
            self.azure.endpoint = val;
        }
        if let Ok(val) = std::env::var("AZURE_OPENAI_DEPLOYMENT") {
            self.azure.deployment = val;
        }
        if let Ok(val) = std::env::var("AZURE_OPENAI_API_VERSION") {
            self.azure.api_version = val;
        }
        if let Ok(val) = std::env::var("HEPH_LOCAL_ENDPOINT") {
            self.local.endpoint = val;
        }
        if let Ok(val) = std::env::var("HEPH_CUSTOM_ENDPOINT") {
            self.custom.endpoint = val;
        }
        if let Ok(val) = std::env::var("HEPH_CUSTOM_AUTH_HEADER") {
            self.custom.auth_header = val;
        }
        if let Ok(val) = std::env::var("HEPH_CUSTOM_AUTH_VALUE") {
            self.custom.auth_value = val;
        }
        if let Ok(val) = std::env::var("HEPH_INSTRUCTIONS") {
            self.instructions = val;
        }
        self
    }

    /// Derive provider availability from credential completeness.
    pub fn provider_flags(&self) -> ProviderFlags {
        ProviderFlags {
            openai: !self.openai.api_key.is_empty(),
            azure: !self.azure.api_key.is_empty()
                && !self.azure.endpoint.is_empty()
                && !self.azure.deployment.is_empty(),
            local: !self.local.endpoint.is_empty(),
            custom: !self.custom.endpoint.is_empty(),
        }
    }
}
