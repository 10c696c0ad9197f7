//! Provider selection policy.
//!
//! Turns provider availability, an optional requested provider, the configured
//! default, and the intent's static preference ordering into exactly one chosen
//! provider plus a deterministic fallback ordering.

use serde::{Deserialize, Serialize};

use super::intent::IntentCategory;

/// A configured backend provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Azure,
    Local,
    Custom,
}

impl ProviderId {
    /// Get the provider ID as a string.
    pub fn id(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Azure => "azure",
            Self::Local => "local",
            Self::Custom => "custom",
        }
    }

    /// Parse a provider from its string ID.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "azure" => Some(Self::Azure),
            "local" => Some(Self::Local),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// One availability flag per provider. The derived ordering (openai, azure,
/// local, custom) is fixed and significant for deterministic tie-breaks.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProviderFlags {
    pub openai: bool,
    pub azure: bool,
    pub local: bool,
    pub custom: bool,
}

impl ProviderFlags {
    /// Resolve the flags into the ordered list of usable providers.
    pub fn available(&self) -> Vec<ProviderId> {
        let mut available = Vec::new();
        if self.openai {
            available.push(ProviderId::OpenAi);
        }
        if self.azure {
            available.push(ProviderId::Azure);
        }
        if self.local {
            available.push(ProviderId::Local);
        }
        if self.custom {
            available.push(ProviderId::Custom);
        }
        available
    }
}

/// Why the policy resolver picked the provider it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyReason {
    RequestedProviderAvailable,
    RequestedProviderUnavailableUseConfigured,
    ConfiguredProviderAvailable,
    IntentPolicySelected,
    NoProviderAvailable,
}

/// Resolved provider choice with its fallback ordering.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderPolicy {
    pub provider: ProviderId,
    pub fallback_providers: Vec<ProviderId>,
    pub available_providers: Vec<ProviderId>,
    pub reason: PolicyReason,
}

/// Static per-intent preference ordering. Intents without their own row use
/// the chat row.
fn intent_preference(intent: IntentCategory) -> &'static [ProviderId] {
    use ProviderId::{Azure, Custom, Local, OpenAi};
    match intent {
        IntentCategory::Chat | IntentCategory::Code | IntentCategory::Planner => {
            &[OpenAi, Azure, Local, Custom]
        }
        IntentCategory::Integration => &[Custom, OpenAi, Azure, Local],
        IntentCategory::FileAnalysis
        | IntentCategory::FileAnalysisImage
        | IntentCategory::FileAnalysisDocument => &[OpenAi, Azure, Custom, Local],
        IntentCategory::FileAnalysisAudio => &[OpenAi, Azure],
        IntentCategory::FileAnalysisVideo => &[OpenAi, Azure, Custom],
    }
}

/// Fallback list is the availability ordering minus the chosen provider.
fn fallbacks_for(available: &[ProviderId], chosen: ProviderId) -> Vec<ProviderId> {
    available
        .iter()
        .copied()
        .filter(|item| *item != chosen)
        .collect()
}

/// Pick exactly one provider for the intent.
///
/// Decision order: explicitly requested provider if usable, then the
/// configured default, then the intent's static preference ordering, then a
/// degraded terminal result naming the configured default with empty
/// availability. Callers detect the degraded case via
/// [`PolicyReason::NoProviderAvailable`], not via an error.
pub fn resolve_provider_policy(
    available: &[ProviderId],
    intent: IntentCategory,
    requested_provider: Option<&str>,
    configured_provider: Option<&str>,
) -> ProviderPolicy {
    // Any non-empty string counts as a supplied request, even whitespace; it
    // just gets rejected as unknown and step 2 reports it as such.
    let requested = requested_provider.filter(|value| !value.is_empty());
    // Unknown configured values fall back to openai so the degraded terminal
    // result still names a known provider.
    let configured = configured_provider
        .and_then(ProviderId::from_id)
        .unwrap_or(ProviderId::OpenAi);

    if let Some(requested) = requested {
        if let Some(provider) = ProviderId::from_id(requested) {
            if available.contains(&provider) {
                return ProviderPolicy {
                    provider,
                    fallback_providers: fallbacks_for(available, provider),
                    available_providers: available.to_vec(),
                    reason: PolicyReason::RequestedProviderAvailable,
                };
            }
        }
    }

    if available.contains(&configured) {
        let reason = if requested.is_some() {
            PolicyReason::RequestedProviderUnavailableUseConfigured
        } else {
            PolicyReason::ConfiguredProviderAvailable
        };
        return ProviderPolicy {
            provider: configured,
            fallback_providers: fallbacks_for(available, configured),
            available_providers: available.to_vec(),
            reason,
        };
    }

    let preferred = intent_preference(intent);
    if let Some(picked) = preferred
        .iter()
        .copied()
        .find(|item| available.contains(item))
    {
        return ProviderPolicy {
            provider: picked,
            fallback_providers: fallbacks_for(available, picked),
            available_providers: available.to_vec(),
            reason: PolicyReason::IntentPolicySelected,
        };
    }

    ProviderPolicy {
        provider: configured,
        fallback_providers: Vec::new(),
        available_providers: Vec::new(),
        reason: PolicyReason::NoProviderAvailable,
    }
}
