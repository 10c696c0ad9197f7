//! Request routing: intent classification plus provider policy resolution.

mod intent;
mod policy;

use serde::Serialize;
use tracing::debug;

pub use intent::{classify_mime, classify_text, IntentCategory, RouteReason, RoutingDecision};
pub use policy::{
    resolve_provider_policy, PolicyReason, ProviderFlags, ProviderId, ProviderPolicy,
};

/// How the request entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    #[default]
    Chat,
    File,
}

impl RequestMode {
    /// Parse a mode from its string ID; anything unrecognized is chat.
    pub fn from_id(id: &str) -> Self {
        if id.eq_ignore_ascii_case("file") {
            Self::File
        } else {
            Self::Chat
        }
    }
}

/// Inputs to a routing decision.
#[derive(Debug, Clone, Default)]
pub struct DecisionRequest<'req> {
    pub mode: RequestMode,
    pub message: Option<&'req str>,
    pub has_file_reference: bool,
    pub mime: Option<&'req str>,
    /// Caller-supplied intent override; replaces the classified intent before
    /// policy resolution, while the original classification is still returned
    /// for observability.
    pub intent_hint: Option<IntentCategory>,
    pub requested_provider: Option<&'req str>,
    pub configured_provider: Option<&'req str>,
    pub flags: ProviderFlags,
}

/// A full routing decision: what the request is, and who should serve it.
#[derive(Debug, Clone, Serialize)]
pub struct RouteOutcome {
    pub route: RoutingDecision,
    pub policy: ProviderPolicy,
}

/// Classify the request and resolve the provider policy for it.
pub fn decide_route(request: &DecisionRequest) -> RouteOutcome {
    let route = match request.mode {
        RequestMode::File => classify_mime(request.mime.unwrap_or("")),
        RequestMode::Chat => {
            classify_text(request.message.unwrap_or(""), request.has_file_reference)
        }
    };

    let intent = request.intent_hint.unwrap_or(route.intent);
    let available = request.flags.available();
    let policy = resolve_provider_policy(
        &available,
        intent,
        request.requested_provider,
        request.configured_provider,
    );

    debug!(
        intent = intent.id(),
        provider = policy.provider.id(),
        confidence = route.confidence,
        "routing decision"
    );

    RouteOutcome { route, policy }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_flags() -> ProviderFlags {
        ProviderFlags {
            openai: true,
            azure: true,
            local: true,
            custom: true,
        }
    }

    #[test]
    fn test_intent_hint_overrides_classification() {
        // Message classifies as chat, but the hint drives policy: integration
        // prefers custom when the configured default is unavailable.
        let request = DecisionRequest {
            message: Some("hello"),
            intent_hint: Some(IntentCategory::Integration),
            flags: ProviderFlags {
                custom: true,
                ..ProviderFlags::default()
            },
            ..DecisionRequest::default()
        };
        let outcome = decide_route(&request);
        assert_eq!(outcome.route.intent, IntentCategory::Chat);
        assert_eq!(outcome.policy.provider, ProviderId::Custom);
        assert_eq!(outcome.policy.reason, PolicyReason::IntentPolicySelected);
    }

    #[test]
    fn test_file_mode_uses_mime() {
        let request = DecisionRequest {
            mode: RequestMode::File,
            mime: Some("image/jpeg"),
            flags: all_flags(),
            ..DecisionRequest::default()
        };
        let outcome = decide_route(&request);
        assert_eq!(outcome.route.intent, IntentCategory::FileAnalysisImage);
        assert_eq!(outcome.route.reason, RouteReason::MimeImage);
    }

    #[test]
    fn test_mode_parsing_defaults_to_chat() {
        assert_eq!(RequestMode::from_id("file"), RequestMode::File);
        assert_eq!(RequestMode::from_id("FILE"), RequestMode::File);
        assert_eq!(RequestMode::from_id("chat"), RequestMode::Chat);
        assert_eq!(RequestMode::from_id("bogus"), RequestMode::Chat);
    }
}
