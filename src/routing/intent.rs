//! Intent classification for incoming requests.
//!
//! Chat-style requests are scored against per-intent keyword lists; file-style
//! requests are classified from their MIME type's primary token.

use serde::Serialize;

/// Task intent inferred for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    Chat,
    Code,
    Planner,
    Integration,
    FileAnalysis,
    FileAnalysisImage,
    FileAnalysisAudio,
    FileAnalysisVideo,
    FileAnalysisDocument,
}

impl IntentCategory {
    /// Get the intent ID as a string.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Code => "code",
            Self::Planner => "planner",
            Self::Integration => "integration",
            Self::FileAnalysis => "file_analysis",
            Self::FileAnalysisImage => "file_analysis_image",
            Self::FileAnalysisAudio => "file_analysis_audio",
            Self::FileAnalysisVideo => "file_analysis_video",
            Self::FileAnalysisDocument => "file_analysis_document",
        }
    }

    /// Parse an intent from its string ID.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "chat" => Some(Self::Chat),
            "code" => Some(Self::Code),
            "planner" => Some(Self::Planner),
            "integration" => Some(Self::Integration),
            "file_analysis" => Some(Self::FileAnalysis),
            "file_analysis_image" => Some(Self::FileAnalysisImage),
            "file_analysis_audio" => Some(Self::FileAnalysisAudio),
            "file_analysis_video" => Some(Self::FileAnalysisVideo),
            "file_analysis_document" => Some(Self::FileAnalysisDocument),
            _ => None,
        }
    }
}

/// Why a routing decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteReason {
    FileIdPresent,
    DefaultChat,
    KeywordMatch,
    MimeImage,
    MimeAudio,
    MimeVideo,
    MimeGeneric,
}

/// Classification outcome for a single request. Produced fresh per request,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub intent: IntentCategory,
    pub confidence: f64,
    pub reason: RouteReason,
}

/// Keyword lists per scorable intent, in tie-break order. Keyword matching is
/// substring containment, so partial words count ("api" matches "rapid") -
/// known looseness, kept for parity with deployed behavior.
const INTENT_KEYWORDS: &[(IntentCategory, &[&str])] = &[
    (
        IntentCategory::Chat,
        &["hello", "hi", "привет", "здарова", "сәлем"],
    ),
    (
        IntentCategory::Code,
        &["code", "bug", "refactor", "function", "api", "код", "ошибка"],
    ),
    (
        IntentCategory::Planner,
        &["plan", "task", "schedule", "todo", "план", "задача", "распис"],
    ),
    (
        IntentCategory::Integration,
        &["slack", "notion", "google", "integration", "интегра"],
    ),
    (
        IntentCategory::FileAnalysis,
        &[
            "file", "image", "audio", "video", "analyze", "файл", "анализ", "аудио", "видео",
        ],
    ),
];

/// Count how many keywords occur as substrings of the (lower-cased) text.
pub fn score_intent(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|word| text.contains(*word)).count()
}

/// Classify a chat-style request from its message text.
///
/// A file reference always dominates the text content. Otherwise the intent
/// with the strictly highest keyword score wins; earlier intents win ties.
pub fn classify_text(message: &str, has_file_reference: bool) -> RoutingDecision {
    if has_file_reference {
        return RoutingDecision {
            intent: IntentCategory::FileAnalysis,
            confidence: 1.0,
            reason: RouteReason::FileIdPresent,
        };
    }

    let text = message.to_lowercase();
    let mut best_intent = IntentCategory::Chat;
    let mut best_score = 0;

    for (intent, keywords) in INTENT_KEYWORDS {
        let current = score_intent(&text, keywords);
        if current > best_score {
            best_score = current;
            best_intent = *intent;
        }
    }

    if best_score == 0 {
        return RoutingDecision {
            intent: IntentCategory::Chat,
            confidence: 0.35,
            reason: RouteReason::DefaultChat,
        };
    }

    let confidence = f64::min(0.95, 0.4 + best_score as f64 * 0.2);
    RoutingDecision {
        intent: best_intent,
        confidence,
        reason: RouteReason::KeywordMatch,
    }
}

/// Classify a file-style request from its declared MIME type.
pub fn classify_mime(mime: &str) -> RoutingDecision {
    if mime.starts_with("image/") {
        return RoutingDecision {
            intent: IntentCategory::FileAnalysisImage,
            confidence: 0.95,
            reason: RouteReason::MimeImage,
        };
    }
    if mime.starts_with("audio/") {
        return RoutingDecision {
            intent: IntentCategory::FileAnalysisAudio,
            confidence: 0.95,
            reason: RouteReason::MimeAudio,
        };
    }
    if mime.starts_with("video/") {
        return RoutingDecision {
            intent: IntentCategory::FileAnalysisVideo,
            confidence: 0.95,
            reason: RouteReason::MimeVideo,
        };
    }
    RoutingDecision {
        intent: IntentCategory::FileAnalysisDocument,
        confidence: 0.8,
        reason: RouteReason::MimeGeneric,
    }
}
