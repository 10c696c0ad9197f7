//! Per-modality analysis dispatch.
//!
//! Resolves a record/config pair into a concrete backend call: vision request
//! for images, transcription for audio, sampled-frame vision request for
//! video, snippet summarization for everything else. A record with nothing to
//! analyze short-circuits to plain existence/hash metadata.

mod frames;
mod providers;

use std::io::Read;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::routing::ProviderId;
use crate::utils::hash;

pub use providers::AnalysisResult;
use providers::ContentPart;

const IMAGE_PROMPT: &str =
    "Analyze this image. Describe the contents, any visible text, and notable details.";
const VIDEO_PROMPT: &str =
    "These are frames sampled from a video. Summarize the scene, actions, and objects across them.";
const DOCUMENT_PROMPT: &str =
    "Summarize this document, extract the key entities, and list notable insights.";

/// At most 3 frames, one every 3 seconds of video.
const MAX_FRAMES: u32 = 3;
const FRAME_INTERVAL_SECS: u32 = 3;

/// Byte cap for document snippets sent inline.
const DOCUMENT_SNIPPET_BYTES: u64 = 8000;

/// A file to analyze. Exactly one of `provider_file_id` or `local_path` is
/// expected to be usable; both absent means there is nothing to analyze.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(default)]
    pub name: Option<String>,
    /// Declared MIME type; sniffed from the file name when absent.
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    /// Provider-side file handle.
    #[serde(default)]
    pub provider_file_id: Option<String>,
    #[serde(default)]
    pub local_path: Option<PathBuf>,
}

/// Guess a MIME type from a file name extension. Empty when unknown.
fn guess_mime_from_name(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "json" => "application/json",
        "csv" => "text/csv",
        _ => "",
    }
}

/// Effective MIME type: declared if present, else guessed from the record's
/// name or local path, else empty.
fn sniff_mime(record: &AnalysisRecord) -> String {
    if let Some(mime) = record.mime.as_deref() {
        if !mime.is_empty() {
            return mime.to_string();
        }
    }
    if let Some(name) = record.name.as_deref() {
        let guessed = guess_mime_from_name(name);
        if !guessed.is_empty() {
            return guessed.to_string();
        }
    }
    if let Some(path) = record.local_path.as_deref() {
        if let Some(name) = path.file_name() {
            return guess_mime_from_name(&name.to_string_lossy()).to_string();
        }
    }
    String::new()
}

/// Self-contained byte-embedded reference for inline binary content.
fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Existence/hash metadata for a record that has nothing to analyze.
fn metadata_result(record: &AnalysisRecord) -> AnalysisResult {
    let exists = record
        .local_path
        .as_deref()
        .map(Path::exists)
        .unwrap_or(false);
    let sha256 = record.local_path.as_deref().and_then(hash::sha256_file);
    let metadata = json!({
        "name": record.name,
        "mime": record.mime,
        "size": record.size,
        "exists": exists,
        "sha256": sha256,
    });
    AnalysisResult {
        ok: true,
        text: Some(metadata.to_string()),
        raw: Some(metadata),
        error: None,
    }
}

async fn analyze_image(
    record: &AnalysisRecord,
    mime: &str,
    config: &AnalysisConfig,
) -> AnalysisResult {
    let mut parts = vec![ContentPart::Text(IMAGE_PROMPT.to_string())];

    if let Some(file_id) = record.provider_file_id.as_deref() {
        parts.push(ContentPart::FileId(file_id.to_string()));
    } else if let Some(path) = record.local_path.as_deref() {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                return AnalysisResult::failure(format!("Image file is not readable: {}", err))
            }
        };
        parts.push(ContentPart::ImageUrl(data_url(mime, &bytes)));
    } else {
        return AnalysisResult::failure("Image analysis requires a file.");
    }

    providers::dispatch(&parts, config).await
}

async fn analyze_audio(record: &AnalysisRecord, config: &AnalysisConfig) -> AnalysisResult {
    if config.provider != ProviderId::OpenAi {
        return AnalysisResult::failure(
            "Audio transcription is only supported on the OpenAI provider.",
        );
    }
    let Some(path) = record.local_path.as_deref() else {
        return AnalysisResult::failure("Audio analysis requires a local file.");
    };
    providers::transcribe(path, config).await
}

async fn analyze_video(record: &AnalysisRecord, config: &AnalysisConfig) -> AnalysisResult {
    let Some(path) = record.local_path.as_deref() else {
        return AnalysisResult::failure("Video analysis requires a local file.");
    };

    let workdir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => return AnalysisResult::failure(err.to_string()),
    };

    let frame_paths =
        match frames::extract_frames(path, workdir.path(), MAX_FRAMES, FRAME_INTERVAL_SECS).await {
            Ok(paths) => paths,
            Err(err) => return AnalysisResult::failure(err.to_string()),
        };

    if frame_paths.is_empty() {
        return AnalysisResult::failure("No frames could be extracted from the video.");
    }
    info!(frames = frame_paths.len(), "sampled video frames");

    let mut parts = vec![ContentPart::Text(VIDEO_PROMPT.to_string())];
    for frame in &frame_paths {
        let bytes = match tokio::fs::read(frame).await {
            Ok(bytes) => bytes,
            Err(err) => return AnalysisResult::failure(err.to_string()),
        };
        parts.push(ContentPart::ImageUrl(data_url("image/jpeg", &bytes)));
    }

    providers::dispatch(&parts, config).await
}

/// Read up to the snippet byte cap and decode permissively; invalid byte
/// sequences are dropped, not fatal.
fn read_snippet(path: &Path) -> Option<String> {
    let file = std::fs::File::open(path).ok()?;
    let mut buf = Vec::new();
    file.take(DOCUMENT_SNIPPET_BYTES)
        .read_to_end(&mut buf)
        .ok()?;
    Some(String::from_utf8_lossy(&buf).into_owned())
}

async fn analyze_document(record: &AnalysisRecord, config: &AnalysisConfig) -> AnalysisResult {
    let mut parts = vec![ContentPart::Text(DOCUMENT_PROMPT.to_string())];

    if let Some(file_id) = record.provider_file_id.as_deref() {
        parts.push(ContentPart::FileId(file_id.to_string()));
    } else if let Some(snippet) = record.local_path.as_deref().and_then(read_snippet) {
        if !snippet.is_empty() {
            parts.push(ContentPart::Text(format!("File content excerpt:\n{}", snippet)));
        }
    }

    providers::dispatch(&parts, config).await
}

/// Analyze a record with the active provider.
///
/// A record with neither a provider file handle nor a local path yields
/// metadata only and never triggers a provider call.
pub async fn analyze_record(record: &AnalysisRecord, config: &AnalysisConfig) -> AnalysisResult {
    if record.provider_file_id.is_none() && record.local_path.is_none() {
        return metadata_result(record);
    }

    let mime = sniff_mime(record);
    debug!(mime = %mime, provider = config.provider.id(), "analyzing record");

    if mime.starts_with("image/") {
        analyze_image(record, &mime, config).await
    } else if mime.starts_with("audio/") {
        analyze_audio(record, config).await
    } else if mime.starts_with("video/") {
        analyze_video(record, config).await
    } else {
        analyze_document(record, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record_with_path(path: PathBuf) -> AnalysisRecord {
        AnalysisRecord {
            local_path: Some(path),
            ..AnalysisRecord::default()
        }
    }

    #[test]
    fn test_guess_mime_from_name() {
        assert_eq!(guess_mime_from_name("photo.PNG"), "image/png");
        assert_eq!(guess_mime_from_name("talk.mp3"), "audio/mpeg");
        assert_eq!(guess_mime_from_name("clip.mp4"), "video/mp4");
        assert_eq!(guess_mime_from_name("report.pdf"), "application/pdf");
        assert_eq!(guess_mime_from_name("unknown.xyz"), "");
        assert_eq!(guess_mime_from_name("no_extension"), "");
    }

    #[test]
    fn test_sniff_prefers_declared_mime() {
        let record = AnalysisRecord {
            name: Some("clip.mp4".to_string()),
            mime: Some("image/png".to_string()),
            ..AnalysisRecord::default()
        };
        assert_eq!(sniff_mime(&record), "image/png");

        let record = AnalysisRecord {
            name: Some("clip.mp4".to_string()),
            mime: Some(String::new()),
            ..AnalysisRecord::default()
        };
        assert_eq!(sniff_mime(&record), "video/mp4");
    }

    #[test]
    fn test_data_url() {
        assert_eq!(data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn test_empty_record_yields_metadata_only() {
        let record = AnalysisRecord {
            name: Some("ghost.bin".to_string()),
            ..AnalysisRecord::default()
        };
        let result = analyze_record(&record, &AnalysisConfig::default()).await;
        assert!(result.ok);
        let raw = result.raw.unwrap();
        assert_eq!(raw["exists"], false);
        assert!(raw["sha256"].is_null());
    }

    #[tokio::test]
    async fn test_audio_requires_openai_provider() {
        let mut config = AnalysisConfig::default();
        config.provider = ProviderId::Azure;
        let record = AnalysisRecord {
            mime: Some("audio/mpeg".to_string()),
            local_path: Some(PathBuf::from("/tmp/voice.mp3")),
            ..AnalysisRecord::default()
        };
        let result = analyze_record(&record, &config).await;
        assert!(!result.ok);
        assert_eq!(
            result.error.as_deref(),
            Some("Audio transcription is only supported on the OpenAI provider.")
        );
    }

    #[tokio::test]
    async fn test_audio_requires_local_file() {
        let record = AnalysisRecord {
            mime: Some("audio/mpeg".to_string()),
            provider_file_id: Some("file-123".to_string()),
            ..AnalysisRecord::default()
        };
        let result = analyze_record(&record, &AnalysisConfig::default()).await;
        assert!(!result.ok);
        assert_eq!(
            result.error.as_deref(),
            Some("Audio analysis requires a local file.")
        );
    }

    #[tokio::test]
    async fn test_unreadable_image_fails() {
        let record = AnalysisRecord {
            mime: Some("image/png".to_string()),
            local_path: Some(PathBuf::from("/nonexistent/photo.png")),
            ..AnalysisRecord::default()
        };
        let result = analyze_record(&record, &AnalysisConfig::default()).await;
        assert!(!result.ok);
        assert!(result
            .error
            .unwrap()
            .starts_with("Image file is not readable"));
    }

    #[tokio::test]
    async fn test_video_with_no_frames_fails() {
        // Garbage bytes never yield frames, whether ffmpeg rejects the input
        // or is missing entirely. Provider config validity is irrelevant.
        let mut file = tempfile::NamedTempFile::with_suffix(".mp4").unwrap();
        file.write_all(b"not a video").unwrap();
        let mut config = AnalysisConfig::default();
        config.openai.api_key = "sk-test".to_string();

        let record = record_with_path(file.path().to_path_buf());
        let result = analyze_record(&record, &config).await;
        assert!(!result.ok);
    }

    #[test]
    fn test_read_snippet_is_bounded_and_lossy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut content = vec![b'a'; 9000];
        content[0] = 0xFF; // invalid UTF-8 start byte
        file.write_all(&content).unwrap();

        let snippet = read_snippet(file.path()).unwrap();
        assert!(snippet.len() <= 8100);
        assert!(snippet.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_document_reaches_provider_dispatch() {
        // With no credentials, the document path builds its payload and then
        // fails at the provider credential check, proving no earlier error.
        let mut file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        file.write_all(b"quarterly report").unwrap();
        let record = record_with_path(file.path().to_path_buf());
        let result = analyze_record(&record, &AnalysisConfig::default()).await;
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("OpenAI API key is missing."));
    }
}
