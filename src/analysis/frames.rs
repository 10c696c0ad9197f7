//! Still-frame sampling from video files using ffmpeg.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Errors from the external frame-extraction process.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Failed to run ffmpeg: {0}")]
    Io(#[from] std::io::Error),
    #[error("ffmpeg failed: {0}")]
    Failed(String),
}

/// Build the ffmpeg argument list. ffmpeg options must precede the file they
/// apply to, so `-y` leads and the output pattern comes last; ffmpeg 6+
/// rejects trailing options outright.
fn ffmpeg_args(video: &Path, pattern: &Path, max_frames: u32, interval_secs: u32) -> Vec<OsString> {
    vec![
        OsString::from("-y"),
        OsString::from("-i"),
        OsString::from(video),
        OsString::from("-vf"),
        OsString::from(format!("fps=1/{}", interval_secs)),
        OsString::from("-frames:v"),
        OsString::from(max_frames.to_string()),
        OsString::from("-q:v"),
        OsString::from("2"),
        OsString::from(pattern),
    ]
}

/// Extract up to `max_frames` still frames, one every `interval_secs` seconds,
/// into `out_dir`. Returns the frame paths in sample order; the list may be
/// empty for very short or broken inputs.
pub async fn extract_frames(
    video: &Path,
    out_dir: &Path,
    max_frames: u32,
    interval_secs: u32,
) -> Result<Vec<PathBuf>, FrameError> {
    let pattern = out_dir.join("frame_%03d.jpg");
    debug!(video = %video.display(), max_frames, interval_secs, "extracting frames");

    let output = Command::new("ffmpeg")
        .args(ffmpeg_args(video, &pattern, max_frames, interval_secs))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("ffmpeg stderr: {}", stderr);
        return Err(FrameError::Failed(stderr.trim().to_string()));
    }

    let mut frames = Vec::new();
    let mut entries = tokio::fs::read_dir(out_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with("frame_") && name.ends_with(".jpg") {
            frames.push(entry.path());
        }
    }
    frames.sort();
    debug!(count = frames.len(), "frames extracted");
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_options_precede_their_files() {
        let args = ffmpeg_args(Path::new("clip.mp4"), Path::new("/work/frame_%03d.jpg"), 3, 3);
        // Overwrite flag is a global option and must come before any file;
        // the output pattern is the final argument with nothing after it.
        assert_eq!(args[0], "-y");
        assert_eq!(args[1], "-i");
        assert_eq!(args[2], "clip.mp4");
        assert_eq!(args.last().unwrap(), "/work/frame_%03d.jpg");
        assert!(!args[3..].contains(&OsString::from("-y")));
    }

    #[tokio::test]
    async fn test_broken_input_errors() {
        // Not a real video; ffmpeg rejects it (or is absent entirely). Either
        // way the caller sees an error, never a silent success.
        let dir = tempfile::tempdir().unwrap();
        let mut file = tempfile::NamedTempFile::with_suffix(".mp4").unwrap();
        file.write_all(b"not a video").unwrap();

        let result = extract_frames(file.path(), dir.path(), 3, 3).await;
        assert!(result.is_err());
    }
}
