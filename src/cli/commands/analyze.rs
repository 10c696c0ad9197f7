//! `analyze` command: run modality analysis on a file.

use std::path::PathBuf;

use crate::analysis::{analyze_record, AnalysisRecord};
use crate::config::AnalysisConfig;

pub async fn run(
    config: &AnalysisConfig,
    path: Option<PathBuf>,
    file_id: Option<String>,
    name: Option<String>,
    mime: Option<String>,
) -> anyhow::Result<()> {
    let size = match path.as_deref() {
        Some(path) => tokio::fs::metadata(path).await.ok().map(|meta| meta.len()),
        None => None,
    };

    let record = AnalysisRecord {
        name,
        mime,
        size,
        provider_file_id: file_id,
        local_path: path,
    };

    let result = analyze_record(&record, config).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.ok {
        std::process::exit(1);
    }
    Ok(())
}
