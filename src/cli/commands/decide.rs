//! `decide` command: classify a request and resolve the provider policy.

use anyhow::bail;

use crate::config::AnalysisConfig;
use crate::routing::{decide_route, DecisionRequest, IntentCategory, RequestMode};

pub struct DecideArgs {
    pub message: Option<String>,
    pub mode: String,
    pub file_id: Option<String>,
    pub mime: Option<String>,
    pub intent: Option<String>,
    pub provider: Option<String>,
}

pub fn run(config: &AnalysisConfig, args: DecideArgs) -> anyhow::Result<()> {
    let intent_hint = match args.intent.as_deref() {
        Some(id) => match IntentCategory::from_id(id) {
            Some(intent) => Some(intent),
            None => bail!("unknown intent '{}'", id),
        },
        None => None,
    };

    let request = DecisionRequest {
        mode: RequestMode::from_id(&args.mode),
        message: args.message.as_deref(),
        has_file_reference: args.file_id.is_some(),
        mime: args.mime.as_deref(),
        intent_hint,
        requested_provider: args.provider.as_deref(),
        configured_provider: Some(config.provider.id()),
        flags: config.provider_flags(),
    };

    let outcome = decide_route(&request);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
