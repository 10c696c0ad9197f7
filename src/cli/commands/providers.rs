//! `providers` command: show provider availability from the loaded config.

use serde_json::json;

use crate::config::AnalysisConfig;
use crate::routing::ProviderId;

pub fn run(config: &AnalysisConfig) -> anyhow::Result<()> {
    let flags = config.provider_flags();
    let available: Vec<&str> = flags
        .available()
        .iter()
        .map(ProviderId::id)
        .collect();

    let report = json!({
        "status": "Hephaestus AI online",
        "active_provider": config.provider.id(),
        "flags": flags,
        "available_providers": available,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
