//! `onboarding-buddy serve` — Start the HTTP gateway.

use buddy_config::AppConfig;
use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load_with_override(config_path)?;

    if let Some(p) = port {
        config.gateway.port = p;
    }

    println!("🌐 Onboarding Buddy gateway");
    println!("   Listening on http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Source document: {}", config.paths.source_document.display());
    println!("   Transcripts: {}", config.paths.log_dir.display());
    println!("   Press Ctrl+C to stop\n");

    buddy_gateway::start(config).await
}
