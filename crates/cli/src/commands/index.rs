//! `onboarding-buddy index` — Rebuild the on-disk knowledge index.
//!
//! A standalone rebuild and verification of the document pipeline. Running
//! `chat` or `serve` processes build their own index once at startup.

use buddy_config::AppConfig;
use buddy_index::IndexBuilder;
use std::path::Path;
use std::time::Instant;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_with_override(config_path)?;
    let api_key = config.require_api_key()?;
    let document = config.require_source_document()?;

    println!("📚 Indexing {}", document.display());

    let provider = buddy_providers::build_from_config(&config, &api_key);
    let builder = IndexBuilder::from_config(&config, provider)?;
    let started = Instant::now();
    let index = builder.build().await?;

    println!(
        "✅ {} chunks embedded with {} in {:.1}s",
        index.len(),
        config.retrieval.embedding_model,
        started.elapsed().as_secs_f64()
    );
    println!("   Index written to {}", builder.index_dir().display());

    Ok(())
}
