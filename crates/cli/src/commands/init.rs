//! `onboarding-buddy init` — First-time setup.

use buddy_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_path(config_path);

    println!("🤝 Onboarding Buddy — First-Time Setup");
    println!("======================================\n");

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created config directory: {}", dir.display());
        }
    }

    if path.exists() {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or delete and re-run init.\n");
        return Ok(());
    }

    write_default(&path)?;
    println!("✅ Created config.toml at: {}", path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set ONBOARDING_BUDDY_API_KEY (or api_key in the config)");
    println!("   2. Set ONBOARDING_BUDDY_PASSWORD (or access_password in the config)");
    println!("   3. Point paths.source_document at your induction kit");
    println!("   4. Run: onboarding-buddy chat\n");

    Ok(())
}

fn write_default(path: &Path) -> std::io::Result<()> {
    std::fs::write(path, AppConfig::default_toml())
}
