//! `onboarding-buddy doctor` — Diagnose configuration and data files.

use buddy_config::AppConfig;
use buddy_index::{RecursiveChunker, SourceDocument, VectorIndex};
use std::path::Path;

/// Outcome of one diagnostic check.
#[derive(Debug, PartialEq, Eq)]
enum Check {
    Pass(String),
    Warn(String),
    Fail(String),
}

impl Check {
    fn is_issue(&self) -> bool {
        !matches!(self, Check::Pass(_))
    }

    fn render(&self) -> String {
        match self {
            Check::Pass(msg) => format!("  ✅ {msg}"),
            Check::Warn(msg) => format!("  ⚠️  {msg}"),
            Check::Fail(msg) => format!("  ❌ {msg}"),
        }
    }
}

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Onboarding Buddy Doctor — System Diagnostics");
    println!("===============================================\n");

    let path = super::config_path(config_path);
    let checks = diagnose(&path);
    for check in &checks {
        println!("{}", check.render());
    }

    let issues = checks.iter().filter(|c| c.is_issue()).count();
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

fn diagnose(config_file: &Path) -> Vec<Check> {
    let mut checks = Vec::new();

    if config_file.exists() {
        checks.push(Check::Pass(format!("Config file found: {}", config_file.display())));
    } else {
        checks.push(Check::Warn(format!(
            "No config file at {} — using defaults (run `onboarding-buddy init`)",
            config_file.display()
        )));
    }

    let config = match AppConfig::load_with_override(Some(config_file)) {
        Ok(config) => {
            checks.push(Check::Pass("Config valid".into()));
            config
        }
        Err(e) => {
            checks.push(Check::Fail(format!("Config invalid: {e}")));
            return checks;
        }
    };

    checks.extend(check_secrets(&config));
    checks.extend(check_data(&config));
    checks
}

fn check_secrets(config: &AppConfig) -> Vec<Check> {
    let mut checks = Vec::new();
    match config.require_api_key() {
        Ok(_) => checks.push(Check::Pass("API key configured".into())),
        Err(_) => checks.push(Check::Fail(
            "No API key — set ONBOARDING_BUDDY_API_KEY or api_key in config.toml".into(),
        )),
    }
    if config.access_password.as_deref().is_some_and(|p| !p.is_empty()) {
        checks.push(Check::Pass("Access password configured".into()));
    } else {
        checks.push(Check::Fail(
            "No access password — set ONBOARDING_BUDDY_PASSWORD or access_password in config.toml"
                .into(),
        ));
    }
    checks
}

fn check_data(config: &AppConfig) -> Vec<Check> {
    let mut checks = Vec::new();
    let paths = &config.paths;

    match SourceDocument::load(&paths.source_document) {
        Ok(document) => {
            let chunks = RecursiveChunker::from_config(&config.chunking)
                .map(|c| c.chunk(&document.full_text()).len())
                .unwrap_or(0);
            checks.push(Check::Pass(format!(
                "Source document readable: {} paragraph(s), {chunks} chunk(s)",
                document.paragraphs.len()
            )));
        }
        Err(e) => checks.push(Check::Fail(format!("Source document: {e}"))),
    }

    match VectorIndex::load(&paths.index_dir) {
        Ok(index) if !index.is_empty() => checks.push(Check::Pass(format!(
            "Knowledge index on disk: {} entries in {}",
            index.len(),
            paths.index_dir.display()
        ))),
        _ => checks.push(Check::Warn(format!(
            "No knowledge index in {} — each chat or serve process builds one; run `onboarding-buddy index` to verify the pipeline",
            paths.index_dir.display()
        ))),
    }

    if paths.log_dir.is_dir() {
        let transcripts = std::fs::read_dir(&paths.log_dir)
            .map(|entries| entries.filter_map(Result::ok).count())
            .unwrap_or(0);
        checks.push(Check::Pass(format!(
            "Transcript directory: {} ({transcripts} file(s))",
            paths.log_dir.display()
        )));
    } else {
        checks.push(Check::Warn(format!(
            "Transcript directory {} does not exist yet — created on the first answered question",
            paths.log_dir.display()
        )));
    }

    checks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_stops_early() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[generation]\ntemperature = 9.0\n").unwrap();

        let checks = diagnose(&path);
        assert_eq!(checks.len(), 2);
        assert!(matches!(&checks[1], Check::Fail(msg) if msg.contains("temperature")));
    }

    #[test]
    fn data_checks_report_document_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("kit.json");
        std::fs::write(&document, r#"["Welcome to the division.", "Lunch is at noon."]"#).unwrap();

        let mut config = AppConfig::default();
        config.paths.source_document = document;
        config.paths.index_dir = dir.path().join("Database");
        config.paths.log_dir = dir.path().to_path_buf();

        let checks = check_data(&config);
        assert!(matches!(&checks[0], Check::Pass(msg) if msg.contains("2 paragraph(s)")));
        assert!(matches!(&checks[1], Check::Warn(msg) if msg.contains("each chat or serve process builds one")));
        assert!(!checks[1].render().contains("first question"));
        assert!(matches!(&checks[2], Check::Pass(_)));
    }

    #[test]
    fn missing_secrets_fail() {
        let checks = check_secrets(&AppConfig::default());
        assert!(checks.iter().all(Check::is_issue));
    }
}
