//! `mathdesk doctor`: Diagnose setup health.

use super::{CmdResult, Globals};
use mathdesk_archive::JsonFileStore;
use mathdesk_config::AppConfig;
use mathdesk_core::archive::Archive;
use mathdesk_core::error::StoreError;
use mathdesk_core::provider::Provider;
use mathdesk_core::store::ArchiveStore;
use std::path::Path;

pub async fn run(globals: &Globals, offline: bool) -> CmdResult {
    println!("🩺 MathDesk Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    // Check config
    let config_path = globals.config_path();
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `mathdesk onboard`)");
        issues += 1;
    }
    let config = match globals.load_config() {
        Ok(config) => {
            println!("  ✅ Config valid ({} / {})", config.default_provider, config.default_model);
            config
        }
        Err(e) => {
            println!("  ❌ {e}");
            println!("\n  ⚠️  Fix the config file before running other checks.");
            return Ok(());
        }
    };

    // Check API keys
    if config.has_api_key() {
        println!("  ✅ API key configured for {}", config.default_provider);
    } else {
        println!("  ⚠️  No API key for {} — set MATHDESK_API_KEY", config.default_provider);
        issues += 1;
    }
    if !config.vision.enabled {
        println!("  ⚠️  Photo analysis disabled ([vision] enabled = false)");
    } else if config.vision.api_key.is_some() || vision_key_in_section(&config) {
        println!("  ✅ Vision key configured for {}", config.vision.provider);
    } else {
        println!("  ⚠️  No vision key for {} — set MATHDESK_VISION_API_KEY", config.vision.provider);
        issues += 1;
    }

    // Check archive
    let archive_path = globals.archive_path(&config);
    match inspect_archive(&archive_path).await {
        Ok(archive) => println!(
            "  ✅ Archive readable: {} ({} students, {} records)",
            archive_path.display(),
            archive.len(),
            archive.record_count()
        ),
        Err(e) => {
            println!("  ❌ Archive problem: {e}");
            issues += 1;
        }
    }

    // Check providers
    match mathdesk_providers::router::build_from_config(&config) {
        Ok(router) => {
            if offline {
                println!("  ⏭️  Provider checks skipped (--offline)");
            } else {
                if let Some(text) = router.default() {
                    issues += report_health("Text", text.as_ref()).await;
                }
                if let Some(vision) = router.vision() {
                    issues += report_health("Vision", vision.as_ref()).await;
                }
            }
        }
        Err(e) => {
            println!("  ❌ Providers: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Read the archive without acting on a corrupt file, whatever
/// `on_corrupt` says: a diagnosis must leave the file where it is.
async fn inspect_archive(path: &Path) -> Result<Archive, StoreError> {
    JsonFileStore::new(path).load().await
}

fn vision_key_in_section(config: &AppConfig) -> bool {
    config
        .providers
        .get(&config.vision.provider)
        .is_some_and(|p| p.api_key.is_some())
}

async fn report_health(label: &str, provider: &dyn Provider) -> u32 {
    match provider.health_check().await {
        Ok(true) => {
            println!("  ✅ {label} provider reachable: {}", provider.name());
            0
        }
        Ok(false) => {
            println!("  ❌ {label} provider unhealthy: {}", provider.name());
            1
        }
        Err(e) => {
            println!("  ❌ {label} provider {}: {e}", provider.name());
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn corrupt_archive_is_reported_and_left_in_place() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("student_archives.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = inspect_archive(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn missing_archive_is_fine() {
        let dir = tempfile::TempDir::new().unwrap();
        let archive = inspect_archive(&dir.path().join("none.json")).await.unwrap();
        assert!(archive.is_empty());
    }
}
