//! `mathdesk onboard`: First-time setup.

use super::{CmdResult, Globals};
use mathdesk_config::AppConfig;

pub async fn run(globals: &Globals) -> CmdResult {
    let config_path = globals.config_path();

    println!("📐 MathDesk — First-Time Setup");
    println!("==============================\n");

    // Create directories
    if let Some(config_dir) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir)?;
            println!("✅ Created config directory: {}", config_dir.display());
        } else {
            println!("  Config directory exists: {}", config_dir.display());
        }
    }

    // Create config file
    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    let config = globals.load_config()?;
    let archive_path = globals.archive_path(&config);
    if let Some(archive_dir) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(archive_dir)?;
    }
    println!("  Archive file: {}", archive_path.display());

    println!("\n📝 Next steps:");
    println!("   1. Set MATHDESK_API_KEY (text) and MATHDESK_VISION_API_KEY (photos),");
    println!("      or add api_key entries to {}", config_path.display());
    println!("   2. Run: mathdesk student add <姓名>");
    println!("   3. Run: mathdesk mistake <姓名> --text \"题目和学生作答\"\n");

    println!("🎉 Setup complete!");
    Ok(())
}
