//! `snap2pdf onboard` — First-time setup.

use anyhow::Context;
use snap2pdf_config::AppConfig;

pub async fn run() -> anyhow::Result<()> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("📄 snap2pdf — First-Time Setup");
    println!("==============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    // Storage layout under the configured data directory
    let config = AppConfig::load_with_env(&config_path)?;
    let images_dir = config.storage.images_path();
    if !images_dir.exists() {
        std::fs::create_dir_all(&images_dir)
            .with_context(|| format!("Failed to create {}", images_dir.display()))?;
        println!("✅ Created images directory: {}", images_dir.display());
    }

    let premium_path = config.storage.premium_path();
    if !premium_path.exists() {
        std::fs::write(&premium_path, "")
            .with_context(|| format!("Failed to write {}", premium_path.display()))?;
        println!("✅ Created empty premium list: {}", premium_path.display());
    }

    println!("\n📝 Next steps:");
    println!("   1. Put your token in {} or export BOT_TOKEN", config_path.display());
    println!("   2. Add premium user ids, one per line, to {}", premium_path.display());
    println!("   3. Place the payment QR at {}", config.qr_image_path().display());
    println!("   4. Run: snap2pdf run\n");

    Ok(())
}
