//! `snap2pdf doctor` — Diagnose system health.

use std::path::PathBuf;

use snap2pdf_channels::{TelegramChannel, TelegramConfig};
use snap2pdf_config::AppConfig;
use snap2pdf_ledger::PremiumLedger;

pub async fn run(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    println!("🩺 snap2pdf Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let path = super::config_path(config_path);
    if path.exists() {
        println!("  ✅ Config file found: {}", path.display());
    } else {
        println!("  ⚠️  No config file — using defaults (run `snap2pdf onboard`)");
    }

    let config = match AppConfig::load_with_env(&path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config before running other checks.");
            return Ok(());
        }
    };

    let premium_path = config.storage.premium_path();
    match PremiumLedger::load(&premium_path) {
        Ok(ledger) => println!("  ✅ Premium list: {} user(s)", ledger.len()),
        Err(e) => {
            println!("  ❌ Premium list unreadable: {e}");
            issues += 1;
        }
    }

    let images_dir = config.storage.images_path();
    if images_dir.is_dir() {
        println!("  ✅ Images directory exists: {}", images_dir.display());
    } else {
        println!("  ⚠️  No images directory — it is created on `snap2pdf run`");
    }

    let qr = config.qr_image_path();
    if qr.is_file() {
        println!("  ✅ Payment QR found: {}", qr.display());
    } else {
        println!("  ⚠️  No payment QR at {} — offers are sent as text", qr.display());
    }

    match config.require_token() {
        Ok(token) => {
            let channel = TelegramChannel::new(TelegramConfig {
                bot_token: token.to_string(),
                api_url: config.telegram.api_url.clone(),
                poll_timeout_secs: config.telegram.poll_timeout_secs,
            })?;
            match channel.get_me().await {
                Ok(me) => println!(
                    "  ✅ Bot token accepted (@{})",
                    me.username.unwrap_or(me.first_name)
                ),
                Err(e) => {
                    println!("  ❌ Bot token rejected: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
