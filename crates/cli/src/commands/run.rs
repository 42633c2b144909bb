//! `snap2pdf run` — Start the bot.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use snap2pdf_bot::{Bot, BotSettings, PremiumOffer, SessionStore, dispatcher};
use snap2pdf_channels::{TelegramChannel, TelegramConfig};
use snap2pdf_document::PdfAssembler;
use snap2pdf_ledger::{PremiumLedger, PromptLog};
use tracing::info;

pub async fn run(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let token = config
        .require_token()
        .context("Set BOT_TOKEN or bot_token in config.toml")?;

    let premium = PremiumLedger::load(&config.storage.premium_path())?;
    let prompt_log = PromptLog::open(config.storage.prompt_log_path())?;
    info!(
        premium_users = premium.len(),
        prompted_users = prompt_log.len(),
        prompt_log = %prompt_log.path().display(),
        "Ledgers loaded"
    );

    let images_dir = config.storage.images_path();
    std::fs::create_dir_all(&images_dir)
        .with_context(|| format!("Failed to create {}", images_dir.display()))?;

    let channel = Arc::new(TelegramChannel::new(TelegramConfig {
        bot_token: token.to_string(),
        api_url: config.telegram.api_url.clone(),
        poll_timeout_secs: config.telegram.poll_timeout_secs,
    })?);
    let me = channel
        .get_me()
        .await
        .context("Telegram rejected the bot token")?;
    info!(
        bot = me.username.as_deref().unwrap_or(&me.first_name),
        "Authenticated"
    );

    let settings = BotSettings {
        limits: config.limits(),
        images_dir,
        document_name: config.storage.document_name.clone(),
        offer: PremiumOffer {
            price: config.premium.price.clone(),
            payment_id: config.premium.payment_id.clone(),
            admin_url: config.premium.admin_url(),
        },
        qr_image: Some(config.qr_image_path()),
    };
    let mut bot = Bot::new(
        channel,
        Arc::new(PdfAssembler::default()),
        SessionStore::new(premium),
        prompt_log,
        settings,
    );

    println!("📄 snap2pdf — Bot is running. Press Ctrl-C to stop.");
    dispatcher::run(&mut bot, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT"),
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                }
                return;
            }
            Err(e) => tracing::warn!(error = %e, "SIGTERM handler unavailable"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
    info!("Received SIGINT");
}
