//! Pulls inbound events off the channel and feeds them to the router.
//!
//! Events are handled one at a time in arrival order. Nothing a single
//! event does can stop the loop: handler errors and transport errors are
//! logged here and the next event is processed.

use std::future::Future;

use tracing::{error, info, warn};

use crate::router::Bot;

/// Run until the channel closes or `shutdown` resolves.
pub async fn run<F>(bot: &mut Bot, shutdown: F) -> snap2pdf_core::Result<()>
where
    F: Future<Output = ()>,
{
    let channel = bot.channel().clone();
    let mut inbound = channel.start().await?;
    info!(channel = channel.name(), "Dispatcher started");

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            next = inbound.recv() => match next {
                Some(Ok(event)) => {
                    let user_id = event.user_id;
                    if let Err(e) = bot.handle(event).await {
                        error!(user_id = %user_id, error = %e, "Failed to handle event");
                    }
                }
                Some(Err(e)) => warn!(error = %e, "Channel error"),
                None => {
                    warn!("Channel closed");
                    break;
                }
            }
        }
    }

    channel.stop().await?;
    info!(users = bot.store().len(), "Dispatcher stopped");
    Ok(())
}
