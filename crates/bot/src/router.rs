//! Runs each inbound event through the session state machine and
//! executes the resulting effects.
//!
//! Effects run strictly in order and the first failure aborts the rest.
//! The state machine orders conversions as
//! `BuildDocument → CommitConversion → DeleteFiles`, so a failed assembly
//! or delivery leaves the queue and counters exactly as they were.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use snap2pdf_core::channel::{Channel, ChatId, Keyboard, TextFormat};
use snap2pdf_core::document::DocumentAssembler;
use snap2pdf_core::error::{Result, StorageError};
use snap2pdf_core::event::{FileRef, Inbound, ReplyTarget};
use snap2pdf_core::quota::Limits;
use snap2pdf_core::session::{Effect, Notice, SessionState, transition};
use snap2pdf_core::user::{PendingImage, UserId};
use snap2pdf_ledger::PromptLog;
use tracing::{debug, info, warn};

use crate::messages::{self, PremiumOffer};
use crate::store::SessionStore;

/// Static knobs for the router.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub limits: Limits,
    /// Downloads and generated documents land here
    pub images_dir: PathBuf,
    /// Name the user sees on the delivered file
    pub document_name: String,
    pub offer: PremiumOffer,
    /// Payment QR sent with the offer when present
    pub qr_image: Option<PathBuf>,
}

/// The bot service: owns all per-user state.
pub struct Bot {
    channel: Arc<dyn Channel>,
    assembler: Arc<dyn DocumentAssembler>,
    store: SessionStore,
    prompt_log: PromptLog,
    settings: BotSettings,
}

impl Bot {
    pub fn new(
        channel: Arc<dyn Channel>,
        assembler: Arc<dyn DocumentAssembler>,
        store: SessionStore,
        prompt_log: PromptLog,
        settings: BotSettings,
    ) -> Self {
        Self {
            channel,
            assembler,
            store,
            prompt_log,
            settings,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn prompt_log(&self) -> &PromptLog {
        &self.prompt_log
    }

    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    /// Handle one inbound event to completion.
    pub async fn handle(&mut self, inbound: Inbound) -> Result<()> {
        if let ReplyTarget::Callback { query_id, .. } = &inbound.reply {
            if let Err(e) = self.channel.answer_callback(query_id).await {
                warn!(error = %e, "Failed to acknowledge button press");
            }
        }

        let user = self.store.get_or_create(inbound.user_id);
        let previous = user.state;
        let plan = transition(user, &self.settings.limits, &inbound.event);
        debug!(
            user_id = %inbound.user_id,
            sender = inbound.sender_name.as_deref().unwrap_or("-"),
            event = ?inbound.event,
            from = ?previous,
            to = ?plan.next,
            effects = plan.effects.len(),
            "Transition"
        );

        // Once the record has changed, a later failure cannot roll it back
        let mut applied = false;
        for effect in plan.effects {
            let mutates = effect.mutates();
            if let Err(e) = self.apply(&inbound, effect).await {
                let state = if applied { plan.next } else { previous };
                self.store.set_state(inbound.user_id, state);
                return Err(e);
            }
            applied |= mutates;
        }

        self.store.set_state(inbound.user_id, plan.next);
        Ok(())
    }

    async fn apply(&mut self, inbound: &Inbound, effect: Effect) -> Result<()> {
        let user_id = inbound.user_id;
        match effect {
            Effect::ShowMenu => {
                let text = messages::welcome(user_id, &self.settings.limits);
                self.channel
                    .send_text(inbound.chat_id, &text, TextFormat::Markdown, Some(&messages::menu()))
                    .await?;
            }
            Effect::Notify(notice) => {
                let text = messages::notice(notice, &self.settings.limits);
                match notice {
                    // Goes below the delivered document, not into the menu
                    Notice::Converted { .. } => {
                        self.channel
                            .send_text(inbound.chat_id, &text, TextFormat::Plain, None)
                            .await?;
                    }
                    _ => self.reply(inbound, &text).await?,
                }
            }
            Effect::StoreImage(file) => self.store_image(user_id, &file).await?,
            Effect::BuildDocument { images } => {
                self.store.set_state(user_id, SessionState::Converting);
                self.build_and_deliver(user_id, inbound.chat_id, &images).await?;
            }
            Effect::CommitConversion => {
                let waited_secs = self
                    .store
                    .get(user_id)
                    .and_then(|u| u.pending.first())
                    .map_or(0, |oldest| (Utc::now() - oldest.received_at).num_seconds());
                let converted = self.store.commit_conversion(user_id);
                info!(
                    user_id = %user_id,
                    images = converted.len(),
                    waited_secs,
                    "Conversion committed"
                );
            }
            Effect::ClearPending => {
                let cleared = self.store.clear(user_id);
                debug!(user_id = %user_id, images = cleared.len(), "Pending images cleared");
            }
            Effect::DeleteFiles(paths) => delete_files(&paths).await?,
            Effect::RecordUpgradePrompt => {
                // Bookkeeping only; the offer is still shown if this fails
                match self.prompt_log.record(user_id) {
                    Ok(true) => info!(user_id = %user_id, "First upgrade prompt"),
                    Ok(false) => {}
                    Err(e) => warn!(user_id = %user_id, error = %e, "Upgrade-prompt log not updated"),
                }
            }
            Effect::OfferPremium => self.offer_premium(user_id, inbound.chat_id).await?,
        }
        Ok(())
    }

    /// Button presses edit the menu message; everything else gets a new one.
    async fn reply(&self, inbound: &Inbound, text: &str) -> Result<()> {
        if let ReplyTarget::Callback {
            message: Some(message),
            ..
        } = &inbound.reply
        {
            match self.channel.edit_text(message, text, TextFormat::Plain).await {
                Ok(()) => return Ok(()),
                // e.g. "message is not modified" when a button is pressed twice
                Err(e) => debug!(error = %e, "Edit failed, sending a new message"),
            }
        }
        self.channel
            .send_text(inbound.chat_id, text, TextFormat::Plain, None)
            .await?;
        Ok(())
    }

    async fn store_image(&mut self, user_id: UserId, file: &FileRef) -> Result<()> {
        let dir = &self.settings.images_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let dest = dir.join(format!(
            "{user_id}_{}.{}",
            uuid::Uuid::new_v4().simple(),
            file.extension
        ));
        let bytes = self.channel.download(file, &dest).await?;
        self.store.append_image(user_id, PendingImage::new(&dest));
        info!(user_id = %user_id, path = %dest.display(), bytes, "Image saved");
        Ok(())
    }

    async fn build_and_deliver(&self, user_id: UserId, chat_id: ChatId, images: &[PathBuf]) -> Result<()> {
        let output = self.settings.images_dir.join(format!("{user_id}_output.pdf"));
        info!(
            user_id = %user_id,
            images = images.len(),
            assembler = self.assembler.name(),
            "Assembling document"
        );

        let delivered = async {
            self.assembler.assemble(images, &output).await?;
            self.channel
                .send_document(chat_id, &output, &self.settings.document_name)
                .await?;
            Ok::<_, snap2pdf_core::Error>(())
        }
        .await;

        // The output never outlives this step, delivered or not
        if let Err(e) = remove_if_exists(&output).await {
            warn!(path = %output.display(), error = %e, "Failed to remove generated document");
        }
        delivered
    }

    async fn offer_premium(&self, user_id: UserId, chat_id: ChatId) -> Result<()> {
        let caption = messages::premium_caption(user_id, &self.settings.offer);
        let keyboard: Keyboard = messages::premium_keyboard(&self.settings.offer);

        if let Some(qr) = self.qr_image().await {
            self.channel
                .send_photo(chat_id, &qr, &caption, TextFormat::Markdown, Some(&keyboard))
                .await?;
        } else {
            self.channel
                .send_text(chat_id, &caption, TextFormat::Markdown, Some(&keyboard))
                .await?;
        }
        Ok(())
    }

    async fn qr_image(&self) -> Option<PathBuf> {
        let path = self.settings.qr_image.as_ref()?;
        match tokio::fs::try_exists(path).await {
            Ok(true) => Some(path.clone()),
            _ => None,
        }
    }
}

/// Remove a file; a file that is already gone counts as removed.
async fn remove_if_exists(path: &Path) -> std::result::Result<(), StorageError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StorageError::Delete {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Delete every path, then report the first failure if any.
async fn delete_files(paths: &[PathBuf]) -> Result<()> {
    let mut first_err = None;
    for path in paths {
        if let Err(e) = remove_if_exists(path).await {
            warn!(path = %path.display(), error = %e, "Failed to delete image");
            first_err.get_or_insert(e);
        }
    }
    match first_err {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
