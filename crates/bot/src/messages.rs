//! Reply texts and keyboards.

use snap2pdf_core::channel::{Button, Keyboard};
use snap2pdf_core::event::Action;
use snap2pdf_core::quota::Limits;
use snap2pdf_core::session::Notice;
use snap2pdf_core::user::UserId;

/// Upgrade details shown by the premium prompt.
#[derive(Debug, Clone)]
pub struct PremiumOffer {
    pub price: String,
    pub payment_id: String,
    pub admin_url: String,
}

pub fn welcome(user_id: UserId, limits: &Limits) -> String {
    format!(
        "👋 Welcome to Image2PDF Bot!\n\n\
         📷 Free users: *{} images* & *{} PDFs* limit.\n\
         ✨ Premium: Unlimited access.\n\n\
         🆔 Your ID: `{user_id}`",
        limits.images, limits.documents
    )
}

pub fn menu() -> Keyboard {
    Keyboard::column([
        Button::action("🖼️ Send Images", Action::Send),
        Button::action("📄 Create PDF", Action::Convert),
        Button::action("🗑️ Clear All", Action::Clear),
        Button::action("💳 Get Premium", Action::GetPremium),
    ])
}

pub fn premium_caption(user_id: UserId, offer: &PremiumOffer) -> String {
    format!(
        "💳 *Upgrade to Premium ({})*\n\n\
         Pay to UPI: `{}`\n\
         🆔 Your ID: `{user_id}`\n\
         📩 After payment, send screenshot to admin.",
        offer.price, offer.payment_id
    )
}

pub fn premium_keyboard(offer: &PremiumOffer) -> Keyboard {
    Keyboard::column([Button::url("📤 Send to Admin", offer.admin_url.clone())])
}

pub fn notice(notice: Notice, limits: &Limits) -> String {
    match notice {
        Notice::Help => "📖 How it works:\n\
                         1. Send me photos (or images as files).\n\
                         2. Tap 📄 Create PDF or send /convert.\n\n\
                         Commands: /start /convert /clear /premium /help"
            .to_string(),
        Notice::SendImages => "📤 Send your images now.".to_string(),
        Notice::ImageSaved => "🖼 Image saved!".to_string(),
        Notice::ImageLimitReached => {
            "🚫 Image limit reached. Upgrade to Premium for unlimited images.".to_string()
        }
        Notice::NoImages => "❗ No images found.".to_string(),
        Notice::DocumentLimitReached => "🚫 Free PDF limit reached. Upgrade to Premium.".to_string(),
        Notice::Converted {
            documents_used: Some(used),
        } => format!("✅ PDF created!\nUsed: {used} of {}.", limits.documents),
        Notice::Converted {
            documents_used: None,
        } => "✅ PDF created!\n✨ Premium: unlimited PDFs.".to_string(),
        Notice::Cleared => "🗑️ All images cleared.".to_string(),
        Notice::Busy => "⏳ Still working on your previous PDF.".to_string(),
        Notice::UnknownInput => {
            "Send me images, then tap 📄 Create PDF. Use /start to open the menu.".to_string()
        }
    }
}
