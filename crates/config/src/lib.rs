//! Configuration loading, validation, and management for snap2pdf.
//!
//! Loads configuration from `~/.snap2pdf/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use snap2pdf_core::quota::Limits;
use std::path::{Path, PathBuf};

/// Environment variables consulted for the bot token, highest priority first.
pub const TOKEN_ENV_VARS: [&str; 2] = ["SNAP2PDF_BOT_TOKEN", "BOT_TOKEN"];

/// Environment variable overriding `storage.data_dir`.
pub const DATA_DIR_ENV_VAR: &str = "SNAP2PDF_DATA_DIR";

/// Telegram's server-side cap on long-poll duration.
const MAX_POLL_TIMEOUT_SECS: u64 = 50;

/// The root configuration structure.
///
/// Maps directly to `config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bot access token (usually supplied through `BOT_TOKEN`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Free-tier quotas
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Upgrade path shown to free users
    #[serde(default)]
    pub premium: PremiumConfig,

    /// Where files live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Bot API connection settings
    #[serde(default)]
    pub telegram: TelegramSettings,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bot_token", &redact(&self.bot_token))
            .field("limits", &self.limits)
            .field("premium", &self.premium)
            .field("storage", &self.storage)
            .field("telegram", &self.telegram)
            .finish()
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_limit")]
    pub images: u32,

    #[serde(default = "default_limit")]
    pub documents: u32,
}

fn default_limit() -> u32 {
    7
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            images: default_limit(),
            documents: default_limit(),
        }
    }
}

impl From<&LimitsConfig> for Limits {
    fn from(cfg: &LimitsConfig) -> Self {
        Limits {
            images: cfg.images,
            documents: cfg.documents,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumConfig {
    /// Payment identifier shown in the upgrade prompt
    #[serde(default = "default_payment_id")]
    pub payment_id: String,

    #[serde(default = "default_price")]
    pub price: String,

    /// Telegram username (without `@`) that receives payment screenshots
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// Payment QR code sent with the prompt when the file exists
    #[serde(default = "default_qr_image")]
    pub qr_image: PathBuf,
}

fn default_payment_id() -> String {
    "work.piyush006@fam".into()
}
fn default_price() -> String {
    "₹29".into()
}
fn default_admin_username() -> String {
    "Image2pdfadmin".into()
}
fn default_qr_image() -> PathBuf {
    PathBuf::from("Qr.png")
}

impl Default for PremiumConfig {
    fn default() -> Self {
        Self {
            payment_id: default_payment_id(),
            price: default_price(),
            admin_username: default_admin_username(),
            qr_image: default_qr_image(),
        }
    }
}

impl PremiumConfig {
    pub fn admin_url(&self) -> String {
        format!("https://t.me/{}", self.admin_username.trim_start_matches('@'))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory; relative paths below resolve against it
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// One premium user id per line
    #[serde(default = "default_premium_file")]
    pub premium_file: PathBuf,

    /// Users who were shown the upgrade prompt
    #[serde(default = "default_prompt_log_file")]
    pub prompt_log_file: PathBuf,

    /// Downloaded images and generated documents
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// File name the user sees on the delivered document
    #[serde(default = "default_document_name")]
    pub document_name: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_premium_file() -> PathBuf {
    PathBuf::from("user_premium.txt")
}
fn default_prompt_log_file() -> PathBuf {
    PathBuf::from("user.txt")
}
fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}
fn default_document_name() -> String {
    "Image2PDFMaster.pdf".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            premium_file: default_premium_file(),
            prompt_log_file: default_prompt_log_file(),
            images_dir: default_images_dir(),
            document_name: default_document_name(),
        }
    }
}

impl StorageConfig {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn premium_path(&self) -> PathBuf {
        self.resolve(&self.premium_file)
    }

    pub fn prompt_log_path(&self) -> PathBuf {
        self.resolve(&self.prompt_log_file)
    }

    pub fn images_path(&self) -> PathBuf {
        self.resolve(&self.images_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Long-poll duration for `getUpdates`
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.telegram.org".into()
}
fn default_poll_timeout() -> u64 {
    30
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.snap2pdf/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment variable overrides:
    /// - `SNAP2PDF_BOT_TOKEN` / `BOT_TOKEN` for the token
    /// - `SNAP2PDF_DATA_DIR` for the data directory
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        // Environment beats the file for the token
        if let Some(token) = TOKEN_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|t| !t.trim().is_empty()))
        {
            config.bot_token = Some(token);
        }

        if let Ok(dir) = std::env::var(DATA_DIR_ENV_VAR) {
            config.storage.data_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".snap2pdf")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.images == 0 || self.limits.documents == 0 {
            return Err(ConfigError::ValidationError(
                "limits.images and limits.documents must be greater than 0".into(),
            ));
        }

        if self.storage.document_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.document_name must not be empty".into(),
            ));
        }

        if self.telegram.poll_timeout_secs > MAX_POLL_TIMEOUT_SECS {
            return Err(ConfigError::ValidationError(format!(
                "telegram.poll_timeout_secs must be at most {MAX_POLL_TIMEOUT_SECS}"
            )));
        }

        Ok(())
    }

    /// The token, or an error explaining how to provide one.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)
    }

    pub fn limits(&self) -> Limits {
        Limits::from(&self.limits)
    }

    /// The payment QR image, resolved against the data directory.
    pub fn qr_image_path(&self) -> PathBuf {
        self.storage.resolve(&self.premium.qr_image)
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            limits: LimitsConfig::default(),
            premium: PremiumConfig::default(),
            storage: StorageConfig::default(),
            telegram: TelegramSettings::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No bot token configured; set BOT_TOKEN or bot_token in config.toml")]
    MissingToken,
}
