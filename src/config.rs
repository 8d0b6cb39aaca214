//! Release channel and credential resolution.
//!
//! Resolved once at startup and passed into the clients explicitly.
//! Lookup order for each credential:
//! 1. `<CHANNEL>_<NAME>` env var (e.g. `STAGING_GOOGLE_CLOUD_VISION_API_KEY`)
//! 2. `<NAME>` env var
//! 3. OS keychain (Vision key only)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const KEYRING_SERVICE: &str = "what-text";

pub const CHANNEL_VAR: &str = "WHAT_TEXT_RELEASE_CHANNEL";
pub const VISION_KEY_NAME: &str = "GOOGLE_CLOUD_VISION_API_KEY";
pub const BUCKET_NAME: &str = "FIREBASE_STORAGE_BUCKET";

pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com";
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://firebasestorage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration value {0}")]
    Missing(String),
    #[error("unknown release channel '{0}' (expected staging or production)")]
    UnknownChannel(String),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
    #[error("keychain error: {0}")]
    Keychain(String),
}

/// Deployment channel the credentials are selected by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseChannel {
    #[default]
    Staging,
    Production,
}

impl ReleaseChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseChannel::Staging => "staging",
            ReleaseChannel::Production => "production",
        }
    }

    fn env_prefix(&self) -> &'static str {
        match self {
            ReleaseChannel::Staging => "STAGING",
            ReleaseChannel::Production => "PRODUCTION",
        }
    }

    fn keyring_user(&self) -> String {
        format!("vision-{}", self.as_str())
    }
}

impl FromStr for ReleaseChannel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "staging" => Ok(ReleaseChannel::Staging),
            "production" | "prod" => Ok(ReleaseChannel::Production),
            other => Err(ConfigError::UnknownChannel(other.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub firebase_storage_bucket: String,
    pub google_cloud_vision_api_key: String,
}

// Keeps the API key out of debug logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("firebase_storage_bucket", &self.firebase_storage_bucket)
            .field("google_cloud_vision_api_key", &"<redacted>")
            .finish()
    }
}

/// Everything the clients and cameras need, injected at construction.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub channel: ReleaseChannel,
    pub credentials: Credentials,
    pub vision_endpoint: String,
    pub storage_endpoint: String,
    pub request_timeout: Duration,
    pub capture_dir: PathBuf,
}

impl AppConfig {
    /// Resolve from process env vars, falling back to the OS keychain.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|name| std::env::var(name).ok(), keychain_vision_key)
    }

    /// Resolve from an arbitrary lookup, without touching the keychain.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(lookup, |_| None)
    }

    fn resolve<F, K>(lookup: F, keychain: K) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
        K: Fn(ReleaseChannel) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let channel = match get(CHANNEL_VAR) {
            Some(raw) => raw.parse()?,
            None => ReleaseChannel::default(),
        };
        log::info!("[CONFIG] Release channel: {}", channel.as_str());

        let scoped = |name: &str| {
            get(&format!("{}_{}", channel.env_prefix(), name)).or_else(|| get(name))
        };

        let google_cloud_vision_api_key = match scoped(VISION_KEY_NAME) {
            Some(key) => key,
            None => {
                let key = keychain(channel)
                    .ok_or_else(|| ConfigError::Missing(VISION_KEY_NAME.to_string()))?;
                log::info!("[CONFIG] Loaded Vision key from OS keychain");
                key
            }
        };
        let firebase_storage_bucket =
            scoped(BUCKET_NAME).ok_or_else(|| ConfigError::Missing(BUCKET_NAME.to_string()))?;

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: "REQUEST_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let capture_dir = get("CAPTURE_DIR").map(PathBuf::from).unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("what-text")
                .join("captures")
        });

        Ok(Self {
            channel,
            credentials: Credentials {
                firebase_storage_bucket,
                google_cloud_vision_api_key,
            },
            vision_endpoint: get("VISION_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_VISION_ENDPOINT.to_string()),
            storage_endpoint: get("STORAGE_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_STORAGE_ENDPOINT.to_string()),
            request_timeout,
            capture_dir,
        })
    }
}

fn keychain_vision_key(channel: ReleaseChannel) -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &channel.keyring_user()).ok()?;
    entry.get_password().ok().filter(|k| !k.is_empty())
}

/// Store a Vision API key in the OS keychain for the given channel.
pub fn save_vision_api_key(channel: ReleaseChannel, api_key: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &channel.keyring_user())
        .map_err(|e| ConfigError::Keychain(e.to_string()))?;
    entry
        .set_password(api_key)
        .map_err(|e| ConfigError::Keychain(e.to_string()))?;
    log::info!("[CONFIG] Vision key saved for channel: {}", channel.as_str());
    Ok(())
}
