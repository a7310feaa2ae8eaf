//! Configuration for keysync.
//!
//! TOML file + `KEYSYNC_` environment overlay, credential resolution
//! (env var, system keyring, plaintext) and translation to the runtime
//! types of `keysync_core`: [`ConnectionConfig`] and [`SyncConfig`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use keysync_core::config::{DEFAULT_BOOKING_URL, DEFAULT_LOCK_URL, DEFAULT_SMS_URL};
use keysync_core::{
    AccessoireId, BookingWindow, ConnectionConfig, CorrelationTag, IdentityMap, LockId,
    SmsSettings, StayTimes, SyncConfig, TlsVerification,
};

/// Service name under which secrets are stored in the system keyring.
pub const KEYRING_SERVICE: &str = "keysync";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {secret} configured (set {hint})")]
    NoCredentials { secret: String, hint: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub booking: BookingSection,

    #[serde(default)]
    pub lock: LockSection,

    /// SMS notifications; absent disables them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<SmsSection>,

    #[serde(default)]
    pub sync: SyncSection,

    /// Booking apartment id → lock id.
    #[serde(default)]
    pub apartment_locks: BTreeMap<String, IdValue>,

    /// Lock id → keypad accessory id.
    #[serde(default)]
    pub lock_accessoires: BTreeMap<String, IdValue>,

    /// Lock id → digits typed before the PIN.
    #[serde(default)]
    pub pin_prefixes: BTreeMap<String, IdValue>,
}

/// An id written either as a TOML integer or a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IdValue {
    Number(u64),
    Text(String),
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BookingSection {
    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LockSection {
    pub username: Option<String>,
    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,
    pub password_env: Option<String>,
    pub base_url: Option<String>,
    #[serde(default)]
    pub insecure: bool,
    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SmsSection {
    pub api_token: Option<String>,
    pub api_token_env: Option<String>,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default = "default_sender")]
    pub sender: String,
    pub base_url: Option<String>,
}

fn default_sender() -> String {
    "keysync".into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SyncSection {
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,
    /// `HH:MM`
    #[serde(default = "default_check_in")]
    pub check_in: String,
    /// `HH:MM`
    #[serde(default = "default_check_out")]
    pub check_out: String,
    #[serde(default = "default_true")]
    pub notify_guests: bool,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            tag_prefix: default_tag_prefix(),
            retention_days: default_retention_days(),
            lookback_days: default_lookback_days(),
            lookahead_days: default_lookahead_days(),
            check_in: default_check_in(),
            check_out: default_check_out(),
            notify_guests: true,
            timeout: default_timeout(),
        }
    }
}

fn default_tag_prefix() -> String {
    CorrelationTag::DEFAULT_PREFIX.into()
}
fn default_retention_days() -> u32 {
    7
}
fn default_lookback_days() -> u32 {
    1
}
fn default_lookahead_days() -> u32 {
    90
}
fn default_check_in() -> String {
    "15:00".into()
}
fn default_check_out() -> String {
    "12:00".into()
}
fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "keysync", "keysync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("keysync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path` (a missing file is fine) and the
/// `KEYSYNC_` environment. Nested keys use `__`:
/// `KEYSYNC_LOCK__USERNAME` sets `lock.username`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("KEYSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a secret: named env var → system keyring → plaintext.
pub fn resolve_secret(
    secret: &str,
    env_name: Option<&str>,
    keyring_user: &str,
    plaintext: Option<&str>,
) -> Result<SecretString, ConfigError> {
    // 1. Named environment variable
    if let Some(name) = env_name {
        if let Ok(val) = std::env::var(name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, keyring_user) {
        if let Ok(val) = entry.get_password() {
            return Ok(SecretString::from(val));
        }
    }

    // 3. Plaintext in config
    if let Some(val) = plaintext.filter(|v| !v.is_empty()) {
        return Ok(SecretString::from(val.to_owned()));
    }

    Err(ConfigError::NoCredentials {
        secret: secret.into(),
        hint: match env_name {
            Some(name) => format!("${name}, keyring entry '{keyring_user}' or the config file"),
            None => format!("keyring entry '{keyring_user}' or the config file"),
        },
    })
}

// ── Translation ─────────────────────────────────────────────────────

fn parse_url(field: &str, raw: Option<&str>, default: &str) -> Result<Url, ConfigError> {
    let raw = raw.unwrap_or(default);
    raw.parse()
        .map_err(|e| invalid(field, format!("invalid URL '{raw}': {e}")))
}

fn parse_time(field: &str, raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| invalid(field, format!("expected HH:MM, got '{raw}'")))
}

fn parse_lock(field: &str, raw: &str) -> Result<LockId, ConfigError> {
    raw.parse()
        .map_err(|_| invalid(field, format!("lock id must be numeric, got '{raw}'")))
}

impl Config {
    /// Check everything that can be checked without secrets or network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sync_config().map(|_| ())
    }

    /// Engine settings: identity tables, times, tag, window and retention.
    pub fn sync_config(&self) -> Result<SyncConfig, ConfigError> {
        let sync = &self.sync;
        if sync.tag_prefix.is_empty() || sync.tag_prefix.contains('#') {
            return Err(invalid(
                "sync.tag_prefix",
                "must be non-empty and must not contain '#'",
            ));
        }

        let times = StayTimes {
            check_in: parse_time("sync.check_in", &sync.check_in)?,
            check_out: parse_time("sync.check_out", &sync.check_out)?,
        };

        let apartment_locks = self
            .apartment_locks
            .iter()
            .map(|(apartment, lock)| {
                let lock = parse_lock(&format!("apartment_locks.{apartment}"), &lock.to_string())?;
                Ok((apartment.clone(), lock))
            })
            .collect::<Result<HashMap<_, _>, ConfigError>>()?;

        let lock_accessoires = self
            .lock_accessoires
            .iter()
            .map(|(lock, accessoire)| {
                let field = format!("lock_accessoires.{lock}");
                let lock = parse_lock(&field, lock)?;
                let accessoire = accessoire.to_string();
                if accessoire.trim().is_empty() {
                    return Err(invalid(field, "accessoire id is empty"));
                }
                Ok((lock, AccessoireId::new(accessoire)))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        let pin_prefixes = self
            .pin_prefixes
            .iter()
            .map(|(lock, prefix)| {
                let field = format!("pin_prefixes.{lock}");
                let lock = parse_lock(&field, lock)?;
                let prefix = prefix.to_string();
                if !prefix.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid(field, format!("prefix must be digits, got '{prefix}'")));
                }
                Ok((lock, prefix))
            })
            .collect::<Result<HashMap<_, _>, ConfigError>>()?;

        Ok(SyncConfig {
            identity: IdentityMap::new(apartment_locks, lock_accessoires, pin_prefixes),
            times,
            tag: CorrelationTag::new(sync.tag_prefix.clone()),
            window: BookingWindow {
                lookback_days: sync.lookback_days,
                lookahead_days: sync.lookahead_days,
            },
            retention_days: sync.retention_days,
            notify_guests: sync.notify_guests,
        })
    }

    /// Endpoints and resolved credentials for the three services.
    pub fn connection_config(&self) -> Result<ConnectionConfig, ConfigError> {
        let booking_url = parse_url(
            "booking.base_url",
            self.booking.base_url.as_deref(),
            DEFAULT_BOOKING_URL,
        )?;
        let booking_api_key = resolve_secret(
            "booking API key",
            self.booking.api_key_env.as_deref(),
            "booking/api-key",
            self.booking.api_key.as_deref(),
        )?;

        let lock_url = parse_url(
            "lock.base_url",
            self.lock.base_url.as_deref(),
            DEFAULT_LOCK_URL,
        )?;
        let lock_username = self
            .lock
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ConfigError::NoCredentials {
                secret: "lock username".into(),
                hint: "lock.username or KEYSYNC_LOCK__USERNAME".into(),
            })?;
        let lock_password = resolve_secret(
            "lock password",
            self.lock.password_env.as_deref(),
            "lock/password",
            self.lock.password.as_deref(),
        )?;

        let sms = self.sms.as_ref().map(sms_settings).transpose()?;

        let tls = if self.lock.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.lock.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        Ok(ConnectionConfig {
            booking_url,
            booking_api_key,
            lock_url,
            lock_username,
            lock_password,
            sms,
            tls,
            timeout: Duration::from_secs(self.sync.timeout),
        })
    }
}

fn sms_settings(section: &SmsSection) -> Result<SmsSettings, ConfigError> {
    if section.recipients.is_empty() {
        return Err(invalid("sms.recipients", "at least one recipient is required"));
    }
    let url = parse_url("sms.base_url", section.base_url.as_deref(), DEFAULT_SMS_URL)?;
    let token = resolve_secret(
        "SMS API token",
        section.api_token_env.as_deref(),
        "sms/api-token",
        section.api_token.as_deref(),
    )?;
    Ok(SmsSettings {
        url,
        token,
        sender: section.sender.clone(),
        recipients: section.recipients.clone(),
    })
}
