//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use keysync_config::ConfigError;
use keysync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(keysync::connection_failed),
        help(
            "Check network access and the base_url settings.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(keysync::timeout),
        help("Increase the timeout with --timeout or sync.timeout.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(keysync::auth_failed),
        help(
            "Verify the lock username/password and the booking API key.\n\
             Run: keysync config show"
        )
    )]
    AuthFailed { message: String },

    #[error("No {secret} configured")]
    #[diagnostic(code(keysync::no_credentials), help("Set {hint}."))]
    NoCredentials { secret: String, hint: String },

    // ── Run outcome ──────────────────────────────────────────────────
    #[error("{failed} item(s) failed during the run")]
    #[diagnostic(
        code(keysync::items_failed),
        help("Re-run with -v for details; the next run retries them.")
    )]
    ItemsFailed { failed: usize },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(keysync::api_error))]
    Api { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(keysync::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(keysync::no_config),
        help("Create it, or drop --config to use the default location.")
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(keysync::config))]
    Config(Box<figment::Error>),

    #[error("Internal error: {0}")]
    Internal(String),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Validation { .. } | Self::NoConfig { .. } | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Api { message, status } => CliError::Api {
                message: match status {
                    Some(code) => format!("{message} (status {code})"),
                    None => message,
                },
            },
            CoreError::MissingMapping { message } => CliError::Validation {
                field: "mapping".into(),
                reason: message,
            },
            CoreError::InvalidData { booking_id, reason } => CliError::Api {
                message: format!("booking {booking_id}: {reason}"),
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { secret, hint } => CliError::NoCredentials { secret, hint },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::Internal(e.to_string()),
        }
    }
}
