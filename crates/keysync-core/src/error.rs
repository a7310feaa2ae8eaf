// ── Core error types ──
//
// Run-level errors from keysync-core. Consumers never see HTTP status codes
// or JSON parse failures directly: the `From<keysync_api::Error>` impl folds
// transport-layer errors into the categories the engine reasons about.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication (fatal) ───────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Per-item ─────────────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    /// No lock or keypad is configured for a booking's apartment.
    #[error("No mapping: {message}")]
    MissingMapping { message: String },

    /// A booking lacks a usable date range.
    #[error("Invalid booking {booking_id}: {reason}")]
    InvalidData { booking_id: String, reason: String },

    /// A remote call failed; the run goes on with the next item.
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP or envelope status (if applicable).
        status: Option<u16>,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    // ── Configuration (fatal) ────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Errors that end the run instead of being counted against one item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::Config { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<keysync_api::Error> for CoreError {
    fn from(err: keysync_api::Error) -> Self {
        match err {
            keysync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            keysync_api::Error::NotLoggedIn => CoreError::AuthenticationFailed {
                message: "lock API called before login".into(),
            },
            keysync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            keysync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            keysync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            keysync_api::Error::BookingApi { status, message }
            | keysync_api::Error::LockApi { status, message }
            | keysync_api::Error::Sms { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            keysync_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("unexpected response: {message}"),
                status: None,
            },
        }
    }
}
