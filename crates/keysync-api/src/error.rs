use thiserror::Error;

/// Top-level error type for the `keysync-api` crate.
///
/// Covers every failure mode across the three remote surfaces: the booking
/// API, the lock cloud API and the SMS gateway. `keysync-core` maps these
/// into run-level diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed or a call was rejected with HTTP 401.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A lock API call was attempted before `login()` obtained a token.
    #[error("Not logged in -- call login() first")]
    NotLoggedIn,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Booking API ─────────────────────────────────────────────────
    #[error("Booking API error (HTTP {status}): {message}")]
    BookingApi { status: u16, message: String },

    // ── Lock API ────────────────────────────────────────────────────
    /// Non-2xx response, or a 200 whose `status` field is not 200.
    #[error("Lock API error (status {status}): {message}")]
    LockApi { status: u16, message: String },

    // ── SMS gateway ─────────────────────────────────────────────────
    #[error("SMS gateway error (HTTP {status}): {message}")]
    Sms { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Truncate a response body for inclusion in an error message.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
