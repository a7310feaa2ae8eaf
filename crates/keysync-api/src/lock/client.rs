// Lock cloud HTTP client
//
// Wraps `reqwest::Client` with bearer-token injection, URL construction and
// envelope unwrapping for the smart-lock cloud API. Endpoint methods live in
// `auth.rs` and `codes.rs` as inherent impls to keep this module focused on
// transport mechanics.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, preview};
use crate::lock::models::LockResponse;
use crate::transport::TransportConfig;

/// Default public endpoint of the lock cloud API.
pub const DEFAULT_BASE_URL: &str = "https://api.the-keys.fr";

/// Raw HTTP client for the smart-lock cloud API.
///
/// Holds the JWT obtained by [`login`](Self::login) and attaches it to every
/// request. All methods return unwrapped `data` payloads -- the envelope is
/// stripped before the caller sees it.
pub struct LockClient {
    http: reqwest::Client,
    base_url: Url,
    /// Bearer token captured from `login_check`. Assumed valid for a run.
    token: RwLock<Option<SecretString>>,
}

impl LockClient {
    /// Create a new lock client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a lock client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: RwLock::new(None),
        }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a session token is currently held.
    pub fn is_logged_in(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    // ── Token management ─────────────────────────────────────────────

    pub(crate) fn set_token(&self, token: SecretString) {
        debug!("storing session token");
        *self.token.write().expect("token lock poisoned") = Some(token);
    }

    fn authorize(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let guard = self.token.read().expect("token lock poisoned");
        match guard.as_ref() {
            Some(token) => Ok(builder.bearer_auth(token.expose_secret())),
            None => Err(Error::NotLoggedIn),
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL: `{base}/{path}`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated GET and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned + Default>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.authorize(self.http.get(url))?.send().await?;
        Self::parse_envelope(resp).await
    }

    /// Send an authenticated form POST and unwrap the envelope.
    pub(crate) async fn post_form<T: DeserializeOwned + Default>(
        &self,
        url: Url,
        form: &[(&'static str, String)],
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .authorize(self.http.post(url).form(form))?
            .send()
            .await?;
        Self::parse_envelope(resp).await
    }

    /// Send an authenticated bodiless POST and unwrap the envelope.
    pub(crate) async fn post_empty<T: DeserializeOwned + Default>(
        &self,
        url: Url,
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self.authorize(self.http.post(url))?.send().await?;
        Self::parse_envelope(resp).await
    }

    /// Parse the `{ status, data }` envelope, returning `data` on success.
    ///
    /// A missing `data` yields `T::default()`; the mutation endpoints omit it
    /// on some firmware revisions.
    async fn parse_envelope<T: DeserializeOwned + Default>(
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session token expired or invalid".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::LockApi {
                status: status.as_u16(),
                message: format!("HTTP {status}: {}", preview(&body)),
            });
        }

        let body = resp.text().await?;
        trace!(len = body.len(), "lock API response body");

        let envelope: LockResponse<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        match envelope.status {
            None | Some(200) => Ok(envelope.data.unwrap_or_default()),
            Some(code) => Err(Error::LockApi {
                status: code,
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("status={code}")),
            }),
        }
    }
}
