// Booking API HTTP client
//
// Wraps `reqwest::Client` with the `Api-Key` header, URL construction and
// status handling for the property-management reservations API.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::booking::models::{GuestMessage, ReservationPage, ReservationQuery};
use crate::error::{Error, preview};
use crate::transport::TransportConfig;

/// Default public endpoint of the booking API.
pub const DEFAULT_BASE_URL: &str = "https://login.smoobu.com";

/// Async client for the booking API.
///
/// Authenticates every request with a static API key; there is no session
/// to establish.
pub struct BookingClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BookingClient {
    /// Build from an API key and transport config.
    ///
    /// Injects `Api-Key` and `Cache-Control: no-cache` as default headers.
    pub fn new(
        base_url: Url,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("Api-Key", key_value);
        headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}/api/{path}`
    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch one page of reservations whose arrival falls in the window.
    ///
    /// `GET /api/reservations?arrivalFrom=..&arrivalTo=..&page=..&pageSize=..`
    pub async fn list_reservations(
        &self,
        query: &ReservationQuery,
    ) -> Result<ReservationPage, Error> {
        let url = self.api_url("reservations")?;
        let params = [
            ("arrivalFrom", query.arrival_from.format("%Y-%m-%d").to_string()),
            ("arrivalTo", query.arrival_to.format("%Y-%m-%d").to_string()),
            ("page", query.page.to_string()),
            ("pageSize", query.page_size.to_string()),
        ];
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(&params).send().await?;
        Self::handle_response(resp).await
    }

    /// Send a message to the guest of a reservation through the booking
    /// platform's messaging channel.
    ///
    /// `POST /api/reservations/{id}/messages/send-message-to-guest`
    pub async fn send_message_to_guest(
        &self,
        reservation_id: &str,
        message: &GuestMessage,
    ) -> Result<(), Error> {
        let url = self.api_url(&format!(
            "reservations/{reservation_id}/messages/send-message-to-guest"
        ))?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(message).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::status_error(status, resp).await)
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::status_error(status, resp).await);
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    async fn status_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: "booking API rejected the API key".into(),
            };
        }
        let raw = resp.text().await.unwrap_or_default();
        Error::BookingApi {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                preview(&raw).to_owned()
            },
        }
    }
}
