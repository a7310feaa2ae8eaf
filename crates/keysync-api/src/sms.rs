// SMS gateway client
//
// Minimal bearer-token client for the SMS gateway used to page the operator
// about new and changed guest PINs.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::{Error, preview};
use crate::transport::TransportConfig;

/// Default public endpoint of the SMS gateway.
pub const DEFAULT_BASE_URL: &str = "https://api.smsfactor.com";

/// Body of `POST /send`.
#[derive(Debug, Clone, Serialize)]
pub struct SmsMessage<'a> {
    pub to: &'a str,
    pub text: &'a str,
    pub sender: &'a str,
}

/// Async client for the SMS gateway.
pub struct SmsClient {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl SmsClient {
    pub fn new(
        base_url: Url,
        token: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Send one text message to one recipient.
    ///
    /// `POST /send`
    pub async fn send(&self, message: &SmsMessage<'_>) -> Result<(), Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{base}/send"))?;
        debug!(to = message.to, "POST {url}");

        let resp = self
            .http
            .post(url)
            .bearer_auth(self.token.expose_secret())
            .json(message)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "SMS gateway rejected the API token".into(),
            });
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Sms {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        })
    }
}
