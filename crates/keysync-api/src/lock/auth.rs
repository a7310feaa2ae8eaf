// Lock cloud authentication
//
// Form login against `login_check`. The returned JWT is held by the client
// and sent as a bearer token on every later request.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{Error, preview};
use crate::lock::client::LockClient;
use crate::lock::models::LoginResponse;

impl LockClient {
    /// Authenticate with username/password and store the session token.
    ///
    /// `POST /api/login_check` with form fields `_username` / `_password`.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.url("api/login_check")?;
        debug!("logging in at {}", url);

        let form = [
            ("_username", username),
            ("_password", password.expose_secret()),
        ];
        let resp = self.http().post(url).form(&form).send().await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let parsed: LoginResponse =
            serde_json::from_str(&body).map_err(|e| Error::Authentication {
                message: format!("unexpected login response: {e}"),
            })?;
        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: "login response carried no token".into(),
            })?;

        self.set_token(SecretString::from(token));
        debug!("login successful");
        Ok(())
    }
}
