// ── Runtime configuration ──
//
// These types describe how to reach the three remote services and how a
// run behaves. They carry credentials and tuning but never touch disk: the
// CLI builds them from its config file and hands them in.

use std::time::Duration;

use chrono::{Days, NaiveDate};
use secrecy::SecretString;
use url::Url;

use crate::identity::IdentityMap;
use crate::model::{CorrelationTag, StayTimes};

/// Production endpoint of the booking platform.
pub const DEFAULT_BOOKING_URL: &str = keysync_api::booking::client::DEFAULT_BASE_URL;
/// Production endpoint of the lock cloud.
pub const DEFAULT_LOCK_URL: &str = keysync_api::lock::client::DEFAULT_BASE_URL;
/// Production endpoint of the SMS gateway.
pub const DEFAULT_SMS_URL: &str = keysync_api::sms::DEFAULT_BASE_URL;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification.
    DangerAcceptInvalid,
}

/// SMS gateway settings. Absent means SMS is disabled.
#[derive(Debug, Clone)]
pub struct SmsSettings {
    pub url: Url,
    pub token: SecretString,
    pub sender: String,
    pub recipients: Vec<String>,
}

/// How to reach the booking platform, the lock cloud and the SMS gateway.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub booking_url: Url,
    pub booking_api_key: SecretString,
    pub lock_url: Url,
    pub lock_username: String,
    pub lock_password: SecretString,
    pub sms: Option<SmsSettings>,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

/// Arrival window of the bookings a run considers, relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    pub lookback_days: u32,
    pub lookahead_days: u32,
}

impl BookingWindow {
    /// `(arrival_from, arrival_to)` around `today`.
    pub fn around(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let from = today
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        let to = today
            .checked_add_days(Days::new(u64::from(self.lookahead_days)))
            .unwrap_or(NaiveDate::MAX);
        (from, to)
    }
}

impl Default for BookingWindow {
    fn default() -> Self {
        Self {
            lookback_days: 1,
            lookahead_days: 90,
        }
    }
}

/// Behaviour of a sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub identity: IdentityMap,
    pub times: StayTimes,
    pub tag: CorrelationTag,
    pub window: BookingWindow,
    /// Codes whose end date is older than this many days are removed.
    pub retention_days: u32,
    /// Message guests through the booking platform after a code is created.
    pub notify_guests: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            identity: IdentityMap::default(),
            times: StayTimes::default(),
            tag: CorrelationTag::default(),
            window: BookingWindow::default(),
            retention_days: 7,
            notify_guests: true,
        }
    }
}
