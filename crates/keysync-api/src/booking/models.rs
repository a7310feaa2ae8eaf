// Booking API response types
//
// Models for the property-management reservations endpoint. Fields use
// `#[serde(default)]` liberally because channel managers leave most of them
// out on blocked periods and imported bookings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An identifier the booking API emits either as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One page of `GET /api/reservations`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationPage {
    #[serde(default)]
    pub bookings: Vec<Reservation>,
    /// Total number of reservations matching the query across all pages.
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub page_count: u64,
    #[serde(default)]
    pub page: u64,
}

/// A reservation as returned by the booking API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: RemoteId,
    #[serde(default, rename = "guest-name")]
    pub guest_name: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub arrival: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub departure: Option<String>,
    #[serde(default)]
    pub apartment: Option<ApartmentRef>,
    #[serde(default)]
    pub status: Option<String>,
    /// `reservation`, `modification of booking` or `cancellation`.
    #[serde(default, rename = "type")]
    pub reservation_type: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, rename = "is-blocked-booking")]
    pub is_blocked_booking: bool,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The apartment a reservation belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApartmentRef {
    pub id: RemoteId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Query parameters for one reservations page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationQuery {
    pub arrival_from: chrono::NaiveDate,
    pub arrival_to: chrono::NaiveDate,
    pub page: u32,
    pub page_size: u32,
}

/// Body of `POST /api/reservations/{id}/messages/send-message-to-guest`.
#[derive(Debug, Clone, Serialize)]
pub struct GuestMessage {
    pub subject: String,
    #[serde(rename = "messageBody")]
    pub message_body: String,
}
