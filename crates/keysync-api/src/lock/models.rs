// Lock cloud API types
//
// The lock cloud speaks French field names (`nom`, `date_debut`, ...) and is
// loose about scalar types: PINs come back as strings or numbers and the
// active flag as a bool or 0/1. The deserializers below accept both.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard lock API envelope: `{ "status": 200, "data": {...} }`.
///
/// `status` mirrors the HTTP status on success and carries the real error
/// code when the API answers HTTP 200 with a failure inside.
#[derive(Debug, Deserialize)]
pub struct LockResponse<T> {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/login_check` response.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Payload of the code listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CodeListing {
    #[serde(default)]
    pub partages_accessoire: Vec<RemoteCode>,
}

// ── Access code ──────────────────────────────────────────────────────

/// A keypad access code ("partage accessoire") as stored by the lock cloud.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCode {
    pub id: u64,
    #[serde(default, rename = "nom", deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    /// `YYYY-MM-DD`, sometimes with a time suffix.
    #[serde(default, rename = "date_debut", deserialize_with = "lenient_string")]
    pub date_start: Option<String>,
    #[serde(default, rename = "date_fin", deserialize_with = "lenient_string")]
    pub date_end: Option<String>,
    #[serde(default, rename = "actif", deserialize_with = "lenient_flag")]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    /// Catch-all for undocumented fields (`heure_debut`, `accessoire`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `data` of a successful create call.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedCode {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
}

// ── Request form ─────────────────────────────────────────────────────

/// Hour and minute of a check-in or check-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

/// The full mutable field set of an access code.
///
/// Create and update share this form. The update endpoint resets any field
/// that is absent from the request, so it must always be sent whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeForm {
    pub name: String,
    pub code: String,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub time_start: TimeOfDay,
    pub time_end: TimeOfDay,
    pub active: bool,
    pub description: String,
}

impl CodeForm {
    /// Encode as `partage_accessoire[...]` form fields.
    ///
    /// `notification_enabled` is deliberately absent: sending it at all turns
    /// the lock owner's per-code e-mail notifications on.
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("partage_accessoire[nom]", self.name.clone()),
            (
                "partage_accessoire[actif]",
                if self.active { "1" } else { "0" }.to_owned(),
            ),
            (
                "partage_accessoire[date_debut]",
                self.date_start.format("%Y-%m-%d").to_string(),
            ),
            (
                "partage_accessoire[date_fin]",
                self.date_end.format("%Y-%m-%d").to_string(),
            ),
            (
                "partage_accessoire[heure_debut][hour]",
                self.time_start.hour.to_string(),
            ),
            (
                "partage_accessoire[heure_debut][minute]",
                self.time_start.minute.to_string(),
            ),
            (
                "partage_accessoire[heure_fin][hour]",
                self.time_end.hour.to_string(),
            ),
            (
                "partage_accessoire[heure_fin][minute]",
                self.time_end.minute.to_string(),
            ),
            ("partage_accessoire[code]", self.code.clone()),
            ("partage_accessoire[description]", self.description.clone()),
        ]
    }
}

// ── Lenient scalars ──────────────────────────────────────────────────

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_i64().is_some_and(|v| v != 0),
        serde_json::Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    })
}
