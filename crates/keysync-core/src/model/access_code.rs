// ── Access codes ──
//
// An access code is a time-bounded PIN on a lock's keypad. Codes created by
// keysync carry a correlation tag (`<prefix>#<booking id>`) in their
// description so later runs can find them again without local state.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use super::{BookingId, CodeId, LockId, Stay};

/// A code as currently stored on the lock cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessCode {
    pub id: CodeId,
    pub lock_id: LockId,
    pub name: String,
    /// The 4-digit PIN the keypad accepts, without any prefix.
    pub pin: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub active: bool,
    pub description: String,
}

/// Check-in and check-out times applied to every code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StayTimes {
    pub check_in: NaiveTime,
    pub check_out: NaiveTime,
}

impl Default for StayTimes {
    fn default() -> Self {
        Self {
            check_in: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or(NaiveTime::MIN),
            check_out: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Everything needed to write a code: the full field set, always sent whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSpec {
    pub name: String,
    pub pin: String,
    pub stay: Stay,
    pub times: StayTimes,
    pub description: String,
}

impl CodeSpec {
    /// The stored code this spec produces once written under `id`.
    pub fn into_code(self, id: CodeId, lock_id: LockId) -> AccessCode {
        AccessCode {
            id,
            lock_id,
            name: self.name,
            pin: Some(self.pin),
            date_start: Some(self.stay.arrival),
            date_end: Some(self.stay.departure),
            active: true,
            description: self.description,
        }
    }
}

// ── Correlation tag ─────────────────────────────────────────────────

/// The `<prefix>#<booking id>` marker that ties a code to a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationTag {
    prefix: String,
}

impl CorrelationTag {
    pub const DEFAULT_PREFIX: &'static str = "Smoobu";

    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The tag written into a code's description.
    pub fn render(&self, booking: &BookingId) -> String {
        format!("{}#{booking}", self.prefix)
    }

    /// Whether `description` carries the tag of exactly `booking`.
    ///
    /// The tag must end at the end of the text or at a non-alphanumeric
    /// character, so `Smoobu#4` never matches inside `Smoobu#42`.
    pub fn is_in(&self, description: &str, booking: &BookingId) -> bool {
        let needle = self.render(booking);
        description.match_indices(&needle).any(|(at, _)| {
            description[at + needle.len()..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric())
        })
    }

    /// The booking id of the first tag in `description`, if any.
    pub fn extract(&self, description: &str) -> Option<BookingId> {
        let marker = format!("{}#", self.prefix);
        description.match_indices(&marker).find_map(|(at, _)| {
            let rest = &description[at + marker.len()..];
            let end = rest
                .find(|c: char| !c.is_alphanumeric())
                .unwrap_or(rest.len());
            (end > 0).then(|| BookingId::new(&rest[..end]))
        })
    }

    /// Whether `description` carries any tag with this prefix.
    pub fn is_tagged(&self, description: &str) -> bool {
        self.extract(description).is_some()
    }
}

impl Default for CorrelationTag {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}
