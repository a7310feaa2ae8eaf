// ── Wire → domain conversions ──
//
// Bridges keysync-api's raw types into the canonical model. Date strings
// may carry a time suffix (`2025-03-10 15:00`); only the date part counts.

use chrono::{NaiveDate, Timelike};

use keysync_api::booking::models::Reservation;
use keysync_api::lock::models::{CodeForm, RemoteCode, TimeOfDay};

use crate::model::{AccessCode, Booking, BookingId, BookingStatus, CodeId, CodeSpec, LockId};

const FALLBACK_GUEST_NAME: &str = "Guest";

/// Parse the leading `YYYY-MM-DD` of a remote date string.
pub(crate) fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

impl From<Reservation> for Booking {
    fn from(r: Reservation) -> Self {
        let (apartment_id, apartment_name) = match r.apartment {
            Some(apt) => (Some(apt.id.to_string()), non_empty(apt.name)),
            None => (None, None),
        };
        Booking {
            id: BookingId::new(r.id.to_string()),
            apartment_id,
            apartment_name,
            guest_name: non_empty(r.guest_name).unwrap_or_else(|| FALLBACK_GUEST_NAME.into()),
            arrival: parse_date(r.arrival.as_deref()),
            departure: parse_date(r.departure.as_deref()),
            status: BookingStatus::from_remote(r.status.as_deref(), r.reservation_type.as_deref()),
            blocked: r.is_blocked_booking,
            language: non_empty(r.language),
        }
    }
}

impl AccessCode {
    pub(crate) fn from_remote(lock_id: LockId, code: RemoteCode) -> Self {
        Self {
            id: CodeId::new(code.id),
            lock_id,
            name: code.name.unwrap_or_default(),
            pin: non_empty(code.code),
            date_start: parse_date(code.date_start.as_deref()),
            date_end: parse_date(code.date_end.as_deref()),
            active: code.active,
            description: code.description.unwrap_or_default(),
        }
    }
}

impl From<&CodeSpec> for CodeForm {
    fn from(spec: &CodeSpec) -> Self {
        let time = |t: chrono::NaiveTime| TimeOfDay {
            hour: t.hour(),
            minute: t.minute(),
        };
        CodeForm {
            name: spec.name.clone(),
            code: spec.pin.clone(),
            date_start: spec.stay.arrival,
            date_end: spec.stay.departure,
            time_start: time(spec.times.check_in),
            time_end: time(spec.times.check_out),
            active: true,
            description: spec.description.clone(),
        }
    }
}
