// ── Bookings ──

use chrono::NaiveDate;
use serde::Serialize;
use strum::{Display, EnumString};

use super::BookingId;
use crate::error::CoreError;

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    #[strum(to_string = "cancelled", serialize = "canceled")]
    Cancelled,
    Inquiry,
    Request,
    Unknown,
}

impl BookingStatus {
    /// Derive the status from the platform's `status` and `type` fields.
    ///
    /// A reservation of type `cancellation` is cancelled whatever its status
    /// says. A missing status on a plain reservation counts as confirmed.
    pub fn from_remote(status: Option<&str>, kind: Option<&str>) -> Self {
        if kind.is_some_and(|k| k.eq_ignore_ascii_case("cancellation")) {
            return Self::Cancelled;
        }
        match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s.parse().unwrap_or(Self::Unknown),
            None => Self::Confirmed,
        }
    }
}

/// Arrival and departure of a booking with a usable date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stay {
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
}

/// A reservation as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: BookingId,
    /// Apartment id as the booking platform reports it.
    pub apartment_id: Option<String>,
    pub apartment_name: Option<String>,
    pub guest_name: String,
    pub arrival: Option<NaiveDate>,
    pub departure: Option<NaiveDate>,
    pub status: BookingStatus,
    /// Owner-side blocks occupy the calendar but have no guest.
    pub blocked: bool,
    pub language: Option<String>,
}

impl Booking {
    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }

    /// Whether the booking should hold an access code.
    pub fn is_active(&self) -> bool {
        !self.is_cancelled() && !self.blocked
    }

    /// The validated date range, or a data error naming what is missing.
    pub fn stay(&self) -> Result<Stay, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidData {
            booking_id: self.id.to_string(),
            reason: reason.to_owned(),
        };
        let arrival = self.arrival.ok_or_else(|| invalid("missing arrival date"))?;
        let departure = self
            .departure
            .ok_or_else(|| invalid("missing departure date"))?;
        if departure < arrival {
            return Err(invalid("departure before arrival"));
        }
        Ok(Stay { arrival, departure })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn booking(arrival: Option<&str>, departure: Option<&str>) -> Booking {
        Booking {
            id: BookingId::from("7"),
            apartment_id: Some("A1".into()),
            apartment_name: None,
            guest_name: "Jane Doe".into(),
            arrival: arrival.map(|d| d.parse().unwrap()),
            departure: departure.map(|d| d.parse().unwrap()),
            status: BookingStatus::Confirmed,
            blocked: false,
            language: None,
        }
    }

    #[test]
    fn cancellation_type_overrides_status() {
        assert_eq!(
            BookingStatus::from_remote(Some("confirmed"), Some("cancellation")),
            BookingStatus::Cancelled
        );
        assert_eq!(
            BookingStatus::from_remote(Some("Canceled"), None),
            BookingStatus::Cancelled
        );
        assert_eq!(BookingStatus::from_remote(None, Some("reservation")), BookingStatus::Confirmed);
        assert_eq!(BookingStatus::from_remote(Some("weird"), None), BookingStatus::Unknown);
    }

    #[test]
    fn stay_requires_both_dates() {
        assert!(booking(Some("2025-03-10"), None).stay().is_err());
        assert!(booking(None, Some("2025-03-10")).stay().is_err());
        assert!(booking(Some("2025-03-12"), Some("2025-03-10")).stay().is_err());

        let stay = booking(Some("2025-03-10"), Some("2025-03-14")).stay().unwrap();
        assert_eq!(stay.arrival.to_string(), "2025-03-10");
    }

    #[test]
    fn blocked_bookings_are_not_active() {
        let mut b = booking(Some("2025-03-10"), Some("2025-03-14"));
        assert!(b.is_active());
        b.blocked = true;
        assert!(!b.is_active());
    }
}
