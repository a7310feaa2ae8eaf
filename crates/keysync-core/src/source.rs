// ── Collaborator traits ──
//
// The engine talks to the outside world only through these three traits.
// `remote` implements them over the HTTP clients; the test suite swaps in
// in-memory fakes.

use std::future::Future;

use chrono::NaiveDate;
use strum::Display;

use crate::error::CoreError;
use crate::model::{AccessCode, AccessoireId, Booking, CodeId, CodeSpec, LockId};

/// One page of the booking listing.
#[derive(Debug, Clone, Default)]
pub struct BookingPage {
    pub bookings: Vec<Booking>,
    /// Total number of bookings across all pages, as reported by the source.
    pub total_items: u64,
}

/// Read access to reservations, one page at a time.
pub trait BookingSource {
    /// Page `page` (1-based) of the bookings arriving in `[from, to]`,
    /// cancelled ones included.
    fn bookings_page(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<BookingPage, CoreError>> + Send;
}

/// Read/write access to the keypad codes of the lock cloud.
pub trait LockSource {
    /// Authenticate. Must succeed before any other call.
    fn login(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn list_codes(
        &self,
        lock: LockId,
    ) -> impl Future<Output = Result<Vec<AccessCode>, CoreError>> + Send;

    fn create_code(
        &self,
        lock: LockId,
        accessoire: &AccessoireId,
        spec: &CodeSpec,
    ) -> impl Future<Output = Result<AccessCode, CoreError>> + Send;

    /// Rewrite every field of an existing code.
    fn update_code(
        &self,
        code: CodeId,
        spec: &CodeSpec,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn delete_code(&self, code: CodeId) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Which event an operator SMS reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SmsAction {
    New,
    Update,
}

/// Best-effort outbound messages.
///
/// Both methods report success as a boolean: a failed notification is
/// counted, never propagated.
pub trait Notifier {
    /// Message the guest through the booking platform.
    fn send_to_guest(
        &self,
        booking: &Booking,
        full_pin: &str,
        apartment_name: &str,
    ) -> impl Future<Output = bool> + Send;

    /// Text the operator recipients about a created or updated code.
    fn send_sms(
        &self,
        booking: &Booking,
        full_pin: &str,
        apartment_name: &str,
        action: SmsAction,
    ) -> impl Future<Output = bool> + Send;
}
