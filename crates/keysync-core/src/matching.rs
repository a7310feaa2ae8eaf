// ── Booking ↔ code matching ──
//
// Two strategies, tag first. A code carrying the booking's correlation tag
// is authoritative; otherwise an untagged code with the guest's name and
// arrival date is adopted (codes created by hand or before tagging existed).

use crate::model::{AccessCode, Booking, CorrelationTag, Stay};

/// How an existing code was found for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult<'a> {
    None,
    Tag(&'a AccessCode),
    NameDate(&'a AccessCode),
}

impl<'a> MatchResult<'a> {
    pub fn code(self) -> Option<&'a AccessCode> {
        match self {
            Self::None => None,
            Self::Tag(code) | Self::NameDate(code) => Some(code),
        }
    }
}

/// Find the code belonging to `booking` among the codes of its lock.
///
/// The first tagged code wins. Failing that, the first untagged code whose
/// name equals the guest name (trimmed, case-insensitive) and whose start
/// date is the arrival. The end date is not compared so that a changed
/// departure is found and updated in place.
pub fn find_code<'a>(
    booking: &Booking,
    stay: Stay,
    codes: &'a [AccessCode],
    tag: &CorrelationTag,
) -> MatchResult<'a> {
    if let Some(code) = codes.iter().find(|c| tag.is_in(&c.description, &booking.id)) {
        return MatchResult::Tag(code);
    }
    let guest = booking.guest_name.trim().to_lowercase();
    codes
        .iter()
        .find(|c| {
            c.name.trim().to_lowercase() == guest
                && c.date_start == Some(stay.arrival)
                && !tag.is_tagged(&c.description)
        })
        .map_or(MatchResult::None, MatchResult::NameDate)
}
