// ── Booking pagination ──
//
// The booking platform pages its listing and has been seen returning the
// same booking on more than one page. Everything is pulled once per run,
// deduplicated by id, and split into active/cancelled afterwards.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::Booking;
use crate::source::BookingSource;

/// Bookings requested per page.
pub const PAGE_SIZE: u32 = 100;

/// Hard stop for pagination.
pub const MAX_PAGES: u32 = 100;

/// Every booking arriving in `[from, to]`, each id at most once, in the
/// order first seen. Cancelled and blocked bookings are included.
///
/// Stops at the first empty page, once as many distinct bookings as the
/// reported total have been seen, or after [`MAX_PAGES`] pages.
pub async fn fetch_all<B: BookingSource>(
    source: &B,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Booking>, CoreError> {
    let mut seen = HashSet::new();
    let mut bookings = Vec::new();

    for page in 1..=MAX_PAGES {
        let batch = source.bookings_page(from, to, page, PAGE_SIZE).await?;
        if batch.bookings.is_empty() {
            debug!(page, "empty page, pagination done");
            return Ok(bookings);
        }

        let before = bookings.len();
        for booking in batch.bookings {
            if seen.insert(booking.id.clone()) {
                bookings.push(booking);
            }
        }
        debug!(
            page,
            new = bookings.len() - before,
            total = batch.total_items,
            "fetched bookings page"
        );

        if batch.total_items > 0
            && u64::try_from(bookings.len()).unwrap_or(u64::MAX) >= batch.total_items
        {
            return Ok(bookings);
        }
    }

    warn!(
        pages = MAX_PAGES,
        fetched = bookings.len(),
        "pagination ceiling reached, booking list may be incomplete"
    );
    Ok(bookings)
}

/// Keep only the bookings that should hold a code.
pub fn active_only(bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.into_iter().filter(Booking::is_active).collect()
}
