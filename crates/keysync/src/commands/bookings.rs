//! `keysync bookings` -- the booking window as a run would see it.

use tabled::Tabled;

use keysync_core::{Booking, IdentityMap};

use crate::cli::{BookingsArgs, BookingsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Printer};

use super::Engine;

#[derive(Tabled)]
struct BookingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Guest")]
    guest: String,
    #[tabled(rename = "Apartment")]
    apartment: String,
    #[tabled(rename = "Arrival")]
    arrival: String,
    #[tabled(rename = "Departure")]
    departure: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Lock")]
    lock: String,
}

impl BookingRow {
    fn new(b: &Booking, identity: &IdentityMap) -> Self {
        let lock = b
            .apartment_id
            .as_deref()
            .and_then(|apt| identity.lock_for(apt).ok());
        Self {
            id: b.id.to_string(),
            guest: b.guest_name.clone(),
            apartment: b
                .apartment_name
                .clone()
                .or_else(|| b.apartment_id.clone())
                .unwrap_or_default(),
            arrival: output::cell(b.arrival),
            departure: output::cell(b.departure),
            status: if b.blocked {
                "blocked".into()
            } else {
                b.status.to_string()
            },
            lock: lock.map_or_else(|| "-".into(), |l| l.to_string()),
        }
    }
}

pub async fn handle(
    sync: &Engine,
    args: BookingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BookingsCommand::List { all } => {
            let mut bookings = sync.preview_bookings(super::today()).await?;
            if !all {
                bookings.retain(Booking::is_active);
            }
            let identity = &sync.config().identity;
            Printer::new(global).list(
                &bookings,
                |b| BookingRow::new(b, identity),
                |b| b.id.to_string(),
            );
            Ok(())
        }
    }
}
