//! Reconciliation between a booking platform and a smart-lock cloud.
//!
//! This crate owns the domain model and the decision logic of keysync:
//!
//! - **[`Synchronizer`]**: one stateless run: authenticate against the lock
//!   cloud, pull the booking window once, reconcile each active booking
//!   against the codes on its lock, then sweep stale codes.
//!
//! - **Collaborator traits** ([`BookingSource`], [`LockSource`],
//!   [`Notifier`]): the engine is generic over them. [`remote`] implements
//!   them on top of the `keysync-api` HTTP clients; tests use in-memory fakes.
//!
//! - **Engine pieces**: [`fetch`] (deduplicating pagination),
//!   [`identity`] (apartment → lock → keypad lookup), [`matching`]
//!   (correlation tag, then name and arrival), [`reconcile`]
//!   (create / update / no-op), [`pin`] (PIN generation and prefixes) and
//!   [`cleanup`] (revocation sweeps).
//!
//! - **[`SyncReport`]**: counters and per-item outcomes of one run. Nothing
//!   is persisted between runs; every run re-derives truth from both APIs.

pub mod cache;
pub mod cleanup;
pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod matching;
pub mod model;
pub mod pin;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod source;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{BookingWindow, ConnectionConfig, SmsSettings, SyncConfig, TlsVerification};
pub use error::CoreError;
pub use identity::IdentityMap;
pub use model::{
    AccessCode, AccessoireId, Booking, BookingId, BookingStatus, CodeId, CodeSpec,
    CorrelationTag, LockId, Stay, StayTimes,
};
pub use report::{Action, ItemOutcome, SyncReport};
pub use source::{BookingPage, BookingSource, LockSource, Notifier, SmsAction};
pub use sync::{RunOptions, Synchronizer};
