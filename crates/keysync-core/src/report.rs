// ── Run report ──

use serde::Serialize;
use strum::Display;

use crate::model::{BookingId, CodeId, LockId};

/// What happened to one booking or one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Created,
    Updated,
    Unchanged,
    Deleted,
    Skipped,
    Failed,
}

/// A single line of the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub action: Action,
    pub booking_id: Option<BookingId>,
    pub lock_id: Option<LockId>,
    pub code_id: Option<CodeId>,
    pub detail: String,
}

/// Counters and outcomes of one sync run.
///
/// In dry-run mode the counters reflect what *would* have happened.
/// `skipped` includes the bookings whose code was already correct; those
/// are also counted in `unchanged`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    pub bookings_seen: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub errors: usize,
    pub notifications_failed: usize,
    pub items: Vec<ItemOutcome>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// A run succeeded when no item failed. Notification failures don't count.
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    pub(crate) fn record(&mut self, outcome: ItemOutcome) {
        match outcome.action {
            Action::Created => self.created += 1,
            Action::Updated => self.updated += 1,
            Action::Unchanged => {
                self.unchanged += 1;
                self.skipped += 1;
            }
            Action::Deleted => self.deleted += 1,
            Action::Skipped => self.skipped += 1,
            Action::Failed => self.errors += 1,
        }
        self.items.push(outcome);
    }
}

impl ItemOutcome {
    pub(crate) fn booking(
        action: Action,
        booking_id: &BookingId,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            action,
            booking_id: Some(booking_id.clone()),
            lock_id: None,
            code_id: None,
            detail: detail.into(),
        }
    }

    pub(crate) fn code(
        action: Action,
        lock: LockId,
        code: CodeId,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            action,
            booking_id: None,
            lock_id: Some(lock),
            code_id: Some(code),
            detail: detail.into(),
        }
    }

    pub(crate) fn for_booking(mut self, booking_id: Option<BookingId>) -> Self {
        self.booking_id = booking_id;
        self
    }

    pub(crate) fn on_lock(mut self, lock: LockId) -> Self {
        self.lock_id = Some(lock);
        self
    }

    pub(crate) fn with_code(mut self, code: CodeId) -> Self {
        self.code_id = Some(code);
        self
    }
}
