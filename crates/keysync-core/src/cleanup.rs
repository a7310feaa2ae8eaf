// ── Revocation sweeps ──
//
// After reconciliation, every lock with a keypad is swept twice:
//
// 1. Cancelled: tagged codes whose booking is no longer active and whose
//    end date has passed.
// 2. Expired: tagged codes whose end date is older than the retention
//    period, whatever their booking.
//
// Codes without a tag are never touched. A code handled by the first sweep
// is not attempted again by the second.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use tracing::{debug, error, info};

use crate::cache::CodeCache;
use crate::error::CoreError;
use crate::model::{AccessCode, BookingId, CodeId, CorrelationTag, LockId};
use crate::report::{Action, ItemOutcome, SyncReport};
use crate::source::LockSource;

/// Tagged codes for bookings outside `active` that ended before `today`.
pub fn cancelled_candidates<'a>(
    codes: &'a [AccessCode],
    active: &HashSet<BookingId>,
    tag: &CorrelationTag,
    today: NaiveDate,
) -> Vec<(&'a AccessCode, BookingId)> {
    codes
        .iter()
        .filter(|c| c.date_end.is_some_and(|end| end < today))
        .filter_map(|c| {
            let booking = tag.extract(&c.description)?;
            (!active.contains(&booking)).then_some((c, booking))
        })
        .collect()
}

/// Tagged codes that ended before `cutoff`.
pub fn expired_candidates<'a>(
    codes: &'a [AccessCode],
    tag: &CorrelationTag,
    cutoff: NaiveDate,
) -> Vec<&'a AccessCode> {
    codes
        .iter()
        .filter(|c| c.date_end.is_some_and(|end| end < cutoff))
        .filter(|c| tag.is_tagged(&c.description))
        .collect()
}

pub struct Cleanup<'a, L> {
    locks: &'a L,
    tag: &'a CorrelationTag,
    today: NaiveDate,
    retention_days: u32,
    dry_run: bool,
}

impl<'a, L: LockSource> Cleanup<'a, L> {
    pub fn new(
        locks: &'a L,
        tag: &'a CorrelationTag,
        today: NaiveDate,
        retention_days: u32,
        dry_run: bool,
    ) -> Self {
        Self {
            locks,
            tag,
            today,
            retention_days,
            dry_run,
        }
    }

    fn cutoff(&self) -> NaiveDate {
        self.today
            .checked_sub_days(Days::new(u64::from(self.retention_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Run both sweeps over `locks`. Only fatal errors are returned.
    pub async fn sweep(
        &self,
        locks: impl IntoIterator<Item = LockId>,
        active: &HashSet<BookingId>,
        cache: &mut CodeCache,
        report: &mut SyncReport,
    ) -> Result<(), CoreError> {
        let cutoff = self.cutoff();
        for lock in locks {
            let codes = match cache.load(lock, self.locks).await {
                Ok(codes) => codes.to_vec(),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    error!(lock = %lock, "cannot list codes for cleanup: {err}");
                    report.record(ItemOutcome {
                        action: Action::Failed,
                        booking_id: None,
                        lock_id: Some(lock),
                        code_id: None,
                        detail: err.to_string(),
                    });
                    continue;
                }
            };

            let mut handled: HashSet<CodeId> = HashSet::new();
            for (code, booking) in cancelled_candidates(&codes, active, self.tag, self.today) {
                handled.insert(code.id);
                self.delete(code, Some(booking), "booking cancelled", cache, report)
                    .await?;
            }
            for code in expired_candidates(&codes, self.tag, cutoff) {
                if !handled.insert(code.id) {
                    continue;
                }
                let booking = self.tag.extract(&code.description);
                self.delete(code, booking, "past retention", cache, report)
                    .await?;
            }
            debug!(lock = %lock, removed = handled.len(), "cleanup sweep done");
        }
        Ok(())
    }

    async fn delete(
        &self,
        code: &AccessCode,
        booking: Option<BookingId>,
        why: &str,
        cache: &mut CodeCache,
        report: &mut SyncReport,
    ) -> Result<(), CoreError> {
        let outcome = |action, detail: String| {
            ItemOutcome::code(action, code.lock_id, code.id, detail).for_booking(booking.clone())
        };
        if self.dry_run {
            info!(lock = %code.lock_id, code = %code.id, "dry run: would delete code ({why})");
            report.record(outcome(Action::Deleted, format!("would delete: {why}")));
            return Ok(());
        }
        match self.locks.delete_code(code.id).await {
            Ok(()) => {
                info!(lock = %code.lock_id, code = %code.id, "deleted code ({why})");
                cache.remove(code.lock_id, code.id);
                report.record(outcome(Action::Deleted, why.to_owned()));
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                error!(lock = %code.lock_id, code = %code.id, "failed to delete code: {err}");
                report.record(outcome(Action::Failed, err.to_string()));
            }
        }
        Ok(())
    }
}
