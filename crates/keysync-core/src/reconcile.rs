// ── Per-booking reconciliation ──
//
// For each active booking: resolve its lock, find its code, then create,
// update or leave it. An existing code keeps its PIN; only a new code gets
// a fresh one. Item-level problems end up in the report, never as errors.

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::cache::CodeCache;
use crate::config::SyncConfig;
use crate::error::CoreError;
use crate::matching::{MatchResult, find_code};
use crate::model::{AccessCode, AccessoireId, Booking, CodeSpec, CorrelationTag, LockId, Stay};
use crate::pin;
use crate::report::{Action, ItemOutcome, SyncReport};
use crate::source::{LockSource, Notifier, SmsAction};

/// Shown to guests and operators when the booking names no apartment.
const UNKNOWN_APARTMENT: &str = "your apartment";

/// Why an existing code must be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReason {
    pub dates_changed: bool,
    pub tag_missing: bool,
}

impl UpdateReason {
    fn describe(self) -> &'static str {
        match (self.dates_changed, self.tag_missing) {
            (true, true) => "dates changed, tag added",
            (true, false) => "dates changed",
            _ => "tag added",
        }
    }
}

/// What to do about one booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Create,
    Keep(AccessCode),
    Update(AccessCode, UpdateReason),
}

/// Decide the action for a booking given the result of matching.
pub fn plan(found: MatchResult<'_>, stay: Stay, booking: &Booking, tag: &CorrelationTag) -> Plan {
    let Some(code) = found.code() else {
        return Plan::Create;
    };
    let reason = UpdateReason {
        dates_changed: code.date_start != Some(stay.arrival)
            || code.date_end != Some(stay.departure),
        tag_missing: !tag.is_in(&code.description, &booking.id),
    };
    if reason.dates_changed || reason.tag_missing {
        Plan::Update(code.clone(), reason)
    } else {
        Plan::Keep(code.clone())
    }
}

/// Applies plans against the lock cloud for one run.
pub struct Reconciler<'a, L, N> {
    locks: &'a L,
    notifier: &'a N,
    config: &'a SyncConfig,
    today: NaiveDate,
    dry_run: bool,
}

impl<'a, L: LockSource, N: Notifier> Reconciler<'a, L, N> {
    pub fn new(
        locks: &'a L,
        notifier: &'a N,
        config: &'a SyncConfig,
        today: NaiveDate,
        dry_run: bool,
    ) -> Self {
        Self {
            locks,
            notifier,
            config,
            today,
            dry_run,
        }
    }

    /// Reconcile one booking and record the outcome.
    ///
    /// Only fatal errors (authentication) are returned; everything else is
    /// counted as skipped or failed.
    pub async fn reconcile(
        &self,
        booking: &Booking,
        cache: &mut CodeCache,
        report: &mut SyncReport,
    ) -> Result<(), CoreError> {
        let outcome = match self.apply(booking, cache, report).await {
            Ok(outcome) => outcome,
            Err(err @ (CoreError::MissingMapping { .. } | CoreError::InvalidData { .. })) => {
                warn!(booking = %booking.id, "skipping booking: {err}");
                ItemOutcome::booking(Action::Skipped, &booking.id, err.to_string())
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                error!(booking = %booking.id, "failed to reconcile booking: {err}");
                ItemOutcome::booking(Action::Failed, &booking.id, err.to_string())
            }
        };
        report.record(outcome);
        Ok(())
    }

    async fn apply(
        &self,
        booking: &Booking,
        cache: &mut CodeCache,
        report: &mut SyncReport,
    ) -> Result<ItemOutcome, CoreError> {
        let stay = booking.stay()?;
        let apartment = booking
            .apartment_id
            .as_deref()
            .ok_or_else(|| CoreError::MissingMapping {
                message: "booking names no apartment".into(),
            })?;
        let identity = &self.config.identity;
        let lock = identity.lock_for(apartment)?;
        let accessoire = identity.accessoire_for(lock)?;

        let codes = cache.load(lock, self.locks).await?;
        let found = find_code(booking, stay, codes, &self.config.tag);
        if let MatchResult::NameDate(code) = found {
            debug!(
                booking = %booking.id,
                code = %code.id,
                "adopting untagged code by name and arrival"
            );
        }

        match plan(found, stay, booking, &self.config.tag) {
            Plan::Keep(code) => {
                debug!(booking = %booking.id, code = %code.id, "code up to date");
                Ok(ItemOutcome::booking(Action::Unchanged, &booking.id, "code up to date")
                    .on_lock(lock)
                    .with_code(code.id))
            }
            Plan::Create => {
                self.create(booking, stay, lock, accessoire, cache, report)
                    .await
            }
            Plan::Update(code, reason) => {
                self.update(booking, stay, &code, reason, cache, report)
                    .await
            }
        }
    }

    fn spec_for(&self, booking: &Booking, stay: Stay, pin: String) -> CodeSpec {
        CodeSpec {
            name: booking.guest_name.clone(),
            pin,
            stay,
            times: self.config.times,
            description: self.config.tag.render(&booking.id),
        }
    }

    async fn create(
        &self,
        booking: &Booking,
        stay: Stay,
        lock: LockId,
        accessoire: &AccessoireId,
        cache: &mut CodeCache,
        report: &mut SyncReport,
    ) -> Result<ItemOutcome, CoreError> {
        let spec = self.spec_for(booking, stay, pin::generate_pin());
        if self.dry_run {
            info!(booking = %booking.id, lock = %lock, "dry run: would create code");
            return Ok(
                ItemOutcome::booking(Action::Created, &booking.id, "would create code")
                    .on_lock(lock),
            );
        }

        let full_pin = pin::full_pin(self.config.identity.pin_prefix(lock), &spec.pin);
        let created = self.locks.create_code(lock, accessoire, &spec).await?;
        let code_id = created.id;
        info!(booking = %booking.id, lock = %lock, code = %code_id, "created code");
        cache.upsert(created);

        let apartment = booking.apartment_name.as_deref().unwrap_or(UNKNOWN_APARTMENT);
        if !self
            .notifier
            .send_sms(booking, &full_pin, apartment, SmsAction::New)
            .await
        {
            report.notifications_failed += 1;
        }
        if self.config.notify_guests
            && stay.arrival >= self.today
            && !self
                .notifier
                .send_to_guest(booking, &full_pin, apartment)
                .await
        {
            report.notifications_failed += 1;
        }

        Ok(ItemOutcome::booking(Action::Created, &booking.id, "created code")
            .on_lock(lock)
            .with_code(code_id))
    }

    async fn update(
        &self,
        booking: &Booking,
        stay: Stay,
        code: &AccessCode,
        reason: UpdateReason,
        cache: &mut CodeCache,
        report: &mut SyncReport,
    ) -> Result<ItemOutcome, CoreError> {
        let Some(existing_pin) = code.pin.clone() else {
            return Err(CoreError::InvalidData {
                booking_id: booking.id.to_string(),
                reason: format!("matched code {} has no PIN to keep", code.id),
            });
        };
        let lock = code.lock_id;
        let detail = reason.describe();
        if self.dry_run {
            info!(booking = %booking.id, code = %code.id, "dry run: would update code ({detail})");
            return Ok(ItemOutcome::booking(Action::Updated, &booking.id, detail)
                .on_lock(lock)
                .with_code(code.id));
        }

        let spec = self.spec_for(booking, stay, existing_pin);
        let full_pin = pin::full_pin(self.config.identity.pin_prefix(lock), &spec.pin);
        self.locks.update_code(code.id, &spec).await?;
        info!(booking = %booking.id, code = %code.id, "updated code ({detail})");
        cache.upsert(spec.into_code(code.id, lock));

        let apartment = booking.apartment_name.as_deref().unwrap_or(UNKNOWN_APARTMENT);
        if !self
            .notifier
            .send_sms(booking, &full_pin, apartment, SmsAction::Update)
            .await
        {
            report.notifications_failed += 1;
        }

        Ok(ItemOutcome::booking(Action::Updated, &booking.id, detail)
            .on_lock(lock)
            .with_code(code.id))
    }
}
