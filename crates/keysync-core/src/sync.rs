// ── Sync orchestration ──
//
// One run: log in, fetch the booking window once, reconcile every active
// booking, then sweep every configured lock. No state survives the run.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::cache::CodeCache;
use crate::cleanup::Cleanup;
use crate::config::{ConnectionConfig, SyncConfig};
use crate::error::CoreError;
use crate::fetch;
use crate::model::{AccessCode, Booking, BookingId, LockId};
use crate::reconcile::Reconciler;
use crate::remote::{RemoteBookings, RemoteLocks, RemoteNotifier, RemoteServices};
use crate::report::SyncReport;
use crate::source::{BookingSource, LockSource, Notifier};

/// Per-run switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Log and count intended writes without performing any.
    pub dry_run: bool,
    /// The local date the run treats as today.
    pub today: NaiveDate,
}

/// The reconciliation engine, generic over its collaborators.
pub struct Synchronizer<B, L, N> {
    bookings: B,
    locks: L,
    notifier: N,
    config: SyncConfig,
}

impl Synchronizer<RemoteBookings, RemoteLocks, RemoteNotifier> {
    /// Build HTTP clients for all three services. Does not touch the network.
    pub fn connect(conn: &ConnectionConfig, config: SyncConfig) -> Result<Self, CoreError> {
        let RemoteServices {
            bookings,
            locks,
            notifier,
        } = RemoteServices::build(conn, config.times)?;
        Ok(Self::new(bookings, locks, notifier, config))
    }
}

impl<B: BookingSource, L: LockSource, N: Notifier> Synchronizer<B, L, N> {
    pub fn new(bookings: B, locks: L, notifier: N, config: SyncConfig) -> Self {
        Self {
            bookings,
            locks,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Execute one full sync run.
    ///
    /// Fails only when the lock cloud rejects the login or the booking
    /// listing cannot be fetched; per-item problems land in the report.
    #[instrument(skip(self), fields(dry_run = options.dry_run))]
    pub async fn run(&self, options: RunOptions) -> Result<SyncReport, CoreError> {
        self.locks.login().await?;

        let all = self.fetch_window(options.today).await?;
        let active = fetch::active_only(all);
        info!(active = active.len(), "bookings to reconcile");

        let mut report = SyncReport::new(options.dry_run);
        report.bookings_seen = active.len();
        let mut cache = CodeCache::default();

        let reconciler = Reconciler::new(
            &self.locks,
            &self.notifier,
            &self.config,
            options.today,
            options.dry_run,
        );
        for booking in &active {
            reconciler.reconcile(booking, &mut cache, &mut report).await?;
        }

        let active_ids: HashSet<BookingId> = active.into_iter().map(|b| b.id).collect();
        Cleanup::new(
            &self.locks,
            &self.config.tag,
            options.today,
            self.config.retention_days,
            options.dry_run,
        )
        .sweep(
            self.config.identity.locks(),
            &active_ids,
            &mut cache,
            &mut report,
        )
        .await?;

        info!(
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            skipped = report.skipped,
            errors = report.errors,
            "sync finished"
        );
        Ok(report)
    }

    /// Log in and list the codes currently stored on `lock`.
    pub async fn list_codes(&self, lock: LockId) -> Result<Vec<AccessCode>, CoreError> {
        self.locks.login().await?;
        self.locks.list_codes(lock).await
    }

    /// The bookings a run on `today` would consider, cancelled ones included.
    pub async fn preview_bookings(&self, today: NaiveDate) -> Result<Vec<Booking>, CoreError> {
        self.fetch_window(today).await
    }

    async fn fetch_window(&self, today: NaiveDate) -> Result<Vec<Booking>, CoreError> {
        let (from, to) = self.config.window.around(today);
        info!(%from, %to, "fetching bookings");
        fetch::fetch_all(&self.bookings, from, to).await
    }
}
