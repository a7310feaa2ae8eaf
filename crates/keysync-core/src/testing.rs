// In-memory collaborators and builders for engine tests.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;

use crate::config::SyncConfig;
use crate::error::CoreError;
use crate::identity::IdentityMap;
use crate::model::{
    AccessCode, AccessoireId, Booking, BookingId, BookingStatus, CodeId, CodeSpec, LockId,
};
use crate::source::{BookingPage, BookingSource, LockSource, Notifier, SmsAction};

// ── Builders ────────────────────────────────────────────────────────

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

pub fn booking(id: &str, apartment: &str, guest: &str, arrival: &str, departure: &str) -> Booking {
    Booking {
        id: BookingId::from(id),
        apartment_id: Some(apartment.to_owned()),
        apartment_name: Some(format!("Apartment {apartment}")),
        guest_name: guest.to_owned(),
        arrival: Some(date(arrival)),
        departure: Some(date(departure)),
        status: BookingStatus::Confirmed,
        blocked: false,
        language: Some("en".into()),
    }
}

/// A code on lock 100 with PIN `1234`.
pub fn code(id: u64, name: &str, start: &str, end: &str, description: &str) -> AccessCode {
    AccessCode {
        id: CodeId::new(id),
        lock_id: LockId::new(100),
        name: name.to_owned(),
        pin: Some("1234".into()),
        date_start: Some(date(start)),
        date_end: Some(date(end)),
        active: true,
        description: description.to_owned(),
    }
}

/// Apartments A1 → lock 100 (keypad K100, prefix 12) and A2 → lock 200
/// (keypad K200, no prefix).
pub fn sync_config() -> SyncConfig {
    SyncConfig {
        identity: IdentityMap::new(
            HashMap::from([
                ("A1".to_owned(), LockId::new(100)),
                ("A2".to_owned(), LockId::new(200)),
            ]),
            BTreeMap::from([
                (LockId::new(100), AccessoireId::new("K100")),
                (LockId::new(200), AccessoireId::new("K200")),
            ]),
            HashMap::from([(LockId::new(100), "12".to_owned())]),
        ),
        ..SyncConfig::default()
    }
}

fn remote_error(what: &str) -> CoreError {
    CoreError::Api {
        message: format!("{what} rejected"),
        status: Some(500),
    }
}

// ── Bookings ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeBookings {
    pages: Vec<Vec<Booking>>,
    total: u64,
    endless: bool,
    fail: bool,
    requested: AtomicUsize,
}

impl FakeBookings {
    pub fn paged(pages: Vec<Vec<Booking>>, total: u64) -> Self {
        Self {
            pages,
            total,
            ..Self::default()
        }
    }

    pub fn single(bookings: Vec<Booking>) -> Self {
        let total = u64::try_from(bookings.len()).unwrap();
        Self::paged(vec![bookings], total)
    }

    /// Every page holds one new booking and the total is never reported.
    pub fn endless() -> Self {
        Self {
            endless: true,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn pages_requested(&self) -> usize {
        self.requested.load(Ordering::SeqCst)
    }
}

impl BookingSource for FakeBookings {
    async fn bookings_page(
        &self,
        _from: NaiveDate,
        _to: NaiveDate,
        page: u32,
        _page_size: u32,
    ) -> Result<BookingPage, CoreError> {
        self.requested.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(remote_error("booking listing"));
        }
        if self.endless {
            return Ok(BookingPage {
                bookings: vec![booking(
                    &page.to_string(),
                    "A1",
                    "Loop",
                    "2025-03-10",
                    "2025-03-12",
                )],
                total_items: 0,
            });
        }
        let index = usize::try_from(page).unwrap() - 1;
        Ok(BookingPage {
            bookings: self.pages.get(index).cloned().unwrap_or_default(),
            total_items: self.total,
        })
    }
}

// ── Locks ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockCall {
    Login,
    List(u64),
    Create(u64, String, CodeSpec),
    Update(u64, CodeSpec),
    Delete(u64),
}

#[derive(Default)]
struct LockState {
    codes: HashMap<LockId, Vec<AccessCode>>,
    calls: Vec<LockCall>,
    next_id: u64,
    fail_login: bool,
    fail_creates: bool,
    fail_lists: HashSet<u64>,
    fail_deletes: HashSet<u64>,
}

#[derive(Default)]
pub struct FakeLocks {
    state: Mutex<LockState>,
}

impl FakeLocks {
    pub fn seed(&self, lock: u64, codes: Vec<AccessCode>) {
        let lock = LockId::new(lock);
        let codes = codes
            .into_iter()
            .map(|mut c| {
                c.lock_id = lock;
                c
            })
            .collect();
        self.state.lock().unwrap().codes.insert(lock, codes);
    }

    pub fn fail_login(&self) {
        self.state.lock().unwrap().fail_login = true;
    }

    pub fn fail_creates(&self) {
        self.state.lock().unwrap().fail_creates = true;
    }

    pub fn fail_list(&self, lock: u64) {
        self.state.lock().unwrap().fail_lists.insert(lock);
    }

    pub fn fail_delete(&self, code: u64) {
        self.state.lock().unwrap().fail_deletes.insert(code);
    }

    pub fn calls(&self) -> Vec<LockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, LockCall::List(_)))
            .count()
    }

    /// Number of create, update and delete calls.
    pub fn writes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    LockCall::Create(..) | LockCall::Update(..) | LockCall::Delete(_)
                )
            })
            .count()
    }

    pub fn created(&self) -> Vec<(u64, String, CodeSpec)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                LockCall::Create(lock, accessoire, spec) => Some((lock, accessoire, spec)),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                LockCall::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

impl LockSource for FakeLocks {
    async fn login(&self) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(LockCall::Login);
        if state.fail_login {
            return Err(CoreError::AuthenticationFailed {
                message: "bad credentials".into(),
            });
        }
        Ok(())
    }

    async fn list_codes(&self, lock: LockId) -> Result<Vec<AccessCode>, CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(LockCall::List(lock.get()));
        if state.fail_lists.contains(&lock.get()) {
            return Err(remote_error("code listing"));
        }
        Ok(state.codes.get(&lock).cloned().unwrap_or_default())
    }

    async fn create_code(
        &self,
        lock: LockId,
        accessoire: &AccessoireId,
        spec: &CodeSpec,
    ) -> Result<AccessCode, CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(LockCall::Create(
            lock.get(),
            accessoire.to_string(),
            spec.clone(),
        ));
        if state.fail_creates {
            return Err(remote_error("create"));
        }
        state.next_id += 1;
        let created = spec
            .clone()
            .into_code(CodeId::new(1000 + state.next_id), lock);
        state.codes.entry(lock).or_default().push(created.clone());
        Ok(created)
    }

    async fn update_code(&self, code: CodeId, spec: &CodeSpec) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(LockCall::Update(code.get(), spec.clone()));
        Ok(())
    }

    async fn delete_code(&self, code: CodeId) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(LockCall::Delete(code.get()));
        if state.fail_deletes.contains(&code.get()) {
            return Err(remote_error("delete"));
        }
        for codes in state.codes.values_mut() {
            codes.retain(|c| c.id != code);
        }
        Ok(())
    }
}

// ── Notifier ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeNotifier {
    fail: bool,
    sms: Mutex<Vec<(String, String, SmsAction)>>,
    guest: Mutex<Vec<(String, String)>>,
}

impl FakeNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// `(booking id, full pin, action)` per SMS attempt.
    pub fn sms(&self) -> Vec<(String, String, SmsAction)> {
        self.sms.lock().unwrap().clone()
    }

    /// `(booking id, full pin)` per guest message attempt.
    pub fn guest_messages(&self) -> Vec<(String, String)> {
        self.guest.lock().unwrap().clone()
    }
}

impl Notifier for FakeNotifier {
    async fn send_to_guest(
        &self,
        booking: &Booking,
        full_pin: &str,
        _apartment_name: &str,
    ) -> bool {
        self.guest
            .lock()
            .unwrap()
            .push((booking.id.to_string(), full_pin.to_owned()));
        !self.fail
    }

    async fn send_sms(
        &self,
        booking: &Booking,
        full_pin: &str,
        _apartment_name: &str,
        action: SmsAction,
    ) -> bool {
        self.sms
            .lock()
            .unwrap()
            .push((booking.id.to_string(), full_pin.to_owned(), action));
        !self.fail
    }
}
