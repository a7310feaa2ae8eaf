// ── Identity resolution ──
//
// Apartment → lock → keypad lookups. All three tables come from
// configuration; a missing entry means the booking is skipped, never that
// the run fails.

use std::collections::{BTreeMap, HashMap};

use crate::error::CoreError;
use crate::model::{AccessoireId, LockId};

/// Static mapping between booking apartments and lock hardware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    apartment_locks: HashMap<String, LockId>,
    lock_accessoires: BTreeMap<LockId, AccessoireId>,
    pin_prefixes: HashMap<LockId, String>,
}

impl IdentityMap {
    pub fn new(
        apartment_locks: HashMap<String, LockId>,
        lock_accessoires: BTreeMap<LockId, AccessoireId>,
        pin_prefixes: HashMap<LockId, String>,
    ) -> Self {
        Self {
            apartment_locks,
            lock_accessoires,
            pin_prefixes,
        }
    }

    /// Lock serving the given apartment.
    pub fn lock_for(&self, apartment_id: &str) -> Result<LockId, CoreError> {
        self.apartment_locks
            .get(apartment_id)
            .copied()
            .ok_or_else(|| CoreError::MissingMapping {
                message: format!("apartment {apartment_id} has no lock"),
            })
    }

    /// Keypad accessory paired with the given lock.
    pub fn accessoire_for(&self, lock: LockId) -> Result<&AccessoireId, CoreError> {
        self.lock_accessoires
            .get(&lock)
            .ok_or_else(|| CoreError::MissingMapping {
                message: format!("lock {lock} has no keypad"),
            })
    }

    /// Digits a guest types before the PIN on this lock, empty if none.
    pub fn pin_prefix(&self, lock: LockId) -> &str {
        self.pin_prefixes.get(&lock).map_or("", String::as_str)
    }

    /// Every lock with a keypad, in ascending id order. Cleanup sweeps these.
    pub fn locks(&self) -> impl Iterator<Item = LockId> + '_ {
        self.lock_accessoires.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.apartment_locks.is_empty()
    }
}
