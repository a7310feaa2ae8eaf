// ── Per-run code cache ──
//
// Each lock's code list is read at most once per run. Writes made during the
// run are applied to the cached list so later bookings on the same lock see
// them. The cache is owned by the run and dropped with it.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::model::{AccessCode, CodeId, LockId};
use crate::source::LockSource;

#[derive(Debug, Default)]
pub struct CodeCache {
    by_lock: HashMap<LockId, Vec<AccessCode>>,
}

impl CodeCache {
    /// The codes of `lock`, listed from `source` on first use.
    ///
    /// A failed listing is not cached; the next caller retries.
    pub async fn load<L: LockSource>(
        &mut self,
        lock: LockId,
        source: &L,
    ) -> Result<&[AccessCode], CoreError> {
        if !self.by_lock.contains_key(&lock) {
            let codes = source.list_codes(lock).await?;
            self.by_lock.insert(lock, codes);
        }
        Ok(self.by_lock.entry(lock).or_default().as_slice())
    }

    /// Insert a code or replace the cached one with the same id.
    pub fn upsert(&mut self, code: AccessCode) {
        let codes = self.by_lock.entry(code.lock_id).or_default();
        match codes.iter_mut().find(|c| c.id == code.id) {
            Some(existing) => *existing = code,
            None => codes.push(code),
        }
    }

    pub fn remove(&mut self, lock: LockId, id: CodeId) {
        if let Some(codes) = self.by_lock.get_mut(&lock) {
            codes.retain(|c| c.id != id);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::testing::{FakeLocks, code};

    #[tokio::test]
    async fn lists_each_lock_once() {
        let locks = FakeLocks::default();
        locks.seed(100, vec![code(1, "Ann", "2025-03-10", "2025-03-12", "")]);
        let mut cache = CodeCache::default();

        let lock = LockId::new(100);
        assert_eq!(cache.load(lock, &locks).await.unwrap().len(), 1);
        assert_eq!(cache.load(lock, &locks).await.unwrap().len(), 1);
        assert_eq!(locks.list_calls(), 1);
    }

    #[tokio::test]
    async fn writes_are_visible_to_later_reads() {
        let locks = FakeLocks::default();
        let mut cache = CodeCache::default();
        let lock = LockId::new(100);
        cache.load(lock, &locks).await.unwrap();

        let mut c = code(7, "Ann", "2025-03-10", "2025-03-12", "");
        cache.upsert(c.clone());
        c.name = "Ann B".into();
        cache.upsert(c);
        let codes = cache.load(lock, &locks).await.unwrap();
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].name, "Ann B");

        cache.remove(lock, CodeId::new(7));
        assert!(cache.load(lock, &locks).await.unwrap().is_empty());
        assert_eq!(locks.list_calls(), 1);
    }
}
