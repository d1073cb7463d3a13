//! Memoizing lookup cache.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::ModelResult;

/// A name-keyed cache filled by scanning numbered units (files) in order.
///
/// A lookup holds the cache lock from the cache check through the insert, so
/// concurrent callers never observe a half-filled map. Each unit is scanned
/// at most once: a miss scans only the units not scanned before, and a
/// failed unit is retried on the next lookup because it was never counted.
///
/// When two units yield the same name, the first unit wins.
#[derive(Debug)]
pub struct Memo<V> {
    label: &'static str,
    state: Mutex<MemoState<V>>,
}

#[derive(Debug)]
struct MemoState<V> {
    entries: BTreeMap<String, Arc<V>>,
    scanned: usize,
}

impl<V> Memo<V> {
    /// Create an empty cache. `label` names the entries in logs.
    pub fn new(label: &'static str) -> Self {
        Memo {
            label,
            state: Mutex::new(MemoState {
                entries: BTreeMap::new(),
                scanned: 0,
            }),
        }
    }

    /// Look up `key`, scanning unscanned units in order until it appears.
    ///
    /// `scan_unit(i)` returns every `(name, value)` unit `i` declares.
    /// Returns `Ok(None)` when all `units` are scanned and `key` is absent.
    pub fn get_or_scan<F>(&self, key: &str, units: usize, mut scan_unit: F) -> ModelResult<Option<Arc<V>>>
    where
        F: FnMut(usize) -> ModelResult<Vec<(String, V)>>,
    {
        let mut state = self.lock();
        if let Some(value) = state.entries.get(key) {
            tracing::debug!("{} cache hit: {}", self.label, key);
            return Ok(Some(Arc::clone(value)));
        }

        while state.scanned < units {
            let unit = state.scanned;
            let found = scan_unit(unit)?;
            state.scanned += 1;
            self.insert_all(&mut state, found);
            if let Some(value) = state.entries.get(key) {
                tracing::debug!("{} cache fill: {} (unit {})", self.label, key, unit);
                return Ok(Some(Arc::clone(value)));
            }
        }

        tracing::debug!("{} not found: {}", self.label, key);
        Ok(None)
    }

    /// Scan every remaining unit and return all entries in key order.
    pub fn scan_all<F>(&self, units: usize, mut scan_unit: F) -> ModelResult<Vec<Arc<V>>>
    where
        F: FnMut(usize) -> ModelResult<Vec<(String, V)>>,
    {
        let mut state = self.lock();
        while state.scanned < units {
            let found = scan_unit(state.scanned)?;
            state.scanned += 1;
            self.insert_all(&mut state, found);
        }
        Ok(state.entries.values().cloned().collect())
    }

    /// Entries cached so far, in key order.
    pub fn cached(&self) -> Vec<Arc<V>> {
        self.lock().entries.values().cloned().collect()
    }

    /// Number of units scanned so far.
    pub fn scanned_units(&self) -> usize {
        self.lock().scanned
    }

    fn insert_all(&self, state: &mut MemoState<V>, found: Vec<(String, V)>) {
        for (name, value) in found {
            match state.entries.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(value));
                }
                Entry::Occupied(slot) => {
                    tracing::warn!(
                        "duplicate {} {}: keeping the first declaration",
                        self.label,
                        slot.key()
                    );
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoState<V>> {
        self.state.lock().expect("memo cache mutex poisoned")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, ModelError};
    use std::cell::Cell;

    fn units() -> Vec<Vec<(&'static str, u32)>> {
        vec![
            vec![("a", 1)],
            vec![("b", 2), ("a", 99)],
            vec![("c", 3)],
        ]
    }

    fn scanner<'a>(
        calls: &'a Cell<usize>,
        data: &'a [Vec<(&'static str, u32)>],
    ) -> impl FnMut(usize) -> ModelResult<Vec<(String, u32)>> + 'a {
        move |i| {
            calls.set(calls.get() + 1);
            Ok(data[i].iter().map(|(k, v)| (k.to_string(), *v)).collect())
        }
    }

    #[test]
    fn stops_at_first_unit_declaring_the_key() {
        let memo = Memo::new("test");
        let data = units();
        let calls = Cell::new(0);
        let b = memo.get_or_scan("b", 3, scanner(&calls, &data)).unwrap().unwrap();
        assert_eq!(*b, 2);
        assert_eq!(calls.get(), 2);
        assert_eq!(memo.scanned_units(), 2);
    }

    #[test]
    fn hit_returns_same_instance_without_scanning() {
        let memo = Memo::new("test");
        let data = units();
        let calls = Cell::new(0);
        let first = memo.get_or_scan("a", 3, scanner(&calls, &data)).unwrap().unwrap();
        let second = memo.get_or_scan("a", 3, scanner(&calls, &data)).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn first_unit_wins_on_duplicates() {
        let memo = Memo::new("test");
        let data = units();
        let calls = Cell::new(0);
        memo.scan_all(3, scanner(&calls, &data)).unwrap();
        let a = memo.get_or_scan("a", 3, scanner(&calls, &data)).unwrap().unwrap();
        assert_eq!(*a, 1);
    }

    #[test]
    fn miss_scans_everything_once() {
        let memo = Memo::new("test");
        let data = units();
        let calls = Cell::new(0);
        assert!(memo.get_or_scan("zzz", 3, scanner(&calls, &data)).unwrap().is_none());
        assert_eq!(calls.get(), 3);
        assert!(memo.get_or_scan("zzz", 3, scanner(&calls, &data)).unwrap().is_none());
        let c = memo.get_or_scan("c", 3, scanner(&calls, &data)).unwrap();
        assert_eq!(c.as_deref(), Some(&3));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn failed_unit_is_not_counted() {
        let memo: Memo<u32> = Memo::new("test");
        let err = memo
            .get_or_scan("a", 2, |_| Err(ModelError::not_found(EntityKind::Struct, "x")))
            .unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(memo.scanned_units(), 0);
    }

    #[test]
    fn cached_lists_in_key_order() {
        let memo = Memo::new("test");
        let data = units();
        let calls = Cell::new(0);
        memo.get_or_scan("c", 3, scanner(&calls, &data)).unwrap();
        let values: Vec<u32> = memo.cached().iter().map(|v| **v).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
