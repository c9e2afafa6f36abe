// ============================================================================
// State : SelectionStore
// ============================================================================
// Holds the ordered set of funds picked for comparison. At most MAX_FUNDS
// entries, unique by scheme code, insertion order preserved. Every mutation
// is written through to the local store before control returns; a failed
// write is logged and otherwise ignored (last-write-wins persistence, no
// transaction log).
// ============================================================================

use tracing::{debug, warn};

use crate::models::Fund;
use crate::storage::{LocalStore, SELECTED_FUNDS_KEY};

/// Maximum number of funds that can be compared at once.
pub const MAX_FUNDS: usize = 4;

/// The ordered, bounded, de-duplicated fund selection.
pub struct SelectionStore {
    funds: Vec<Fund>,
    store: LocalStore,
}

impl SelectionStore {
    /// Restores the selection persisted by a previous run.
    ///
    /// The loaded list is normalized rather than trusted: duplicate scheme
    /// codes are dropped and the list is truncated to MAX_FUNDS, so the
    /// store invariant holds even over a hand-edited file.
    pub fn load(store: LocalStore) -> Self {
        let mut funds: Vec<Fund> = store
            .get(SELECTED_FUNDS_KEY)
            .unwrap_or_default();

        let before = funds.len();
        let mut seen = Vec::with_capacity(funds.len());
        funds.retain(|fund| {
            if seen.contains(&fund.scheme_code) {
                false
            } else {
                seen.push(fund.scheme_code);
                true
            }
        });
        funds.truncate(MAX_FUNDS);

        if funds.len() != before {
            warn!(
                loaded = before,
                kept = funds.len(),
                "Persisted selection violated invariants, normalized on load"
            );
        }
        debug!(funds = funds.len(), "Selection restored");

        Self { funds, store }
    }

    /// Adds a fund. Silent no-op when the scheme code is already selected
    /// or the selection is full.
    pub fn add(&mut self, fund: Fund) {
        if self.funds.len() >= MAX_FUNDS || self.contains(fund.scheme_code) {
            debug!(scheme_code = fund.scheme_code, "Add ignored (duplicate or full)");
            return;
        }
        self.funds.push(fund);
        self.persist();
    }

    /// Removes the fund with the given scheme code; no-op if absent.
    pub fn remove(&mut self, scheme_code: u32) {
        let before = self.funds.len();
        self.funds.retain(|f| f.scheme_code != scheme_code);
        if self.funds.len() != before {
            self.persist();
        }
    }

    /// Empties the selection.
    pub fn clear(&mut self) {
        if !self.funds.is_empty() {
            self.funds.clear();
            self.persist();
        }
    }

    /// Toggles a fund in or out of the selection (selection-view behavior:
    /// picking an already-selected card deselects it).
    pub fn toggle(&mut self, fund: Fund) {
        if self.contains(fund.scheme_code) {
            self.remove(fund.scheme_code);
        } else {
            self.add(fund);
        }
    }

    pub fn contains(&self, scheme_code: u32) -> bool {
        self.funds.iter().any(|f| f.scheme_code == scheme_code)
    }

    pub fn funds(&self) -> &[Fund] {
        &self.funds
    }

    pub fn scheme_codes(&self) -> Vec<u32> {
        self.funds.iter().map(|f| f.scheme_code).collect()
    }

    pub fn len(&self) -> usize {
        self.funds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funds.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.funds.len() >= MAX_FUNDS
    }

    /// True when the selection can be compared (2..=MAX_FUNDS funds).
    pub fn can_compare(&self) -> bool {
        self.funds.len() >= 2
    }

    // Fire-and-forget write-through; a failure must not turn a valid
    // mutation into an error.
    fn persist(&self) {
        if let Err(e) = self.store.set(SELECTED_FUNDS_KEY, &self.funds) {
            warn!(error = %e, "Failed to persist selection");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;

    fn temp_store(tag: &str) -> LocalStore {
        let dir = std::env::temp_dir().join(format!(
            "navscope-sel-test-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        LocalStore::open(dir).unwrap()
    }

    #[test]
    fn test_add_and_duplicate_is_noop() {
        let mut sel = SelectionStore::load(temp_store("dup"));

        sel.add(Fund::new(100, "Alpha Fund"));
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.funds()[0].scheme_name, "Alpha Fund");

        // Adding the same scheme code again changes nothing
        sel.add(Fund::new(100, "Alpha Fund"));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn test_add_beyond_max_is_noop() {
        let mut sel = SelectionStore::load(temp_store("max"));
        for code in 1..=4 {
            sel.add(Fund::new(code, format!("Fund {}", code)));
        }
        assert_eq!(sel.len(), 4);

        sel.add(Fund::new(5, "Fund 5"));
        assert_eq!(sel.len(), 4);
        assert!(!sel.contains(5));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut sel = SelectionStore::load(temp_store("rm"));
        sel.add(Fund::new(1, "F1"));

        sel.remove(99);
        assert_eq!(sel.len(), 1);

        sel.remove(1);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut sel = SelectionStore::load(temp_store("order"));
        sel.add(Fund::new(3, "C"));
        sel.add(Fund::new(1, "A"));
        sel.add(Fund::new(2, "B"));

        let codes: Vec<u32> = sel.funds().iter().map(|f| f.scheme_code).collect();
        assert_eq!(codes, vec![3, 1, 2]);
    }

    #[test]
    fn test_toggle() {
        let mut sel = SelectionStore::load(temp_store("toggle"));
        sel.toggle(Fund::new(1, "F1"));
        assert!(sel.contains(1));
        sel.toggle(Fund::new(1, "F1"));
        assert!(!sel.contains(1));
    }

    #[test]
    fn test_mutations_persist_and_reload() {
        let store = temp_store("persist");
        {
            let mut sel = SelectionStore::load(store.clone());
            sel.add(Fund::new(1, "F1"));
            sel.add(Fund::new(2, "F2"));
        }

        let sel = SelectionStore::load(store);
        assert_eq!(sel.scheme_codes(), vec![1, 2]);
    }

    #[test]
    fn test_load_normalizes_bad_snapshot() {
        let store = temp_store("normalize");
        // Hand-crafted snapshot with a duplicate and six entries
        let junk = vec![
            Fund::new(1, "A"),
            Fund::new(2, "B"),
            Fund::new(1, "A dup"),
            Fund::new(3, "C"),
            Fund::new(4, "D"),
            Fund::new(5, "E"),
        ];
        store.set(SELECTED_FUNDS_KEY, &junk).unwrap();

        let sel = SelectionStore::load(store);
        assert_eq!(sel.scheme_codes(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_can_compare() {
        let mut sel = SelectionStore::load(temp_store("compare"));
        assert!(!sel.can_compare());
        sel.add(Fund::new(1, "A"));
        assert!(!sel.can_compare());
        sel.add(Fund::new(2, "B"));
        assert!(sel.can_compare());
    }
}
