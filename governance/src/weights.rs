//! Delegate weight table.
//!
//! The authoritative copy lives in the store; this in-memory table is rebuilt
//! once at start-up and then kept in step with every committed weight change,
//! so quorum evaluation and delegate votes never scan the store.

use std::collections::HashMap;

use guardian_types::Principal;

use crate::GovernanceError;

/// A validated, not yet applied weight change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightChange {
    pub delegate: Principal,
    pub old_weight: u128,
    pub new_weight: u128,
    pub new_total: u128,
}

/// delegate → weight, plus the running total of all weights.
///
/// Zero-weight delegates have no entry, so the total always equals the sum
/// of the entries.
#[derive(Clone, Debug, Default)]
pub struct DelegateWeightTable {
    weights: HashMap<Principal, u128>,
    total_weight: u128,
}

impl DelegateWeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from stored entries.
    pub fn rebuild(
        entries: impl IntoIterator<Item = (Principal, u128)>,
    ) -> Result<Self, GovernanceError> {
        let mut table = Self::new();
        for (delegate, weight) in entries {
            if weight == 0 {
                continue;
            }
            let entry = table.weights.entry(delegate).or_insert(0);
            *entry = entry
                .checked_add(weight)
                .ok_or(GovernanceError::Overflow("delegate weight"))?;
            table.total_weight = table
                .total_weight
                .checked_add(weight)
                .ok_or(GovernanceError::Overflow("delegate weight total"))?;
        }
        Ok(table)
    }

    /// Compute the effect of setting `delegate` to `new_weight`.
    ///
    /// The old weight is subtracted before the new one is added, so the total
    /// cannot underflow while the table is consistent.
    pub fn preview(&self, delegate: &Principal, new_weight: u128) -> Result<WeightChange, GovernanceError> {
        let old_weight = self.weight(delegate);
        let new_total = self
            .total_weight
            .checked_sub(old_weight)
            .and_then(|t| t.checked_add(new_weight))
            .ok_or(GovernanceError::Overflow("delegate weight total"))?;
        Ok(WeightChange {
            delegate: delegate.clone(),
            old_weight,
            new_weight,
            new_total,
        })
    }

    /// Apply a change produced by [`preview`](Self::preview) on this table.
    pub fn apply(&mut self, change: &WeightChange) {
        if change.new_weight == 0 {
            self.weights.remove(&change.delegate);
        } else {
            self.weights.insert(change.delegate.clone(), change.new_weight);
        }
        self.total_weight = change.new_total;
    }

    /// A delegate's current weight. Returns 0 if not found.
    pub fn weight(&self, delegate: &Principal) -> u128 {
        self.weights.get(delegate).copied().unwrap_or(0)
    }

    pub fn total_weight(&self) -> u128 {
        self.total_weight
    }

    pub fn delegate_count(&self) -> usize {
        self.weights.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Principal, u128)> {
        self.weights.iter().map(|(p, w)| (p, *w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(name: &str) -> Principal {
        Principal::new(name)
    }

    fn set(table: &mut DelegateWeightTable, name: &str, weight: u128) {
        let change = table.preview(&d(name), weight).unwrap();
        table.apply(&change);
    }

    #[test]
    fn new_table_is_empty() {
        let table = DelegateWeightTable::new();
        assert_eq!(table.total_weight(), 0);
        assert_eq!(table.delegate_count(), 0);
        assert_eq!(table.weight(&d("alice")), 0);
    }

    #[test]
    fn set_replaces_rather_than_adds() {
        let mut table = DelegateWeightTable::new();
        set(&mut table, "alice", 600);
        set(&mut table, "bob", 400);
        set(&mut table, "alice", 100);
        assert_eq!(table.weight(&d("alice")), 100);
        assert_eq!(table.total_weight(), 500);
    }

    #[test]
    fn zero_weight_removes_entry() {
        let mut table = DelegateWeightTable::new();
        set(&mut table, "alice", 600);
        set(&mut table, "alice", 0);
        assert_eq!(table.delegate_count(), 0);
        assert_eq!(table.total_weight(), 0);
    }

    #[test]
    fn preview_does_not_mutate() {
        let mut table = DelegateWeightTable::new();
        set(&mut table, "alice", 10);
        let change = table.preview(&d("alice"), 25).unwrap();
        assert_eq!(change.old_weight, 10);
        assert_eq!(change.new_total, 25);
        assert_eq!(table.weight(&d("alice")), 10);
        assert_eq!(table.total_weight(), 10);
    }

    #[test]
    fn preview_reports_overflow() {
        let mut table = DelegateWeightTable::new();
        set(&mut table, "alice", u128::MAX);
        assert!(matches!(
            table.preview(&d("bob"), 1),
            Err(GovernanceError::Overflow(_))
        ));
        // Replacing the same delegate's weight still works.
        assert!(table.preview(&d("alice"), u128::MAX - 1).is_ok());
    }

    #[test]
    fn rebuild_sums_entries_and_skips_zero() {
        let table =
            DelegateWeightTable::rebuild(vec![(d("a"), 300), (d("b"), 0), (d("c"), 700)]).unwrap();
        assert_eq!(table.total_weight(), 1000);
        assert_eq!(table.delegate_count(), 2);
        assert_eq!(table.weight(&d("c")), 700);
    }

    #[test]
    fn rebuild_rejects_overflowing_total() {
        let result = DelegateWeightTable::rebuild(vec![(d("a"), u128::MAX), (d("b"), 1)]);
        assert!(matches!(result, Err(GovernanceError::Overflow(_))));
    }
}
