//! Mutation and query layer over a [`RecordStore`].
//!
//! A [`RecordManager`] pairs a store with a [`Tally`], an incrementally
//! maintained set of aggregates. Every operation that changes membership or
//! field values updates the tally in the same call, and
//! [`RecordManager::recompute_statistics`] rebuilds it from scratch so the
//! two can be compared.

use std::collections::BTreeMap;

use crate::{Prioritized, Record, RecordError, RecordId, RecordStore};

/// Aggregates maintained alongside a store.
///
/// `retract` must be the exact inverse of `absorb` for the same record.
pub trait Tally<T>: Default {
    /// Accounts for a record entering the store.
    fn absorb(&mut self, record: &T);

    /// Reverses [`Tally::absorb`] for a record leaving the store.
    fn retract(&mut self, record: &T);
}

impl<T> Tally<T> for () {
    fn absorb(&mut self, _record: &T) {}

    fn retract(&mut self, _record: &T) {}
}

/// Record counts keyed by kind.
///
/// Kinds whose count drops to zero are removed so that an incrementally
/// maintained instance compares equal to a freshly built one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindCounts {
    counts: BTreeMap<String, usize>,
    total: usize,
}

impl KindCounts {
    /// Counts one more record of `kind`.
    pub fn increment(&mut self, kind: &str) {
        *self.counts.entry(kind.to_string()).or_insert(0) += 1;
        self.total += 1;
    }

    /// Counts one fewer record of `kind`.
    pub fn decrement(&mut self, kind: &str) {
        if let Some(count) = self.counts.get_mut(kind) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(kind);
            }
            self.total -= 1;
        }
    }

    /// Number of records of `kind`.
    #[must_use]
    pub fn get(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    /// Number of records across all kinds.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Share of the total held by `kind`, in percent. Zero when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self, kind: &str) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.get(kind) as f64 * 100.0 / self.total as f64
    }

    /// Iterates `(kind, count, percentage)` in kind order.
    pub fn breakdown(&self) -> impl Iterator<Item = (&str, usize, f64)> + '_ {
        self.counts
            .iter()
            .map(|(kind, &count)| (kind.as_str(), count, self.percentage(kind)))
    }
}

impl<T: Record> Tally<T> for KindCounts {
    fn absorb(&mut self, record: &T) {
        self.increment(record.kind());
    }

    fn retract(&mut self, record: &T) {
        self.decrement(record.kind());
    }
}

/// Owns one family's store and its running aggregates.
#[derive(Debug, Clone)]
pub struct RecordManager<T, S = ()> {
    store: RecordStore<T>,
    tally: S,
}

impl<T: Record, S: Tally<T>> Default for RecordManager<T, S> {
    fn default() -> Self {
        Self {
            store: RecordStore::new(),
            tally: S::default(),
        }
    }
}

impl<T: Record, S: Tally<T>> RecordManager<T, S> {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the underlying store.
    #[must_use]
    pub const fn store(&self) -> &RecordStore<T> {
        &self.store
    }

    /// Inserts a record and accounts for it in the tally.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if the id is taken.
    pub fn insert(&mut self, record: T) -> Result<RecordId, RecordError> {
        let stored = self.store.insert(record)?;
        self.tally.absorb(stored);
        Ok(stored.id())
    }

    /// Looks up a record, reporting absence as an error.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if no record has this id.
    pub fn find(&self, id: RecordId) -> Result<&T, RecordError> {
        self.store
            .get(id)
            .ok_or_else(|| RecordError::not_found(T::FAMILY, id))
    }

    /// Looks up a record, reporting absence as `None`.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.store.get(id)
    }

    /// Iterates records in insertion order.
    pub fn list(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.store.iter()
    }

    /// Collects the records matching `predicate`, in insertion order.
    pub fn filter<P>(&self, mut predicate: P) -> Vec<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.store.iter().filter(|r| predicate(r)).collect()
    }

    /// Collects the records of one kind, in insertion order.
    #[must_use]
    pub fn filter_by_kind(&self, kind: &str) -> Vec<&T> {
        self.filter(|r| r.kind() == kind)
    }

    /// Applies `apply` to a copy of the record and commits it if it succeeds.
    ///
    /// On error the stored record and the tally are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the id is absent, an
    /// [`RecordError::InvalidField`] if `apply` tries to change the id, or
    /// whatever `apply` returns.
    pub fn update<F, E>(&mut self, id: RecordId, apply: F) -> Result<&T, E>
    where
        F: FnOnce(&mut T) -> Result<(), E>,
        E: From<RecordError>,
    {
        let mut next = self.find(id)?.clone();
        apply(&mut next)?;
        if next.id() != id {
            return Err(crate::fields::immutable_id().into());
        }

        let previous = self.store.replace(next)?;
        self.tally.retract(&previous);
        let stored = self
            .store
            .get(id)
            .ok_or_else(|| RecordError::not_found(T::FAMILY, id))?;
        self.tally.absorb(stored);
        Ok(stored)
    }

    /// Removes a record and reverses its contribution to the tally.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the id is absent.
    pub fn delete(&mut self, id: RecordId) -> Result<T, RecordError> {
        let removed = self.store.remove(id)?;
        self.tally.retract(&removed);
        Ok(removed)
    }

    /// The incrementally maintained aggregates.
    #[must_use]
    pub const fn statistics(&self) -> &S {
        &self.tally
    }

    /// Rebuilds the aggregates from the current records.
    #[must_use]
    pub fn recompute_statistics(&self) -> S {
        let mut tally = S::default();
        for record in &self.store {
            tally.absorb(record);
        }
        tally
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The id an auto-numbered record should use next.
    #[must_use]
    pub const fn next_id(&self) -> RecordId {
        self.store.next_id()
    }

    /// Removes every record and resets the tally.
    pub fn clear(&mut self) {
        self.store.clear();
        self.tally = S::default();
    }

    /// Replaces the whole contents with `records`.
    ///
    /// Returns the number of records loaded.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if `records` repeats an id. The
    /// manager is left empty in that case.
    pub fn replace_all<I>(&mut self, records: I) -> Result<usize, RecordError>
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        for record in records {
            if let Err(e) = self.insert(record) {
                self.clear();
                return Err(e);
            }
        }
        Ok(self.len())
    }
}

impl<T: Record + Prioritized, S: Tally<T>> RecordManager<T, S> {
    /// Records ordered by descending priority.
    ///
    /// The sort is stable, so records with equal priority keep their
    /// insertion order.
    #[must_use]
    pub fn list_sorted_by_priority(&self) -> Vec<&T> {
        let mut sorted: Vec<&T> = self.store.iter().collect();
        sorted.sort_by(|a, b| b.priority().total_cmp(&a.priority()));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Ticket {
        id: RecordId,
        kind: &'static str,
        amount: i64,
        score: f64,
    }

    impl Record for Ticket {
        const FAMILY: &'static str = "Ticket";

        fn id(&self) -> RecordId {
            self.id
        }

        fn kind(&self) -> &str {
            self.kind
        }
    }

    impl Prioritized for Ticket {
        fn priority(&self) -> f64 {
            self.score
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct TicketTally {
        by_kind: KindCounts,
        total_amount: i64,
    }

    impl Tally<Ticket> for TicketTally {
        fn absorb(&mut self, t: &Ticket) {
            self.by_kind.increment(t.kind);
            self.total_amount += t.amount;
        }

        fn retract(&mut self, t: &Ticket) {
            self.by_kind.decrement(t.kind);
            self.total_amount -= t.amount;
        }
    }

    const fn ticket(id: RecordId, kind: &'static str, amount: i64, score: f64) -> Ticket {
        Ticket {
            id,
            kind,
            amount,
            score,
        }
    }

    fn manager() -> RecordManager<Ticket, TicketTally> {
        let mut m = RecordManager::new();
        m.insert(ticket(1, "Parking", 50, 1.0)).unwrap();
        m.insert(ticket(2, "Speeding", 200, 3.0)).unwrap();
        m.insert(ticket(3, "Parking", 75, 3.0)).unwrap();
        m
    }

    #[test]
    fn tally_tracks_inserts_and_deletes() {
        let mut m = manager();
        assert_eq!(m.statistics().total_amount, 325);
        assert_eq!(m.statistics().by_kind.get("Parking"), 2);

        m.delete(1).unwrap();
        assert_eq!(m.statistics().total_amount, 275);
        assert_eq!(m.statistics().by_kind.get("Parking"), 1);
        assert_eq!(*m.statistics(), m.recompute_statistics());
    }

    #[test]
    fn update_adjusts_tally_and_keeps_order() {
        let mut m = manager();
        m.update(2, |t: &mut Ticket| -> Result<(), RecordError> {
            t.kind = "Parking";
            t.amount = 10;
            Ok(())
        })
        .unwrap();

        assert_eq!(m.statistics().by_kind.get("Speeding"), 0);
        assert_eq!(m.statistics().by_kind.get("Parking"), 3);
        assert_eq!(m.statistics().total_amount, 135);
        assert_eq!(*m.statistics(), m.recompute_statistics());
        assert_eq!(m.store().ids(), vec![1, 2, 3]);
    }

    #[test]
    fn failed_update_changes_nothing() {
        let mut m = manager();
        let result = m.update(2, |t: &mut Ticket| {
            t.amount = 0;
            Err(RecordError::invalid_field("amount", "rejected"))
        });

        assert!(result.is_err());
        assert_eq!(m.get(2).unwrap().amount, 200);
        assert_eq!(m.statistics().total_amount, 325);
    }

    #[test]
    fn update_cannot_change_id() {
        let mut m = manager();
        let result = m.update(2, |t: &mut Ticket| -> Result<(), RecordError> {
            t.id = 99;
            Ok(())
        });

        assert!(matches!(result, Err(RecordError::InvalidField { .. })));
        assert!(m.get(2).is_some());
        assert!(m.get(99).is_none());
    }

    #[test]
    fn update_and_delete_of_missing_id_report_not_found() {
        let mut m = manager();
        let result = m.update(42, |_t: &mut Ticket| -> Result<(), RecordError> { Ok(()) });
        assert!(result.unwrap_err().is_not_found());
        assert!(m.delete(42).unwrap_err().is_not_found());
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn priority_sort_is_descending_and_stable() {
        let m = manager();
        let ids: Vec<_> = m.list_sorted_by_priority().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn replace_all_rejects_duplicates_and_empties() {
        let mut m = manager();
        let result = m.replace_all(vec![ticket(5, "Parking", 1, 0.0), ticket(5, "Parking", 2, 0.0)]);

        assert!(matches!(result, Err(RecordError::DuplicateId { id: 5, .. })));
        assert!(m.is_empty());
        assert_eq!(*m.statistics(), TicketTally::default());
    }

    #[test]
    fn kind_counts_percentages() {
        let m = manager();
        let counts = &m.statistics().by_kind;
        let breakdown: Vec<_> = counts.breakdown().collect();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].0, "Parking");
        assert_eq!(breakdown[0].1, 2);
        assert!((counts.percentage("Speeding") - 100.0 / 3.0).abs() < 1e-9);
        assert!(KindCounts::default().percentage("Parking").abs() < f64::EPSILON);
    }
}
