//! Insertion-ordered record collection with an id index.
//!
//! Both views are backed by one [`IndexMap`], so membership in the ordered
//! sequence and in the index cannot diverge.

use indexmap::IndexMap;

use crate::{Record, RecordError, RecordId};

/// Owns every record of one family.
#[derive(Debug, Clone)]
pub struct RecordStore<T> {
    records: IndexMap<RecordId, T>,
    /// Always greater than every id ever inserted since the last clear.
    next_id: RecordId,
}

impl<T> Default for RecordStore<T> {
    fn default() -> Self {
        Self {
            records: IndexMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Record> RecordStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and indexes it by id.
    ///
    /// Returns a reference to the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if the id is already present. The
    /// store is unchanged in that case.
    pub fn insert(&mut self, record: T) -> Result<&T, RecordError> {
        let id = record.id();
        if self.records.contains_key(&id) {
            return Err(RecordError::DuplicateId {
                family: T::FAMILY,
                id,
            });
        }

        self.next_id = self.next_id.max(id.saturating_add(1));
        let (index, _) = self.records.insert_full(id, record);
        Ok(&self.records[index])
    }

    /// Looks up a record by id.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.records.get(&id)
    }

    /// Returns `true` if a record with this id is stored.
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Swaps in a new version of an existing record, keeping its position.
    ///
    /// Returns the previous version.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if no record has this id.
    pub fn replace(&mut self, record: T) -> Result<T, RecordError> {
        let id = record.id();
        let slot = self
            .records
            .get_mut(&id)
            .ok_or_else(|| RecordError::not_found(T::FAMILY, id))?;
        Ok(std::mem::replace(slot, record))
    }

    /// Removes a record from both the sequence and the index.
    ///
    /// The remaining records keep their relative order.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if no record has this id.
    pub fn remove(&mut self, id: RecordId) -> Result<T, RecordError> {
        self.records
            .shift_remove(&id)
            .ok_or_else(|| RecordError::not_found(T::FAMILY, id))
    }

    /// Iterates records in insertion order.
    ///
    /// Calling this again restarts from the first record.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.records.values()
    }

    /// Snapshot of every id in insertion order, for callers that need to
    /// mutate the store while scanning it.
    #[must_use]
    pub fn ids(&self) -> Vec<RecordId> {
        self.records.keys().copied().collect()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The id an auto-numbered record should use next.
    #[must_use]
    pub const fn next_id(&self) -> RecordId {
        self.next_id
    }

    /// Removes every record and resets the id counter.
    pub fn clear(&mut self) {
        self.records.clear();
        self.next_id = 1;
    }
}

impl<'a, T> IntoIterator for &'a RecordStore<T> {
    type Item = &'a T;
    type IntoIter = indexmap::map::Values<'a, RecordId, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: RecordId,
        text: &'static str,
    }

    impl Record for Note {
        const FAMILY: &'static str = "Note";

        fn id(&self) -> RecordId {
            self.id
        }

        fn kind(&self) -> &str {
            "Note"
        }
    }

    const fn note(id: RecordId, text: &'static str) -> Note {
        Note { id, text }
    }

    #[test]
    fn insert_then_get_returns_equal_record() {
        let mut store = RecordStore::new();
        store.insert(note(4, "four")).unwrap();
        assert_eq!(store.get(4), Some(&note(4, "four")));
        assert!(store.contains(4));
        assert!(store.get(5).is_none());
    }

    #[test]
    fn duplicate_insert_leaves_store_unchanged() {
        let mut store = RecordStore::new();
        store.insert(note(1, "first")).unwrap();

        let err = store.insert(note(1, "second")).unwrap_err();
        assert!(matches!(
            err,
            RecordError::DuplicateId {
                family: "Note",
                id: 1
            }
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().text, "first");
    }

    #[test]
    fn remove_drops_record_from_both_views() {
        let mut store = RecordStore::new();
        for id in 1..=3 {
            store.insert(note(id, "x")).unwrap();
        }

        let removed = store.remove(2).unwrap();
        assert_eq!(removed.id, 2);
        assert!(store.get(2).is_none());
        assert_eq!(store.ids(), vec![1, 3]);
        assert!(store.remove(2).unwrap_err().is_not_found());
    }

    #[test]
    fn iteration_follows_insertion_order_and_restarts() {
        let mut store = RecordStore::new();
        for id in [7, 3, 9] {
            store.insert(note(id, "x")).unwrap();
        }

        let first: Vec<_> = store.iter().map(|n| n.id).collect();
        let second: Vec<_> = store.iter().map(|n| n.id).collect();
        assert_eq!(first, vec![7, 3, 9]);
        assert_eq!(first, second);
    }

    #[test]
    fn next_id_advances_past_caller_supplied_ids() {
        let mut store = RecordStore::new();
        assert_eq!(store.next_id(), 1);
        store.insert(note(10, "x")).unwrap();
        assert_eq!(store.next_id(), 11);
        store.insert(note(2, "x")).unwrap();
        assert_eq!(store.next_id(), 11);

        let auto = store.next_id();
        store.insert(note(auto, "auto")).unwrap();
        assert_eq!(store.next_id(), 12);
    }

    #[test]
    fn replace_keeps_position() {
        let mut store = RecordStore::new();
        store.insert(note(1, "a")).unwrap();
        store.insert(note(2, "b")).unwrap();

        let old = store.replace(note(1, "z")).unwrap();
        assert_eq!(old.text, "a");
        assert_eq!(store.ids(), vec![1, 2]);
        assert_eq!(store.get(1).unwrap().text, "z");
        assert!(store.replace(note(3, "c")).is_err());
    }
}
