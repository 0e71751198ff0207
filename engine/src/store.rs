//! Dedup merge store - the authoritative local ordered collection.
//!
//! Records keep the order in which they arrived. Every operation re-establishes
//! the invariant that no two records share an identity key; replacements happen
//! in place and the sequence is never re-sorted.
//!
//! Each record carries an arrival sequence number that only grows, so the
//! sequence numbers along `records` are strictly increasing. A removed record
//! keeps its number in a [`Slot`], which is what lets [`DedupStore::restore`]
//! put it back between the same neighbours however many other removals
//! happened in between.

use crate::{Entity, RecordId};
use std::collections::HashMap;

/// Where a removed record used to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    position: usize,
    seq: u64,
}

impl Slot {
    /// Index the record had when it was removed.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Ordered, identity-deduplicated collection of records.
#[derive(Debug, Clone)]
pub struct DedupStore<T: Entity> {
    /// Records in arrival order
    records: Vec<T>,
    /// Arrival sequence number of each record, parallel to `records`
    seqs: Vec<u64>,
    /// Position of each record in `records`, by identity
    index: HashMap<RecordId, usize>,
    next_seq: u64,
}

impl<T: Entity> Default for DedupStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> DedupStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            seqs: Vec::new(),
            index: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Append a fetched page.
    ///
    /// A record whose identity is already present replaces the older one at its
    /// original position. Returns the number of records actually appended.
    pub fn merge_append(&mut self, records: impl IntoIterator<Item = T>) -> usize {
        let mut appended = 0;
        for record in records {
            if self.upsert(record).is_none() {
                appended += 1;
            }
        }
        appended
    }

    /// Replace in place if the identity exists, else append.
    ///
    /// Returns the replaced record, if any.
    pub fn upsert(&mut self, record: T) -> Option<T> {
        let id = record.id();
        match self.index.get(&id) {
            Some(&pos) => Some(std::mem::replace(&mut self.records[pos], record)),
            None => {
                self.index.insert(id, self.records.len());
                self.records.push(record);
                self.seqs.push(self.next_seq);
                self.next_seq += 1;
                None
            }
        }
    }

    /// Remove a record by identity. No-op if absent.
    ///
    /// Returns the slot it occupied and the record so it can be restored.
    pub fn remove(&mut self, id: RecordId) -> Option<(Slot, T)> {
        let pos = self.index.remove(&id)?;
        let record = self.records.remove(pos);
        let seq = self.seqs.remove(pos);
        self.reindex_from(pos);
        Some((Slot { position: pos, seq }, record))
    }

    /// Re-insert a previously removed record into its former slot.
    ///
    /// The record lands after every surviving record that arrived before it
    /// and before every one that arrived after it. Does nothing if the
    /// identity has reappeared in the meantime.
    pub fn restore(&mut self, slot: Slot, record: T) {
        let id = record.id();
        if self.index.contains_key(&id) {
            return;
        }
        let pos = self.seqs.partition_point(|&seq| seq < slot.seq);
        self.records.insert(pos, record);
        self.seqs.insert(pos, slot.seq);
        self.reindex_from(pos);
    }

    /// Read-only view of the ordered collection.
    pub fn snapshot(&self) -> &[T] {
        &self.records
    }

    /// Get a record by identity.
    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.index.get(&id).map(|&pos| &self.records[pos])
    }

    /// Check if a record exists.
    pub fn contains(&self, id: RecordId) -> bool {
        self.index.contains_key(&id)
    }

    /// Position of a record in the ordered collection.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Identity of the last record, the one a proximity observer watches.
    pub fn last_id(&self) -> Option<RecordId> {
        self.records.last().map(|record| record.id())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }

    fn reindex_from(&mut self, start: usize) {
        for (pos, record) in self.records.iter().enumerate().skip(start) {
            self.index.insert(record.id(), pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Product;

    fn product(id: RecordId, title: &str) -> Product {
        Product {
            id,
            title: title.into(),
            price: 1.0,
            stock: 1,
            description: String::new(),
            image: String::new(),
            sku: format!("SKU-{id}"),
        }
    }

    fn ids(store: &DedupStore<Product>) -> Vec<RecordId> {
        store.iter().map(|p| p.id).collect()
    }

    #[test]
    fn merge_append_preserves_arrival_order() {
        let mut store = DedupStore::new();
        let appended = store.merge_append(vec![product(3, "c"), product(1, "a")]);
        assert_eq!(appended, 2);
        store.merge_append(vec![product(2, "b")]);
        assert_eq!(ids(&store), vec![3, 1, 2]);
    }

    #[test]
    fn merge_append_collision_replaces_in_place() {
        let mut store = DedupStore::new();
        store.merge_append(vec![product(1, "a"), product(2, "b")]);

        let appended = store.merge_append(vec![product(1, "a2"), product(3, "c")]);
        assert_eq!(appended, 1);
        assert_eq!(ids(&store), vec![1, 2, 3]);
        assert_eq!(store.get(1).unwrap().title, "a2");
    }

    #[test]
    fn merge_append_collision_within_one_page() {
        let mut store = DedupStore::new();
        store.merge_append(vec![product(1, "a"), product(1, "a2")]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().title, "a2");
    }

    #[test]
    fn upsert_replaces_or_appends() {
        let mut store = DedupStore::new();
        store.merge_append(vec![product(1, "a"), product(2, "b")]);

        let previous = store.upsert(product(1, "edited"));
        assert_eq!(previous.unwrap().title, "a");
        assert_eq!(ids(&store), vec![1, 2]);

        assert!(store.upsert(product(5, "new")).is_none());
        assert_eq!(ids(&store), vec![1, 2, 5]);
    }

    #[test]
    fn remove_reindexes_following_records() {
        let mut store = DedupStore::new();
        store.merge_append(vec![product(1, "a"), product(2, "b"), product(3, "c")]);

        let (slot, removed) = store.remove(1).unwrap();
        assert_eq!(slot.position(), 0);
        assert_eq!(removed.id, 1);
        assert_eq!(store.position(3), Some(1));

        store.upsert(product(3, "c2"));
        assert_eq!(ids(&store), vec![2, 3]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut store = DedupStore::new();
        store.merge_append(vec![product(1, "a")]);
        assert!(store.remove(9).is_none());
        assert_eq!(ids(&store), vec![1]);
    }

    #[test]
    fn restore_reinserts_at_original_position() {
        let mut store = DedupStore::new();
        store.merge_append(vec![product(1, "a"), product(2, "b"), product(3, "c")]);
        let before: Vec<Product> = store.snapshot().to_vec();

        let (slot, record) = store.remove(2).unwrap();
        store.restore(slot, record);

        assert_eq!(store.snapshot(), before.as_slice());
        assert_eq!(store.position(3), Some(2));
    }

    #[test]
    fn restores_in_any_order_rebuild_original_order() {
        let mut store = DedupStore::new();
        store.merge_append((1..=5).map(|id| product(id, "p")));

        let (slot2, two) = store.remove(2).unwrap();
        let (slot3, three) = store.remove(3).unwrap();
        let (slot1, one) = store.remove(1).unwrap();
        assert_eq!(ids(&store), vec![4, 5]);

        store.restore(slot3, three);
        assert_eq!(ids(&store), vec![3, 4, 5]);
        store.restore(slot1, one);
        store.restore(slot2, two);
        assert_eq!(ids(&store), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn restore_goes_before_later_arrivals() {
        let mut store = DedupStore::new();
        store.merge_append(vec![product(1, "a"), product(2, "b")]);

        let (slot, record) = store.remove(2).unwrap();
        store.merge_append(vec![product(3, "c")]);
        store.restore(slot, record);
        assert_eq!(ids(&store), vec![1, 2, 3]);
    }

    #[test]
    fn restore_skips_identity_already_present() {
        let mut store = DedupStore::new();
        store.merge_append(vec![product(1, "a"), product(2, "b")]);

        let (slot, _) = store.remove(2).unwrap();
        store.upsert(product(2, "again"));
        store.restore(slot, product(2, "stale"));
        assert_eq!(ids(&store), vec![1, 2]);
        assert_eq!(store.get(2).unwrap().title, "again");
    }

    #[test]
    fn last_id_tracks_tail() {
        let mut store = DedupStore::new();
        assert_eq!(store.last_id(), None);
        store.merge_append(vec![product(1, "a"), product(2, "b")]);
        assert_eq!(store.last_id(), Some(2));
        store.remove(2);
        assert_eq!(store.last_id(), Some(1));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        #[derive(Debug, Clone)]
        enum StoreOp {
            Merge(Vec<RecordId>),
            Upsert(RecordId),
            Remove(RecordId),
            RemoveRestore(RecordId),
        }

        fn arb_op() -> impl Strategy<Value = StoreOp> {
            prop_oneof![
                prop::collection::vec(0u64..20, 0..6).prop_map(StoreOp::Merge),
                (0u64..20).prop_map(StoreOp::Upsert),
                (0u64..20).prop_map(StoreOp::Remove),
                (0u64..20).prop_map(StoreOp::RemoveRestore),
            ]
        }

        proptest! {
            #[test]
            fn prop_identities_stay_distinct(ops in prop::collection::vec(arb_op(), 0..40)) {
                let mut store = DedupStore::new();

                for op in ops {
                    match op {
                        StoreOp::Merge(page) => {
                            store.merge_append(page.into_iter().map(|id| product(id, "m")));
                        }
                        StoreOp::Upsert(id) => {
                            store.upsert(product(id, "u"));
                        }
                        StoreOp::Remove(id) => {
                            store.remove(id);
                        }
                        StoreOp::RemoveRestore(id) => {
                            if let Some((slot, record)) = store.remove(id) {
                                store.restore(slot, record);
                            }
                        }
                    }

                    let seen: HashSet<RecordId> = store.iter().map(|p| p.id).collect();
                    prop_assert_eq!(seen.len(), store.len());
                    for (pos, record) in store.iter().enumerate() {
                        prop_assert_eq!(store.position(record.id), Some(pos));
                    }
                }
            }

            #[test]
            fn prop_remove_restore_is_identity(
                page in prop::collection::hash_set(0u64..50, 1..15),
                pick in any::<prop::sample::Index>(),
            ) {
                let mut store = DedupStore::new();
                store.merge_append(page.into_iter().map(|id| product(id, "p")));
                let before = store.snapshot().to_vec();

                let target = before[pick.index(before.len())].id;
                let (slot, record) = store.remove(target).unwrap();
                store.restore(slot, record);

                prop_assert_eq!(store.snapshot(), before.as_slice());
            }

            #[test]
            fn prop_interleaved_restores_keep_order(
                page in prop::collection::hash_set(0u64..50, 1..15),
                picks in prop::collection::vec(any::<prop::sample::Index>(), 1..6),
                undo_order in any::<prop::sample::Index>(),
            ) {
                let mut store = DedupStore::new();
                store.merge_append(page.into_iter().map(|id| product(id, "p")));
                let before = store.snapshot().to_vec();

                let mut removed = Vec::new();
                for pick in picks {
                    let target = before[pick.index(before.len())].id;
                    if let Some(entry) = store.remove(target) {
                        removed.push(entry);
                    }
                }

                // Undo in a rotated order rather than strict reverse.
                let len = removed.len();
                removed.rotate_left(undo_order.index(len));
                for (slot, record) in removed {
                    store.restore(slot, record);
                }

                prop_assert_eq!(store.snapshot(), before.as_slice());
            }
        }
    }
}
