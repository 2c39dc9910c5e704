//! In-memory store with lock-free reads
//!
//! Readers `load()` the current snapshot from an [`ArcSwap`]. Writers take a
//! single mutex, clone the snapshot, apply their change to the clone and
//! `store()` it. Index values sit behind `Arc`, so the clone copies map
//! entries, not record bodies.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use breachcheck_core::{
    BreachId, BreachRecord, BreachSearchResult, DataType, HashPrefix, MembershipId,
    MembershipRecord, NewBreach, NewMembership, NewPasswordPrefix, PasswordPrefixEntry,
    PrefixRange, SeedBatch, SeedOutcome, SharedSnapshot, Snapshot, SnapshotStats,
};

use super::{BreachStore, StoreResult};

pub struct MemoryStore {
    current: ArcSwap<Snapshot>,
    writer: Mutex<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::new())
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
            writer: Mutex::new(()),
        }
    }

    /// Current snapshot. Stays valid (and unchanged) while held.
    pub fn load(&self) -> SharedSnapshot {
        self.current.load_full()
    }

    /// Apply a write under the writer lock.
    ///
    /// `commit` sees the new snapshot before it is published; if it fails the
    /// write is discarded and readers keep the previous snapshot.
    pub(crate) fn write<R>(
        &self,
        apply: impl FnOnce(&mut Snapshot) -> StoreResult<R>,
        commit: impl FnOnce(&Snapshot) -> StoreResult<()>,
    ) -> StoreResult<R> {
        // The guarded value is (), so a poisoned lock carries no broken state.
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = Snapshot::clone(&self.current.load());
        let result = apply(&mut next)?;
        commit(&next)?;
        self.current.store(Arc::new(next));

        Ok(result)
    }

    fn apply<R>(&self, apply: impl FnOnce(&mut Snapshot) -> StoreResult<R>) -> StoreResult<R> {
        self.write(apply, |_| Ok(()))
    }
}

impl BreachStore for MemoryStore {
    fn search(&self, data_type: DataType, data_hash: &str) -> StoreResult<BreachSearchResult> {
        Ok(self.load().search(data_type, data_hash))
    }

    fn prefix_range(&self, prefix: &HashPrefix) -> StoreResult<PrefixRange> {
        Ok(self.load().prefix_range(prefix))
    }

    fn breach(&self, id: BreachId) -> StoreResult<Option<BreachRecord>> {
        Ok(self.load().breach(id))
    }

    fn breaches(&self) -> StoreResult<Vec<BreachRecord>> {
        Ok(self.load().catalog().list())
    }

    fn membership(&self, id: MembershipId) -> StoreResult<Option<MembershipRecord>> {
        Ok(self.load().membership_record(id))
    }

    fn password_prefix(&self, prefix: &HashPrefix) -> StoreResult<Option<PasswordPrefixEntry>> {
        Ok(self.load().prefix_entry(prefix))
    }

    fn stats(&self) -> StoreResult<SnapshotStats> {
        Ok(self.load().stats())
    }

    fn add_breach(&self, new: NewBreach) -> StoreResult<BreachRecord> {
        self.apply(|snapshot| Ok(snapshot.add_breach(new)?))
    }

    fn record_membership(&self, new: NewMembership) -> StoreResult<MembershipRecord> {
        self.apply(|snapshot| Ok(snapshot.record_membership(new)?))
    }

    fn record_prefix(&self, new: NewPasswordPrefix) -> StoreResult<PasswordPrefixEntry> {
        self.apply(|snapshot| Ok(snapshot.record_prefix(new)?))
    }

    fn seed(&self, batch: &SeedBatch) -> StoreResult<SeedOutcome> {
        self.apply(|snapshot| Ok(snapshot.seed(batch)?))
    }
}
