//! Snapshot: the catalog and both indexes as one immutable value
//!
//! Stores publish a `Snapshot` to readers as a unit. Writers mutate a private
//! clone and swap it in, so readers never see a half-applied insert (in
//! particular, never a suffix list without its counts).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::breach::{BreachId, BreachRecord, NewBreach};
use crate::catalog::BreachCatalog;
use crate::data_type::DataType;
use crate::membership::{
    BreachSearchResult, MembershipId, MembershipIndex, MembershipRecord, NewMembership,
};
use crate::prefix::{HashPrefix, NewPasswordPrefix, PasswordPrefixEntry, PrefixIndex, PrefixRange};
use crate::Result;

/// Version tag written with [`PersistedState`].
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    catalog: BreachCatalog,
    membership: MembershipIndex,
    prefixes: PrefixIndex,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &BreachCatalog {
        &self.catalog
    }

    pub fn membership(&self) -> &MembershipIndex {
        &self.membership
    }

    pub fn prefixes(&self) -> &PrefixIndex {
        &self.prefixes
    }

    pub fn add_breach(&mut self, new: NewBreach) -> Result<BreachRecord> {
        let record = self.catalog.add(new)?;
        Ok(BreachRecord::clone(&record))
    }

    pub fn record_membership(&mut self, new: NewMembership) -> Result<MembershipRecord> {
        let entry = new.validate()?;
        let record = self.membership.record(entry);
        Ok(MembershipRecord::clone(&record))
    }

    pub fn record_prefix(&mut self, new: NewPasswordPrefix) -> Result<PasswordPrefixEntry> {
        let entry = new.validate()?;
        let entry = self.prefixes.record(entry);
        Ok(PasswordPrefixEntry::clone(&entry))
    }

    /// `data_hash` must already be normalized to lowercase.
    pub fn search(&self, data_type: DataType, data_hash: &str) -> BreachSearchResult {
        self.membership.lookup(&self.catalog, data_type, data_hash)
    }

    pub fn prefix_range(&self, prefix: &HashPrefix) -> PrefixRange {
        self.prefixes.lookup(prefix)
    }

    pub fn breach(&self, id: BreachId) -> Option<BreachRecord> {
        self.catalog.get(id).cloned()
    }

    pub fn membership_record(&self, id: MembershipId) -> Option<MembershipRecord> {
        self.membership.record_by_id(id).cloned()
    }

    pub fn prefix_entry(&self, prefix: &HashPrefix) -> Option<PasswordPrefixEntry> {
        self.prefixes.get(prefix).cloned()
    }

    /// Apply `batch` only if the catalog is empty.
    ///
    /// On error the snapshot may be partially modified; callers apply batches
    /// to a scratch clone.
    pub fn seed(&mut self, batch: &SeedBatch) -> Result<SeedOutcome> {
        if !self.catalog.is_empty() {
            return Ok(SeedOutcome::AlreadySeeded);
        }

        for breach in &batch.breaches {
            self.catalog.add(breach.clone())?;
        }

        for membership in &batch.memberships {
            let breach_ids: Vec<BreachId> = membership
                .breaches
                .iter()
                .filter_map(|name| self.catalog.find_by_name(name).map(|r| r.id))
                .collect();

            self.record_membership(NewMembership::new(
                membership.data_type,
                membership.data_hash.clone(),
                breach_ids,
            ))?;
        }

        for prefix in &batch.prefixes {
            self.record_prefix(prefix.clone())?;
        }

        Ok(SeedOutcome::Seeded {
            breaches: batch.breaches.len(),
        })
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            breaches: self.catalog.len(),
            email_hashes: self.membership.hash_count(DataType::Email),
            phone_hashes: self.membership.hash_count(DataType::Phone),
            prefixes: self.prefixes.len(),
        }
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            version: SNAPSHOT_FORMAT_VERSION,
            breaches: self.catalog.list(),
            memberships: self.membership.records().cloned().collect(),
            prefixes: self.prefixes.entries().into_iter().cloned().collect(),
        }
    }

    /// Rebuild indexes from persisted records, replaying memberships in
    /// insertion order so later records win.
    ///
    /// Every record is revalidated; a state that could not have been built
    /// through inserts is rejected as a whole.
    pub fn from_persisted(state: PersistedState) -> Result<Self> {
        let mut snapshot = Self::new();

        for record in state.breaches {
            snapshot.catalog.restore(record)?;
        }
        for record in state.memberships {
            snapshot.membership.restore(record)?;
        }
        for entry in state.prefixes {
            snapshot.prefixes.record(entry);
        }

        Ok(snapshot)
    }
}

/// Shared handle type stores hand to readers.
pub type SharedSnapshot = Arc<Snapshot>;

/// Counts reported by health checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub breaches: usize,
    pub email_hashes: usize,
    pub phone_hashes: usize,
    pub prefixes: usize,
}

/// Result of a seed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { breaches: usize },
    AlreadySeeded,
}

impl SeedOutcome {
    pub fn seeded(&self) -> bool {
        matches!(self, SeedOutcome::Seeded { .. })
    }
}

/// Fixed data applied once to an empty store.
#[derive(Debug, Clone, Default)]
pub struct SeedBatch {
    pub breaches: Vec<NewBreach>,
    pub memberships: Vec<SeedMembership>,
    pub prefixes: Vec<NewPasswordPrefix>,
}

/// Membership that names its breaches rather than their (not yet assigned) ids.
#[derive(Debug, Clone)]
pub struct SeedMembership {
    pub data_type: DataType,
    pub data_hash: String,
    pub breaches: Vec<String>,
}

/// On-disk form of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub breaches: Vec<BreachRecord>,
    pub memberships: Vec<MembershipRecord>,
    pub prefixes: Vec<PasswordPrefixEntry>,
}
