//! Membership index: full email/phone digest -> breaches it appeared in

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::breach::{BreachId, BreachRecord};
use crate::catalog::BreachCatalog;
use crate::data_type::DataType;
use crate::error::Error;
use crate::hashing::{is_digest, DIGEST_HEX_LEN};
use crate::Result;

/// Identifier of an accepted membership insert.
pub type MembershipId = u32;

/// Membership insert as submitted by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMembership {
    pub data_type: String,
    pub data_hash: String,
    pub breach_ids: Vec<BreachId>,
}

impl NewMembership {
    pub fn new(data_type: DataType, data_hash: impl Into<String>, breach_ids: Vec<BreachId>) -> Self {
        Self {
            data_type: data_type.to_string(),
            data_hash: data_hash.into(),
            breach_ids,
        }
    }

    /// Validate and normalize the hash to lowercase.
    ///
    /// Breach ids are not checked against the catalog; dangling ids are
    /// dropped at read time instead.
    pub fn validate(self) -> Result<ValidMembership> {
        let data_type = self.data_type.parse::<DataType>()?;
        let data_hash = normalize_digest(&self.data_hash)?;

        if self.breach_ids.is_empty() {
            return Err(Error::EmptyBreachIds);
        }

        Ok(ValidMembership {
            data_type,
            data_hash,
            breach_ids: self.breach_ids,
        })
    }
}

/// Lowercase a digest after checking its shape.
pub fn normalize_digest(value: &str) -> Result<String> {
    if is_digest(value) {
        Ok(value.to_ascii_lowercase())
    } else {
        Err(Error::InvalidDigest {
            value: value.to_string(),
            expected: DIGEST_HEX_LEN,
        })
    }
}

/// A membership insert that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMembership {
    pub data_type: DataType,
    pub data_hash: String,
    pub breach_ids: Vec<BreachId>,
}

/// Stored membership insert, retrievable by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
    pub id: MembershipId,
    pub data_type: DataType,
    pub data_hash: String,
    pub breach_ids: Vec<BreachId>,
}

/// Response body for email and phone lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachSearchResult {
    pub found: bool,
    pub breaches: Vec<BreachRecord>,
    pub count: usize,
}

impl BreachSearchResult {
    pub fn not_found() -> Self {
        Self::default()
    }
}

/// Per-type maps from lowercase digest to breach ids, plus the insert log.
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    email: HashMap<String, Arc<[BreachId]>>,
    phone: HashMap<String, Arc<[BreachId]>>,
    records: Vec<Arc<MembershipRecord>>,
}

impl MembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn hashes(&self, data_type: DataType) -> &HashMap<String, Arc<[BreachId]>> {
        match data_type {
            DataType::Email => &self.email,
            DataType::Phone => &self.phone,
        }
    }

    fn hashes_mut(&mut self, data_type: DataType) -> &mut HashMap<String, Arc<[BreachId]>> {
        match data_type {
            DataType::Email => &mut self.email,
            DataType::Phone => &mut self.phone,
        }
    }

    /// Insert or replace the mapping for the digest (last write wins).
    pub fn record(&mut self, entry: ValidMembership) -> Arc<MembershipRecord> {
        let id = self.next_id();
        self.insert(MembershipRecord {
            id,
            data_type: entry.data_type,
            data_hash: entry.data_hash,
            breach_ids: entry.breach_ids,
        })
    }

    /// Re-apply a previously stored record, keeping its id.
    ///
    /// Ids must be contiguous from 1 and the record must pass the same
    /// validation as a fresh insert.
    pub fn restore(&mut self, record: MembershipRecord) -> Result<Arc<MembershipRecord>> {
        let expected = self.next_id();
        if record.id != expected {
            return Err(Error::OutOfSequence {
                kind: "membership",
                expected,
                found: record.id,
            });
        }

        let entry = NewMembership::new(record.data_type, record.data_hash, record.breach_ids)
            .validate()?;
        Ok(self.insert(MembershipRecord {
            id: record.id,
            data_type: entry.data_type,
            data_hash: entry.data_hash,
            breach_ids: entry.breach_ids,
        }))
    }

    fn next_id(&self) -> MembershipId {
        self.records.len() as MembershipId + 1
    }

    fn insert(&mut self, record: MembershipRecord) -> Arc<MembershipRecord> {
        let ids: Arc<[BreachId]> = Arc::from(record.breach_ids.as_slice());
        self.hashes_mut(record.data_type)
            .insert(record.data_hash.clone(), ids);

        let record = Arc::new(record);
        self.records.push(Arc::clone(&record));
        record
    }

    /// Stored ids for a digest, in insertion order.
    pub fn breach_ids(&self, data_type: DataType, data_hash: &str) -> Option<&[BreachId]> {
        self.hashes(data_type).get(data_hash).map(|ids| &ids[..])
    }

    /// Resolve a digest against the catalog.
    ///
    /// Ids with no catalog record are skipped, so `count` reflects only
    /// resolvable breaches while `found` reflects the stored entry.
    pub fn lookup(
        &self,
        catalog: &BreachCatalog,
        data_type: DataType,
        data_hash: &str,
    ) -> BreachSearchResult {
        let ids = match self.breach_ids(data_type, data_hash) {
            Some(ids) if !ids.is_empty() => ids,
            _ => return BreachSearchResult::not_found(),
        };

        let breaches: Vec<BreachRecord> = ids
            .iter()
            .filter_map(|id| catalog.get(*id))
            .cloned()
            .collect();

        let dangling = ids.len() - breaches.len();
        if dangling > 0 {
            tracing::warn!(
                data_type = %data_type,
                stored = ids.len(),
                dangling,
                "Membership entry references breaches missing from the catalog"
            );
        }

        BreachSearchResult {
            found: true,
            count: breaches.len(),
            breaches,
        }
    }

    pub fn record_by_id(&self, id: MembershipId) -> Option<&MembershipRecord> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.records.get(index).map(Arc::as_ref)
    }

    pub fn records(&self) -> impl Iterator<Item = &MembershipRecord> {
        self.records.iter().map(Arc::as_ref)
    }

    /// Number of distinct digests indexed for a data type.
    pub fn hash_count(&self, data_type: DataType) -> usize {
        self.hashes(data_type).len()
    }
}
