//! Storage seam between the query service and the indexes
//!
//! [`BreachStore`] is what the query service talks to. Two implementations:
//! - [`MemoryStore`]: the in-memory reference store
//! - [`FileStore`]: the same store, written through to a snapshot file
//!
//! Reads must never observe a half-applied write. Both implementations get
//! this by publishing whole [`Snapshot`](breachcheck_core::Snapshot)s.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use breachcheck_core::{
    BreachId, BreachRecord, BreachSearchResult, DataType, HashPrefix, MembershipId,
    MembershipRecord, NewBreach, NewMembership, NewPasswordPrefix, PasswordPrefixEntry,
    PrefixRange, SeedBatch, SeedOutcome, SnapshotStats,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Input rejected while applying a write. Nothing was stored.
    #[error(transparent)]
    Validation(#[from] breachcheck_core::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Codec(#[from] bincode::Error),

    /// Snapshot decoded but holds records that fail validation.
    #[error("Corrupt snapshot: {0}")]
    Corrupt(#[source] breachcheck_core::Error),

    #[error("Unsupported snapshot format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Backing store for breach records and both lookup indexes.
///
/// Writes are serialized by the implementation. Reads may run concurrently
/// with writes and see either the state before or after each write.
pub trait BreachStore: Send + Sync {
    /// `data_hash` is a validated, lowercase digest.
    fn search(&self, data_type: DataType, data_hash: &str) -> StoreResult<BreachSearchResult>;

    fn prefix_range(&self, prefix: &HashPrefix) -> StoreResult<PrefixRange>;

    fn breach(&self, id: BreachId) -> StoreResult<Option<BreachRecord>>;

    fn breaches(&self) -> StoreResult<Vec<BreachRecord>>;

    fn membership(&self, id: MembershipId) -> StoreResult<Option<MembershipRecord>>;

    fn password_prefix(&self, prefix: &HashPrefix) -> StoreResult<Option<PasswordPrefixEntry>>;

    fn stats(&self) -> StoreResult<SnapshotStats>;

    fn add_breach(&self, new: NewBreach) -> StoreResult<BreachRecord>;

    fn record_membership(&self, new: NewMembership) -> StoreResult<MembershipRecord>;

    fn record_prefix(&self, new: NewPasswordPrefix) -> StoreResult<PasswordPrefixEntry>;

    /// Apply `batch` atomically if, and only if, the catalog is empty.
    fn seed(&self, batch: &SeedBatch) -> StoreResult<SeedOutcome>;
}
