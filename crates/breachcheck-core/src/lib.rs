//! breachcheck-core: Hashing, data model and lookup indexes for breach checks
//!
//! Lets a client learn whether an email address, phone number or password
//! appears in a breach corpus without handing the secret to the server.
//!
//! # Privacy Model
//!
//! | Lookup | Sent to server | Server learns |
//! |--------|----------------|---------------|
//! | Email / phone | full SHA-1 of the normalized value | the digest (linkable, not reversible for high-entropy values) |
//! | Password | first 5 hex chars of SHA-1 | one of 16^5 ≈ 1M buckets |
//!
//! For passwords the server returns every (suffix, count) pair in the bucket
//! and the client matches its own suffix locally
//! ([`PrefixRange::check`]). Moving that comparison server-side would
//! disclose the full digest and break the k-anonymity property.
//!
//! # Layout
//!
//! - [`hashing`]: digests and the prefix/suffix split
//! - [`BreachCatalog`]: breach records keyed by sequential id
//! - [`MembershipIndex`]: email/phone digest -> breach ids
//! - [`PrefixIndex`]: prefix -> parallel suffix/count arrays
//! - [`Snapshot`]: all three as one immutable, swappable value

mod breach;
mod catalog;
mod data_type;
mod error;
pub mod hashing;
mod membership;
mod prefix;
pub mod seed;
mod snapshot;

pub use breach::{BreachId, BreachRecord, NewBreach};
pub use catalog::BreachCatalog;
pub use data_type::DataType;
pub use error::Error;
pub use hashing::{digest, is_digest, password_digest_parts, PasswordDigestParts};
pub use membership::{
    normalize_digest, BreachSearchResult, MembershipId, MembershipIndex, MembershipRecord,
    NewMembership, ValidMembership,
};
pub use prefix::{
    HashPrefix, NewPasswordPrefix, PasswordCheckResult, PasswordPrefixEntry, PrefixIndex,
    PrefixRange,
};
pub use seed::demo_seed;
pub use snapshot::{
    PersistedState, SeedBatch, SeedMembership, SeedOutcome, SharedSnapshot, Snapshot,
    SnapshotStats, SNAPSHOT_FORMAT_VERSION,
};

pub type Result<T> = std::result::Result<T, Error>;
