//! Query service: validation, lookups and admin writes over a [`BreachStore`]
//!
//! Every input is validated here before the store is touched, so a store
//! only ever sees lowercase 40-hex digests and well-formed prefixes.

use std::sync::Arc;
use std::time::Instant;

use breachcheck_core::{
    demo_seed, normalize_digest, BreachId, BreachRecord, BreachSearchResult, DataType,
    HashPrefix, MembershipId, MembershipRecord, NewBreach, NewMembership, NewPasswordPrefix,
    PasswordPrefixEntry, PrefixRange, SeedBatch, SeedOutcome, SnapshotStats,
};

use crate::error::{Result, ServerError};
use crate::metrics;
use crate::store::BreachStore;

pub struct QueryService {
    store: Arc<dyn BreachStore>,
    seed: SeedBatch,
}

impl QueryService {
    /// Service over `store`, seeding from the built-in demo data.
    pub fn new(store: Arc<dyn BreachStore>) -> Self {
        Self::with_seed(store, demo_seed())
    }

    pub fn with_seed(store: Arc<dyn BreachStore>, seed: SeedBatch) -> Self {
        Self { store, seed }
    }

    pub fn query_email(&self, data_hash: &str) -> Result<BreachSearchResult> {
        self.query_membership(DataType::Email, data_hash)
    }

    pub fn query_phone(&self, data_hash: &str) -> Result<BreachSearchResult> {
        self.query_membership(DataType::Phone, data_hash)
    }

    fn query_membership(&self, data_type: DataType, data_hash: &str) -> Result<BreachSearchResult> {
        let start = Instant::now();
        let kind = data_type.as_str();

        let result = normalize_digest(data_hash)
            .map_err(ServerError::from)
            .and_then(|hash| Ok(self.store.search(data_type, &hash)?));

        let outcome = match &result {
            Ok(r) if r.found => "found",
            Ok(_) => "not_found",
            Err(ServerError::Validation(_)) => "rejected",
            Err(_) => "error",
        };
        metrics::record_lookup(kind, outcome, start.elapsed());
        tracing::debug!(kind, outcome, "Membership lookup");

        result
    }

    /// Return the whole suffix range for `prefix`. Matching is left to the caller.
    pub fn query_password_prefix(&self, prefix: &str) -> Result<PrefixRange> {
        let start = Instant::now();

        let result = HashPrefix::parse(prefix)
            .map_err(ServerError::from)
            .and_then(|prefix| Ok(self.store.prefix_range(&prefix)?));

        let outcome = match &result {
            Ok(range) if !range.is_empty() => "found",
            Ok(_) => "not_found",
            Err(ServerError::Validation(_)) => "rejected",
            Err(_) => "error",
        };
        metrics::record_lookup("password", outcome, start.elapsed());
        tracing::debug!(
            kind = "password",
            outcome,
            suffixes = result.as_ref().map(PrefixRange::len).unwrap_or(0),
            "Prefix lookup"
        );

        result
    }

    pub fn add_breach(&self, new: NewBreach) -> Result<BreachRecord> {
        let result = self.store.add_breach(new).map_err(ServerError::from);
        self.finish_write("breach", &result);

        if let Ok(record) = &result {
            tracing::info!(id = record.id, name = %record.name, "Breach added");
        }
        result
    }

    pub fn add_membership(&self, new: NewMembership) -> Result<MembershipRecord> {
        let result = self.store.record_membership(new).map_err(ServerError::from);
        self.finish_write("membership", &result);

        if let Ok(record) = &result {
            tracing::info!(
                id = record.id,
                data_type = %record.data_type,
                breaches = record.breach_ids.len(),
                "Membership recorded"
            );
        }
        result
    }

    pub fn add_password_prefix(&self, new: NewPasswordPrefix) -> Result<PasswordPrefixEntry> {
        let result = self.store.record_prefix(new).map_err(ServerError::from);
        self.finish_write("password_prefix", &result);

        if let Ok(entry) = &result {
            tracing::info!(
                prefix = %entry.prefix(),
                suffixes = entry.suffixes().len(),
                "Password prefix recorded"
            );
        }
        result
    }

    /// Apply the seed batch unless the catalog already holds breaches.
    pub fn initialize_demo_data(&self) -> Result<SeedOutcome> {
        let result = self.store.seed(&self.seed).map_err(ServerError::from);
        self.finish_write("seed", &result);

        match &result {
            Ok(SeedOutcome::Seeded { breaches }) => {
                tracing::info!(breaches, "Demo data initialized")
            }
            Ok(SeedOutcome::AlreadySeeded) => {
                tracing::debug!("Catalog not empty, skipping demo data")
            }
            Err(_) => {}
        }
        result
    }

    pub fn breaches(&self) -> Result<Vec<BreachRecord>> {
        Ok(self.store.breaches()?)
    }

    pub fn breach(&self, id: BreachId) -> Result<BreachRecord> {
        self.store
            .breach(id)?
            .ok_or_else(|| ServerError::NotFound(format!("breach {id}")))
    }

    pub fn membership(&self, id: MembershipId) -> Result<MembershipRecord> {
        self.store
            .membership(id)?
            .ok_or_else(|| ServerError::NotFound(format!("compromised data {id}")))
    }

    pub fn password_prefix(&self, prefix: &str) -> Result<PasswordPrefixEntry> {
        let prefix = HashPrefix::parse(prefix)?;
        self.store
            .password_prefix(&prefix)?
            .ok_or_else(|| ServerError::NotFound(format!("password prefix {prefix}")))
    }

    pub fn stats(&self) -> Result<SnapshotStats> {
        Ok(self.store.stats()?)
    }

    fn finish_write<T>(&self, op: &'static str, result: &Result<T>) {
        let outcome = match result {
            Ok(_) => "ok",
            Err(ServerError::Validation(e)) => {
                tracing::debug!(op, error = %e, "Admin write rejected");
                "rejected"
            }
            Err(e) => {
                tracing::error!(op, error = %e, "Admin write failed");
                "error"
            }
        };
        metrics::record_admin_write(op, outcome);

        if result.is_ok() {
            if let Ok(stats) = self.store.stats() {
                metrics::set_catalog_size(stats.breaches);
            }
        }
    }
}
