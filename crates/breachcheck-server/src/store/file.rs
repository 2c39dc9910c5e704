//! Snapshot-file store
//!
//! Wraps a [`MemoryStore`] and writes the full state to a bincode file on
//! every accepted write. The temp file is fsynced, then renamed over the
//! snapshot, and the new snapshot is only published once the rename
//! succeeded, so a failed write is neither visible nor persisted.
//!
//! Writes are blocking file I/O; async callers run them off the runtime
//! (see the admin handlers in `routes`).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use breachcheck_core::{
    BreachId, BreachRecord, BreachSearchResult, DataType, HashPrefix, MembershipId,
    MembershipRecord, NewBreach, NewMembership, NewPasswordPrefix, PasswordPrefixEntry,
    PersistedState, PrefixRange, SeedBatch, SeedOutcome, Snapshot, SnapshotStats,
    SNAPSHOT_FORMAT_VERSION,
};

use super::{BreachStore, MemoryStore, StoreError, StoreResult};

pub struct FileStore {
    memory: MemoryStore,
    path: PathBuf,
}

impl FileStore {
    /// Open `path`, loading it if present. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let snapshot = if path.exists() {
            let snapshot = load_snapshot(&path)?;
            let stats = snapshot.stats();
            tracing::info!(
                path = %path.display(),
                breaches = stats.breaches,
                email_hashes = stats.email_hashes,
                phone_hashes = stats.phone_hashes,
                prefixes = stats.prefixes,
                "Loaded breach snapshot"
            );
            snapshot
        } else {
            tracing::info!(path = %path.display(), "No snapshot file, starting empty");
            Snapshot::new()
        };

        Ok(Self {
            memory: MemoryStore::from_snapshot(snapshot),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let data = bincode::serialize(&snapshot.to_persisted())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), bytes = data.len(), "Persisted snapshot");
        Ok(())
    }

    fn write_through<R>(
        &self,
        apply: impl FnOnce(&mut Snapshot) -> StoreResult<R>,
    ) -> StoreResult<R> {
        self.memory.write(apply, |snapshot| self.persist(snapshot))
    }
}

fn load_snapshot(path: &Path) -> StoreResult<Snapshot> {
    let data = fs::read(path)?;
    let state: PersistedState = bincode::deserialize(&data)?;

    if state.version != SNAPSHOT_FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: state.version,
            expected: SNAPSHOT_FORMAT_VERSION,
        });
    }

    Snapshot::from_persisted(state).map_err(StoreError::Corrupt)
}

impl BreachStore for FileStore {
    fn search(&self, data_type: DataType, data_hash: &str) -> StoreResult<BreachSearchResult> {
        self.memory.search(data_type, data_hash)
    }

    fn prefix_range(&self, prefix: &HashPrefix) -> StoreResult<PrefixRange> {
        self.memory.prefix_range(prefix)
    }

    fn breach(&self, id: BreachId) -> StoreResult<Option<BreachRecord>> {
        self.memory.breach(id)
    }

    fn breaches(&self) -> StoreResult<Vec<BreachRecord>> {
        self.memory.breaches()
    }

    fn membership(&self, id: MembershipId) -> StoreResult<Option<MembershipRecord>> {
        self.memory.membership(id)
    }

    fn password_prefix(&self, prefix: &HashPrefix) -> StoreResult<Option<PasswordPrefixEntry>> {
        self.memory.password_prefix(prefix)
    }

    fn stats(&self) -> StoreResult<SnapshotStats> {
        self.memory.stats()
    }

    fn add_breach(&self, new: NewBreach) -> StoreResult<BreachRecord> {
        self.write_through(|snapshot| Ok(snapshot.add_breach(new)?))
    }

    fn record_membership(&self, new: NewMembership) -> StoreResult<MembershipRecord> {
        self.write_through(|snapshot| Ok(snapshot.record_membership(new)?))
    }

    fn record_prefix(&self, new: NewPasswordPrefix) -> StoreResult<PasswordPrefixEntry> {
        self.write_through(|snapshot| Ok(snapshot.record_prefix(new)?))
    }

    fn seed(&self, batch: &SeedBatch) -> StoreResult<SeedOutcome> {
        // Skip the disk write when nothing changes.
        if !self.memory.load().catalog().is_empty() {
            return Ok(SeedOutcome::AlreadySeeded);
        }
        self.write_through(|snapshot| Ok(snapshot.seed(batch)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breachcheck_core::{demo_seed, digest, password_digest_parts};

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("breaches.bin")).unwrap();
        assert_eq!(store.stats().unwrap(), SnapshotStats::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("breaches.bin");

        let hash = digest("alice@example.com");
        {
            let store = FileStore::open(&path).unwrap();
            store.seed(&demo_seed()).unwrap();
            let adobe = store.breaches().unwrap()[0].id;
            store
                .record_membership(NewMembership::new(DataType::Email, hash.clone(), vec![adobe]))
                .unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.stats().unwrap().breaches, 4);

        let result = reopened.search(DataType::Email, &hash).unwrap();
        assert!(result.found);
        assert_eq!(result.breaches[0].name, "Adobe");

        let parts = password_digest_parts("password");
        let range = reopened.prefix_range(&parts.prefix).unwrap();
        assert!(range.check(&parts.suffix).found);

        // Seeding a reloaded store is still a no-op.
        assert_eq!(reopened.seed(&demo_seed()).unwrap(), SeedOutcome::AlreadySeeded);
    }

    #[test]
    fn test_rejected_write_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breaches.bin");

        let store = FileStore::open(&path).unwrap();
        let err = store
            .record_membership(NewMembership::new(DataType::Phone, "not-a-digest", vec![1]))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("occupied");
        fs::create_dir_all(path.join("child")).unwrap();

        let store = FileStore {
            memory: MemoryStore::new(),
            path,
        };
        let err = store.seed(&demo_seed()).unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.stats().unwrap().breaches, 0);
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breaches.bin");
        fs::write(&path, b"\xff\xff\xff\xff").unwrap();

        assert!(FileStore::open(&path).is_err());
    }

    fn write_state(path: &Path, state: &PersistedState) {
        fs::write(path, bincode::serialize(state).unwrap()).unwrap();
    }

    fn seeded_state() -> PersistedState {
        let mut snapshot = Snapshot::new();
        snapshot.seed(&demo_seed()).unwrap();
        snapshot.to_persisted()
    }

    #[derive(serde::Serialize)]
    struct RawPrefix<'a> {
        prefix: &'a str,
        suffixes: Vec<&'a str>,
        counts: Vec<u64>,
    }

    #[derive(serde::Serialize)]
    struct RawState<'a> {
        version: u32,
        breaches: Vec<BreachRecord>,
        memberships: Vec<MembershipRecord>,
        prefixes: Vec<RawPrefix<'a>>,
    }

    #[test]
    fn test_mismatched_prefix_entry_is_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breaches.bin");
        // Same layout as PersistedState, but with arrays inserts would reject.
        let raw = RawState {
            version: SNAPSHOT_FORMAT_VERSION,
            breaches: Vec::new(),
            memberships: Vec::new(),
            prefixes: vec![RawPrefix {
                prefix: "ABCDE",
                suffixes: vec!["AA", "BB", "zz"],
                counts: vec![1],
            }],
        };
        fs::write(&path, bincode::serialize(&raw).unwrap()).unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Codec(_))));
    }

    #[test]
    fn test_membership_id_gap_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breaches.bin");
        let mut state = seeded_state();
        state.memberships[1].id = 7;
        write_state(&path, &state);

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Corrupt(breachcheck_core::Error::OutOfSequence { .. }))
        ));
    }

    #[test]
    fn test_invalid_breach_record_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breaches.bin");
        let mut state = seeded_state();
        state.breaches[0].name = "   ".into();
        write_state(&path, &state);

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Corrupt(breachcheck_core::Error::MissingField("name")))
        ));
    }

    #[test]
    fn test_persist_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breaches.bin");

        let store = FileStore::open(&path).unwrap();
        store.seed(&demo_seed()).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
        let reloaded = load_snapshot(&path).unwrap();
        assert_eq!(reloaded.stats(), store.stats().unwrap());
    }

    #[test]
    fn test_future_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breaches.bin");
        let state = PersistedState {
            version: SNAPSHOT_FORMAT_VERSION + 1,
            breaches: Vec::new(),
            memberships: Vec::new(),
            prefixes: Vec::new(),
        };
        write_state(&path, &state);

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::UnsupportedVersion { found, .. }) if found == SNAPSHOT_FORMAT_VERSION + 1
        ));
    }
}
