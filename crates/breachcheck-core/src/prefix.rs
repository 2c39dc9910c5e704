//! Password-prefix index for the k-anonymity exchange
//!
//! The client discloses only the first 5 hex characters of its password
//! digest. The server answers with every (suffix, count) pair sharing that
//! prefix and never learns which suffix, if any, the client holds. Matching
//! happens client-side via [`PrefixRange::check`].
//!
//! Suffixes and counts are parallel arrays: `counts[i]` is the occurrence
//! count of `suffixes[i]`. Entries are replaced as a unit, never patched.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::hashing::PREFIX_LEN;
use crate::Result;

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// A validated 5-character uppercase hex prefix (`^[0-9A-F]{5}$`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HashPrefix(String);

impl HashPrefix {
    /// Parse a prefix. Lowercase input is rejected, not normalized.
    pub fn parse(value: &str) -> Result<Self> {
        let valid = value.len() == PREFIX_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b));

        if valid {
            Ok(Self(value.to_string()))
        } else {
            Err(Error::InvalidPrefix(value.to_string()))
        }
    }

    /// Prefix for a 20-bit index (0x00000..=0xFFFFF).
    pub fn from_index(index: u32) -> Self {
        let chars: String = (0..PREFIX_LEN)
            .rev()
            .map(|nibble| HEX_UPPER[((index >> (nibble * 4)) & 0xF) as usize] as char)
            .collect();
        Self(chars)
    }

    /// Caller guarantees `value` is 5 uppercase hex characters.
    pub(crate) fn from_digest_unchecked(value: &str) -> Self {
        debug_assert!(Self::parse(value).is_ok());
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for HashPrefix {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<HashPrefix> for String {
    fn from(prefix: HashPrefix) -> Self {
        prefix.0
    }
}

/// Unvalidated prefix entry as submitted by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPasswordPrefix {
    pub prefix: String,
    pub suffixes: Vec<String>,
    pub counts: Vec<u64>,
}

impl NewPasswordPrefix {
    pub fn validate(self) -> Result<PasswordPrefixEntry> {
        PasswordPrefixEntry::new(HashPrefix::parse(&self.prefix)?, self.suffixes, self.counts)
    }
}

/// Stored prefix entry. `suffixes.len() == counts.len()` by construction.
///
/// Deserialization goes through [`PasswordPrefixEntry::new`], so decoded
/// entries hold the same guarantees as inserted ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NewPasswordPrefix")]
pub struct PasswordPrefixEntry {
    prefix: HashPrefix,
    suffixes: Vec<String>,
    counts: Vec<u64>,
}

impl TryFrom<NewPasswordPrefix> for PasswordPrefixEntry {
    type Error = Error;

    fn try_from(new: NewPasswordPrefix) -> Result<Self> {
        new.validate()
    }
}

impl PasswordPrefixEntry {
    pub fn new(prefix: HashPrefix, suffixes: Vec<String>, counts: Vec<u64>) -> Result<Self> {
        if suffixes.len() != counts.len() {
            return Err(Error::LengthMismatch {
                suffixes: suffixes.len(),
                counts: counts.len(),
            });
        }

        for (index, suffix) in suffixes.iter().enumerate() {
            let valid = !suffix.is_empty()
                && suffix
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b));
            if !valid {
                return Err(Error::InvalidSuffix {
                    index,
                    value: suffix.clone(),
                });
            }
        }

        Ok(Self {
            prefix,
            suffixes,
            counts,
        })
    }

    pub fn prefix(&self) -> &HashPrefix {
        &self.prefix
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn to_range(&self) -> PrefixRange {
        PrefixRange {
            suffixes: self.suffixes.clone(),
            counts: self.counts.clone(),
        }
    }
}

/// Response body for a prefix lookup: `{suffixes: [...], counts: [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRange {
    pub suffixes: Vec<String>,
    pub counts: Vec<u64>,
}

impl PrefixRange {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    /// Occurrence count aligned with an exact suffix match.
    ///
    /// A count missing from a malformed response reads as 0.
    pub fn find(&self, suffix: &str) -> Option<u64> {
        let index = self.suffixes.iter().position(|s| s == suffix)?;
        Some(self.counts.get(index).copied().unwrap_or(0))
    }

    /// The local-match step of the k-anonymity exchange.
    pub fn check(&self, suffix: &str) -> PasswordCheckResult {
        match self.find(suffix) {
            Some(count) => PasswordCheckResult { found: true, count },
            None => PasswordCheckResult {
                found: false,
                count: 0,
            },
        }
    }
}

/// Client-side outcome of a password check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCheckResult {
    pub found: bool,
    pub count: u64,
}

/// Prefix -> parallel (suffix, count) arrays.
///
/// Entries are shared behind `Arc` so cloning the index for a new snapshot
/// copies pointers, not suffix lists.
#[derive(Debug, Clone, Default)]
pub struct PrefixIndex {
    entries: HashMap<HashPrefix, Arc<PasswordPrefixEntry>>,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or wholesale-replace the entry for its prefix.
    pub fn record(&mut self, entry: PasswordPrefixEntry) -> Arc<PasswordPrefixEntry> {
        let entry = Arc::new(entry);
        self.entries.insert(entry.prefix.clone(), Arc::clone(&entry));
        entry
    }

    /// Stored arrays for `prefix`, or empty arrays when none exist.
    pub fn lookup(&self, prefix: &HashPrefix) -> PrefixRange {
        self.entries
            .get(prefix)
            .map(|entry| entry.to_range())
            .unwrap_or_default()
    }

    pub fn get(&self, prefix: &HashPrefix) -> Option<&PasswordPrefixEntry> {
        self.entries.get(prefix).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by prefix.
    pub fn entries(&self) -> Vec<&PasswordPrefixEntry> {
        let mut entries: Vec<_> = self.entries.values().map(Arc::as_ref).collect();
        entries.sort_by(|a, b| a.prefix.cmp(&b.prefix));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::{password_digest_parts, TOTAL_PREFIXES};
    use rand::Rng;

    const PASSWORD_SUFFIX: &str = "1E4C9B93F3F0682250B6CF8331B7EE68FD8";

    fn prefix(s: &str) -> HashPrefix {
        HashPrefix::parse(s).unwrap()
    }

    #[test]
    fn test_parse_accepts_uppercase_hex() {
        for s in ["00000", "FFFFF", "5BAA6", "ABCDE", "12345"] {
            assert_eq!(prefix(s).as_str(), s);
        }
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for s in ["", "5BAA", "5BAA61", "abcde", "5baa6", "GHIJK", "5BA A", "5BAA-"] {
            assert_eq!(
                HashPrefix::parse(s),
                Err(Error::InvalidPrefix(s.to_string())),
                "{s:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_index() {
        assert_eq!(HashPrefix::from_index(0x00000).as_str(), "00000");
        assert_eq!(HashPrefix::from_index(0xFFFFF).as_str(), "FFFFF");
        assert_eq!(HashPrefix::from_index(0xABCDE).as_str(), "ABCDE");
        assert_eq!(HashPrefix::from_index(0x5BAA6).as_str(), "5BAA6");
    }

    #[test]
    fn test_entry_rejects_length_mismatch() {
        let result = PasswordPrefixEntry::new(
            prefix("5BAA6"),
            vec![PASSWORD_SUFFIX.into(), "00".into()],
            vec![1],
        );
        assert_eq!(
            result,
            Err(Error::LengthMismatch {
                suffixes: 2,
                counts: 1
            })
        );
    }

    #[test]
    fn test_entry_rejects_lowercase_suffix() {
        let result = PasswordPrefixEntry::new(
            prefix("5BAA6"),
            vec![PASSWORD_SUFFIX.to_lowercase()],
            vec![1],
        );
        assert!(matches!(result, Err(Error::InvalidSuffix { index: 0, .. })));
    }

    #[test]
    fn test_new_password_prefix_validate() {
        let raw = NewPasswordPrefix {
            prefix: "5baa6".into(),
            suffixes: vec![PASSWORD_SUFFIX.into()],
            counts: vec![1],
        };
        assert!(matches!(raw.validate(), Err(Error::InvalidPrefix(_))));
    }

    #[test]
    fn test_index_record_and_lookup() {
        let mut index = PrefixIndex::new();
        let entry = PasswordPrefixEntry::new(
            prefix("5BAA6"),
            vec![PASSWORD_SUFFIX.into()],
            vec![3_730_471],
        )
        .unwrap();
        index.record(entry);

        let range = index.lookup(&prefix("5BAA6"));
        assert_eq!(range.suffixes, vec![PASSWORD_SUFFIX.to_string()]);
        assert_eq!(range.counts, vec![3_730_471]);
        assert_eq!(index.lookup(&prefix("00000")), PrefixRange::empty());
    }

    #[test]
    fn test_index_reinsert_replaces_wholesale() {
        let mut index = PrefixIndex::new();
        index.record(
            PasswordPrefixEntry::new(
                prefix("5BAA6"),
                vec!["AA".into(), "BB".into()],
                vec![1, 2],
            )
            .unwrap(),
        );
        index.record(PasswordPrefixEntry::new(prefix("5BAA6"), vec!["CC".into()], vec![9]).unwrap());

        let range = index.lookup(&prefix("5BAA6"));
        assert_eq!(range.suffixes, vec!["CC".to_string()]);
        assert_eq!(range.counts, vec![9]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_random_unknown_prefixes_are_empty() {
        let mut index = PrefixIndex::new();
        index.record(
            PasswordPrefixEntry::new(prefix("5BAA6"), vec![PASSWORD_SUFFIX.into()], vec![1])
                .unwrap(),
        );

        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let p = HashPrefix::from_index(rng.gen_range(0..TOTAL_PREFIXES));
            if p.as_str() == "5BAA6" {
                continue;
            }
            let range = index.lookup(&p);
            assert!(range.suffixes.is_empty() && range.counts.is_empty());
        }
    }

    #[test]
    fn test_check_local_match() {
        let parts = password_digest_parts("password");
        let range = PrefixRange {
            suffixes: vec![
                "1E4C9B93F3F0682250B6CF8331B7EE68FD9".into(),
                PASSWORD_SUFFIX.into(),
            ],
            counts: vec![5, 3_730_471],
        };

        assert_eq!(
            range.check(&parts.suffix),
            PasswordCheckResult {
                found: true,
                count: 3_730_471
            }
        );

        let other = password_digest_parts("Password");
        assert_eq!(range.check(&other.suffix), PasswordCheckResult::default());
    }

    #[test]
    fn test_find_missing_count_reads_zero() {
        let range = PrefixRange {
            suffixes: vec!["AA".into()],
            counts: vec![],
        };
        assert_eq!(range.find("AA"), Some(0));
    }

    #[test]
    fn test_prefix_serde_rejects_invalid() {
        let ok: HashPrefix = serde_json::from_str("\"5BAA6\"").unwrap();
        assert_eq!(ok.as_str(), "5BAA6");
        assert!(serde_json::from_str::<HashPrefix>("\"5baa6\"").is_err());
    }

    #[test]
    fn test_entry_decode_enforces_invariants() {
        let ok: PasswordPrefixEntry =
            serde_json::from_str(r#"{"prefix":"ABCDE","suffixes":["AA","BB"],"counts":[1,2]}"#)
                .unwrap();
        assert_eq!(ok.counts(), &[1, 2]);

        for bad in [
            r#"{"prefix":"ABCDE","suffixes":["AA","BB","CC"],"counts":[1]}"#,
            r#"{"prefix":"ABCDE","suffixes":["zz"],"counts":[1]}"#,
            r#"{"prefix":"abcde","suffixes":[],"counts":[]}"#,
        ] {
            assert!(
                serde_json::from_str::<PasswordPrefixEntry>(bad).is_err(),
                "{bad} should not decode"
            );
        }
    }
}
