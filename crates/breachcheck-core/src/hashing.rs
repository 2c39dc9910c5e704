//! Hashing: digests for the membership index and the k-anonymity split
//!
//! Emails and phone numbers are normalized (trimmed, lowercased) before
//! hashing so the same logical value always lands on the same index key.
//! Passwords are hashed verbatim: they are case-sensitive and whitespace is
//! significant.
//!
//! Both paths use SHA-1, the digest the breach corpus is keyed by.

use sha1::{Digest, Sha1};

use crate::prefix::HashPrefix;

/// Length of a SHA-1 digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 40;

/// Length of the disclosed password-hash prefix (5 hex chars = 20 bits).
pub const PREFIX_LEN: usize = 5;

/// Length of the withheld password-hash suffix.
pub const SUFFIX_LEN: usize = DIGEST_HEX_LEN - PREFIX_LEN;

/// Number of distinct prefixes (16^5 = 1,048,576).
pub const TOTAL_PREFIXES: u32 = 0x100000;

/// Digest of an email address or phone number.
///
/// Trims surrounding whitespace and lowercases before hashing. Returns
/// 40 lowercase hex characters.
pub fn digest(value: &str) -> String {
    let normalized = value.trim().to_lowercase();
    hex::encode(sha1_bytes(normalized.as_bytes()))
}

/// Full uppercase hex digest of a password, without normalization.
pub fn password_digest(password: &str) -> String {
    hex::encode_upper(sha1_bytes(password.as_bytes()))
}

/// Split a password digest into the disclosed prefix and the withheld suffix.
pub fn password_digest_parts(password: &str) -> PasswordDigestParts {
    let full = password_digest(password);
    let (prefix, suffix) = full.split_at(PREFIX_LEN);

    PasswordDigestParts {
        prefix: HashPrefix::from_digest_unchecked(prefix),
        suffix: suffix.to_string(),
    }
}

/// Whether `value` has the shape of a SHA-1 hex digest (either case).
pub fn is_digest(value: &str) -> bool {
    value.len() == DIGEST_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Prefix/suffix halves of a password digest.
///
/// Only `prefix` may leave the client; `suffix` is compared locally against
/// the range the server returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigestParts {
    pub prefix: HashPrefix,
    pub suffix: String,
}

impl PasswordDigestParts {
    /// Reassemble the full uppercase digest.
    pub fn full(&self) -> String {
        format!("{}{}", self.prefix, self.suffix)
    }
}

fn sha1_bytes(data: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().into()
}
