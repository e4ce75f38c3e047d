//! Salted name fingerprint.
//!
//! MD5 over the name followed by the decimal salt, truncated to 8 hex chars.
//! Used only to spread codes for repeated names; not a security primitive.

use md5::{Digest, Md5};

/// Number of hex characters kept from the digest.
pub const HASH_LEN: usize = 8;

/// Hash a string using MD5 and return full 32 hex chars
pub fn hash_string(s: &str) -> String {
	let mut hasher = Md5::new();
	hasher.update(s.as_bytes());
	let result = hasher.finalize();
	format!("{:x}", result)
}

/// Fingerprint `name` salted with `salt` (milliseconds since the epoch).
pub fn salted_hash(name: &str, salt: i64) -> String {
	let mut hash = hash_string(&format!("{name}{salt}"));
	hash.truncate(HASH_LEN);
	hash
}
