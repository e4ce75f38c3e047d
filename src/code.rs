//! Product code assembly.
//!
//! Codes have the form `{hash}-{firstIndex}{runs}{lastIndex}`:
//! - `hash`: 8 hex chars of the salted name fingerprint
//! - `firstIndex`: start of the first maximal run in the normalized name
//! - `runs`: every maximal run, concatenated in discovery order
//! - `lastIndex`: inclusive end of the last maximal run
//!
//! A name with no letters has no runs and falls back to `{hash}-0-1`.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::hasher::{salted_hash, HASH_LEN};
use crate::normalize::normalize_name;
use crate::runs::{extract_runs, RunSet};

/// A generated product code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCode(String);

impl ProductCode {
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The hash prefix.
	pub fn hash(&self) -> &str {
		self.0.get(..HASH_LEN).unwrap_or(&self.0)
	}

	pub fn into_string(self) -> String {
		self.0
	}

	/// Check that `code` has the shape produced by [`assemble`].
	pub fn is_well_formed(code: &str) -> bool {
		let bytes = code.as_bytes();
		if bytes.len() < HASH_LEN + 2 || bytes[HASH_LEN] != b'-' {
			return false;
		}
		if !bytes[..HASH_LEN]
			.iter()
			.all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
		{
			return false;
		}

		let tail = &code[HASH_LEN + 1..];
		if tail == "0-1" {
			return true;
		}

		let letters_start = tail
			.find(|c: char| !c.is_ascii_digit())
			.unwrap_or(tail.len());
		let letters_end = tail[letters_start..]
			.find(|c: char| !c.is_ascii_lowercase())
			.map_or(tail.len(), |i| letters_start + i);

		letters_start > 0
			&& letters_end > letters_start
			&& letters_end < tail.len()
			&& tail[letters_end..].bytes().all(|b| b.is_ascii_digit())
	}
}

impl fmt::Display for ProductCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for ProductCode {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Join a hash and a run-set into a code.
pub fn assemble(hash: &str, runs: &RunSet) -> ProductCode {
	ProductCode(format!(
		"{}-{}{}{}",
		hash,
		runs.first_index(),
		runs.concatenated(),
		runs.last_index()
	))
}

/// Every intermediate value behind a generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBreakdown {
	pub normalized: String,
	pub runs: RunSet,
	pub salt: i64,
	pub hash: String,
	pub code: ProductCode,
}

/// Generator for product codes, salted from a clock.
#[derive(Debug, Clone, Default)]
pub struct CodeGenerator<C = SystemClock> {
	clock: C,
}

impl<C: Clock> CodeGenerator<C> {
	pub fn new(clock: C) -> Self {
		Self { clock }
	}

	pub fn clock(&self) -> &C {
		&self.clock
	}

	/// Generate a code for `name`, salted with the current clock reading.
	pub fn generate(&self, name: &str) -> ProductCode {
		self.generate_with_salt(name, self.clock.now_millis())
	}

	/// Generate a code for `name` with an explicit salt.
	pub fn generate_with_salt(&self, name: &str, salt: i64) -> ProductCode {
		self.explain_with_salt(name, salt).code
	}

	/// Generate a code and keep the intermediate values.
	pub fn explain(&self, name: &str) -> CodeBreakdown {
		self.explain_with_salt(name, self.clock.now_millis())
	}

	/// Generate codes for many names in parallel. Output order matches input.
	pub fn generate_all<N>(&self, names: &[N]) -> Vec<ProductCode>
	where
		N: AsRef<str> + Sync,
		C: Sync,
	{
		names
			.par_iter()
			.map(|name| self.generate(name.as_ref()))
			.collect()
	}

	pub fn explain_with_salt(&self, name: &str, salt: i64) -> CodeBreakdown {
		let normalized = normalize_name(name);
		let runs = extract_runs(&normalized);
		let hash = salted_hash(name, salt);
		let code = assemble(&hash, &runs);

		CodeBreakdown {
			normalized,
			runs,
			salt,
			hash,
			code,
		}
	}
}
