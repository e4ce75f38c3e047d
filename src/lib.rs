//! Product Code Library
//!
//! Generates short, human-looking product codes and manages the category
//! and product catalog that stores them.
//!
//! A code is `{hash}-{firstIndex}{runs}{lastIndex}`, built from the
//! longest strictly-increasing letter runs of the product name and an MD5
//! fingerprint of the name salted with the current time.

pub mod catalog;
pub mod clock;
pub mod code;
pub mod config;
pub mod hasher;
pub mod normalize;
pub mod runs;

pub use clock::{Clock, FixedClock, SystemClock};
pub use code::{assemble, CodeBreakdown, CodeGenerator, ProductCode};
pub use config::{Config, ConfigError};
pub use hasher::{hash_string, salted_hash};
pub use normalize::normalize_name;
pub use runs::{extract_runs, Run, RunSet};

/// Generate a product code for `name`, salted with the wall clock.
pub fn generate_code(name: &str) -> ProductCode {
	CodeGenerator::new(SystemClock).generate(name)
}
