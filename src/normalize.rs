//! Name normalization for run extraction.
//!
//! Lowercases the display name and keeps only `a`-`z`, preserving order.

/// Normalize a product name for scanning.
///
/// - Lowercases (full Unicode lowercase mapping)
/// - Drops everything that is not an ASCII lowercase letter afterwards
pub fn normalize_name(name: &str) -> String {
	name.to_lowercase()
		.chars()
		.filter(|c| c.is_ascii_lowercase())
		.collect()
}

/// Whether `s` is already in normalized form.
pub fn is_normalized(s: &str) -> bool {
	s.bytes().all(|b| b.is_ascii_lowercase())
}
