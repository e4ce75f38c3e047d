//! Longest strictly-increasing run extraction.
//!
//! A run is a maximal stretch of the normalized name where every character
//! is strictly greater than the one before it. The scan keeps every run tied
//! for the maximum length, in the order they were found.

/// A single run inside the normalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
	/// Start position within the normalized name
	pub start: usize,
	pub text: String,
}

impl Run {
	pub fn len(&self) -> usize {
		self.text.len()
	}

	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}

	/// Inclusive end position within the normalized name.
	pub fn end(&self) -> usize {
		self.start + self.len() - 1
	}
}

/// All runs sharing the maximum observed length, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSet {
	runs: Vec<Run>,
}

impl RunSet {
	pub fn runs(&self) -> &[Run] {
		&self.runs
	}

	pub fn is_empty(&self) -> bool {
		self.runs.is_empty()
	}

	/// Length shared by every run in the set (0 when empty).
	pub fn run_len(&self) -> usize {
		self.runs.first().map(Run::len).unwrap_or(0)
	}

	/// Start of the first run, or 0 for an empty set.
	pub fn first_index(&self) -> usize {
		self.runs.first().map(|r| r.start).unwrap_or(0)
	}

	/// Inclusive end of the last run, or -1 for an empty set.
	pub fn last_index(&self) -> i64 {
		self.runs.last().map(|r| r.end() as i64).unwrap_or(-1)
	}

	/// Run texts joined in set order.
	pub fn concatenated(&self) -> String {
		self.runs.iter().map(|r| r.text.as_str()).collect()
	}

	/// Offer a finished run to the set.
	///
	/// Longer than the current best (or first run seen) replaces the set,
	/// equal length appends, shorter is dropped.
	fn offer(&mut self, run: Run) {
		if run.is_empty() {
			return;
		}
		let best = self.run_len();
		if self.runs.is_empty() || run.len() > best {
			self.runs.clear();
			self.runs.push(run);
		} else if run.len() == best {
			self.runs.push(run);
		}
	}
}

/// Scan a normalized name and return its maximal-length runs.
///
/// Expects the output of [`crate::normalize::normalize_name`]; any ASCII
/// string works, comparison is by byte.
pub fn extract_runs(normalized: &str) -> RunSet {
	let mut set = RunSet::default();
	let mut current = Run {
		start: 0,
		text: String::new(),
	};

	for (i, c) in normalized.char_indices() {
		let continues = current.text.chars().last().map_or(true, |last| c > last);
		if continues {
			current.text.push(c);
			continue;
		}

		let finished = std::mem::replace(
			&mut current,
			Run {
				start: i,
				text: c.to_string(),
			},
		);
		set.offer(finished);
	}

	// Pending run at the end of the name
	set.offer(current);

	set
}

#[cfg(test)]
mod tests {
	use super::*;

	fn texts(set: &RunSet) -> Vec<&str> {
		set.runs().iter().map(|r| r.text.as_str()).collect()
	}

	#[test]
	fn test_empty_name() {
		let set = extract_runs("");
		assert!(set.is_empty());
		assert_eq!(set.first_index(), 0);
		assert_eq!(set.last_index(), -1);
		assert_eq!(set.concatenated(), "");
	}

	#[test]
	fn test_single_char() {
		let set = extract_runs("a");
		assert_eq!(texts(&set), vec!["a"]);
		assert_eq!(set.first_index(), 0);
		assert_eq!(set.last_index(), 0);
	}

	#[test]
	fn test_strictly_decreasing_keeps_every_char() {
		let set = extract_runs("zyx");
		assert_eq!(texts(&set), vec!["z", "y", "x"]);
		assert_eq!(set.concatenated(), "zyx");
		assert_eq!(set.first_index(), 0);
		assert_eq!(set.last_index(), 2);
	}

	#[test]
	fn test_longer_run_replaces_set() {
		let set = extract_runs("abcabdzyz");
		assert_eq!(texts(&set), vec!["abdz"]);
		assert_eq!(set.first_index(), 3);
		assert_eq!(set.last_index(), 6);
	}

	#[test]
	fn test_ties_kept_in_discovery_order() {
		let set = extract_runs("abcabd");
		assert_eq!(texts(&set), vec!["abc", "abd"]);
		assert_eq!(set.first_index(), 0);
		assert_eq!(set.last_index(), 5);
		assert_eq!(set.concatenated(), "abcabd");
	}

	#[test]
	fn test_shorter_trailing_run_discarded() {
		let set = extract_runs("abcda");
		assert_eq!(texts(&set), vec!["abcd"]);
		assert_eq!(set.last_index(), 3);
	}

	#[test]
	fn test_final_run_uses_same_rule() {
		// Tie at the very end is appended, longer at the end replaces
		assert_eq!(texts(&extract_runs("bcab")), vec!["bc", "ab"]);
		assert_eq!(texts(&extract_runs("bcabc")), vec!["abc"]);
	}

	#[test]
	fn test_repeated_chars_break_runs() {
		let set = extract_runs("aab");
		assert_eq!(texts(&set), vec!["ab"]);
		assert_eq!(set.first_index(), 1);
		assert_eq!(set.last_index(), 2);
	}

	#[test]
	fn test_product() {
		// p-r-o-d-u-c-t: "pr", "o", "du", "ct"
		let set = extract_runs("product");
		assert_eq!(texts(&set), vec!["pr", "du", "ct"]);
		assert_eq!(set.first_index(), 0);
		assert_eq!(set.last_index(), 6);
	}

	#[test]
	fn test_deterministic() {
		assert_eq!(extract_runs("greentea"), extract_runs("greentea"));
	}
}
