//! Benign abort-reason classification.
//!
//! The donation contract intentionally raises specific error codes for
//! conditions the caller should treat as a successful no-op rather than
//! a failed transaction. Which codes qualify is a product decision that
//! changes over time, so the set lives here as named, overridable
//! configuration instead of literals inside the poll loop.

use regex::{RegexSet, RegexSetBuilder};

/// Default benign abort-reason patterns.
///
/// Word boundaries keep the standalone tokens from matching inside
/// larger codes (`u5` matches `(err u5)` and `err-u5` but never `u50`).
pub const DEFAULT_BENIGN_ABORT_PATTERNS: &[&str] = &[r"\bu5\b", r"\bu9\b"];

/// Case-insensitive matcher over abort-reason strings.
///
/// A reason is benign when it matches any pattern in the set.
#[derive(Debug, Clone)]
pub struct BenignAbortPolicy {
	patterns: Vec<String>,
	set: RegexSet,
}

impl BenignAbortPolicy {
	/// Compiles a policy from the given regex patterns.
	///
	/// Matching is case-insensitive. Returns the underlying regex error
	/// when a pattern does not compile, so configuration mistakes fail
	/// at startup rather than mid-poll.
	pub fn new<I, P>(patterns: I) -> Result<Self, regex::Error>
	where
		I: IntoIterator<Item = P>,
		P: AsRef<str>,
	{
		let patterns: Vec<String> = patterns
			.into_iter()
			.map(|p| p.as_ref().to_string())
			.collect();
		let set = RegexSetBuilder::new(&patterns)
			.case_insensitive(true)
			.build()?;
		Ok(Self { patterns, set })
	}

	/// Returns true when the abort reason matches a benign pattern.
	pub fn is_benign(&self, reason: &str) -> bool {
		self.set.is_match(reason)
	}

	/// The patterns this policy was compiled from.
	pub fn patterns(&self) -> &[String] {
		&self.patterns
	}
}

impl Default for BenignAbortPolicy {
	fn default() -> Self {
		Self::new(DEFAULT_BENIGN_ABORT_PATTERNS)
			.expect("default benign abort patterns should always compile")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_policy_matches_known_code_spellings() {
		let policy = BenignAbortPolicy::default();
		for reason in [
			"u5",
			"u9",
			"(err u5)",
			"(err u9)",
			"err-u5",
			"err-u9",
			"(ERR U5)",
		] {
			assert!(policy.is_benign(reason), "expected benign: {}", reason);
		}
	}

	#[test]
	fn default_policy_rejects_other_codes() {
		let policy = BenignAbortPolicy::default();
		for reason in ["(err u42)", "u50", "u59", "u95", "(err u500)", "unknown reason"] {
			assert!(!policy.is_benign(reason), "expected not benign: {}", reason);
		}
	}

	#[test]
	fn custom_patterns_extend_the_set() {
		let policy = BenignAbortPolicy::new([r"\bu5\b", r"\bu104\b"]).unwrap();
		assert!(policy.is_benign("(err u104)"));
		assert!(!policy.is_benign("(err u9)"));
	}

	#[test]
	fn empty_set_never_matches() {
		let policy = BenignAbortPolicy::new(Vec::<String>::new()).unwrap();
		assert!(!policy.is_benign("(err u5)"));
	}

	#[test]
	fn invalid_pattern_is_a_compile_error() {
		assert!(BenignAbortPolicy::new(["(unclosed"]).is_err());
	}

	#[test]
	fn patterns_are_preserved_for_introspection() {
		let policy = BenignAbortPolicy::default();
		assert_eq!(policy.patterns(), DEFAULT_BENIGN_ABORT_PATTERNS);
	}
}
