//! String formatting utilities.
//!
//! Provides helpers for hex id prefix handling and truncation of long
//! identifiers in log output.

/// Removes a leading "0x" or "0X" from a hex string if present.
///
/// Returns the input unchanged when no prefix is found.
pub fn strip_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Truncates a transaction id for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer
/// strings. Counts characters, not bytes, since this also runs on
/// not-yet-validated user input.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((idx, _)) => format!("{}..", &id[..idx]),
		None => id.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_lower_and_uppercase_prefix() {
		assert_eq!(strip_0x_prefix("0xabcd"), "abcd");
		assert_eq!(strip_0x_prefix("0Xabcd"), "abcd");
		assert_eq!(strip_0x_prefix("abcd"), "abcd");
	}

	#[test]
	fn truncates_long_ids_only() {
		assert_eq!(truncate_id("abcd"), "abcd");
		assert_eq!(truncate_id("abcdefgh"), "abcdefgh");
		assert_eq!(truncate_id("abcdefghij"), "abcdefgh..");
	}

	#[test]
	fn truncates_multibyte_input_without_panicking() {
		assert_eq!(truncate_id("日本語テスト入力データ"), "日本語テスト入力..");
	}
}
