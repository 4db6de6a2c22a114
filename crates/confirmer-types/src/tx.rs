//! Transaction identifier parsing and validation.
//!
//! A Stacks transaction id is a 64-character hex string, optionally
//! carrying a "0x" prefix. Anything else is rejected before the poller
//! performs any network I/O.

use crate::format::strip_0x_prefix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of hex characters in a transaction id, prefix excluded.
const TX_ID_HEX_LEN: usize = 64;

/// Errors that can occur when parsing a transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxIdError {
	/// The id does not contain exactly 64 hex characters.
	#[error("invalid transaction id length: expected {TX_ID_HEX_LEN} hex characters, got {0}")]
	InvalidLength(usize),
	/// The id contains a character outside the hex alphabet.
	#[error("invalid character '{0}' in transaction id")]
	InvalidCharacter(char),
}

/// A validated Stacks transaction identifier.
///
/// Stored normalized: lowercase hex without the "0x" prefix. `Display`
/// renders the canonical "0x"-prefixed form expected by the indexer API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxId(String);

impl TxId {
	/// Parses and validates a transaction id supplied by a caller.
	///
	/// Accepts 64 hex characters with an optional "0x"/"0X" prefix and
	/// performs no I/O.
	pub fn parse(input: &str) -> Result<Self, TxIdError> {
		let hex = strip_0x_prefix(input.trim());

		if hex.len() != TX_ID_HEX_LEN {
			return Err(TxIdError::InvalidLength(hex.len()));
		}
		if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
			return Err(TxIdError::InvalidCharacter(bad));
		}

		Ok(Self(hex.to_ascii_lowercase()))
	}

	/// Returns the normalized hex digits without the "0x" prefix.
	pub fn as_hex(&self) -> &str {
		&self.0
	}
}

impl FromStr for TxId {
	type Err = TxIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl fmt::Display for TxId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", self.0)
	}
}

impl TryFrom<String> for TxId {
	type Error = TxIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<TxId> for String {
	fn from(id: TxId) -> Self {
		id.to_string()
	}
}
