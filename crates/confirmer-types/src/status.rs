//! Indexer response models and transaction status classification.
//!
//! The Stacks indexer reports transaction state as a free-form
//! `tx_status` string plus an optional `tx_result.repr` carrying the
//! Clarity representation of the result. Only two terminal families
//! matter to the poller: success and abort. Everything else is pending.

use serde::{Deserialize, Serialize};

/// `tx_status` value for a successfully mined transaction.
const STATUS_SUCCESS: &str = "success";
/// `tx_status` values for a transaction aborted by the contract.
const STATUS_ABORTED: [&str; 2] = ["abort_by_response", "abort_by_post_condition"];

/// Clarity result attached to a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
	/// Textual representation of the result, e.g. `(err u5)`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub repr: Option<String>,
}

/// Body of a status response from the indexer API.
///
/// Unknown fields are ignored so the model survives indexer additions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatusResponse {
	/// Raw status string as reported by the indexer.
	pub tx_status: String,
	/// Execution result, present once the transaction has been mined.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tx_result: Option<TxResult>,
}

/// Classified transaction state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
	/// Terminal, favorable.
	Success,
	/// Terminal, unfavorable unless the abort reason is known-benign.
	Aborted {
		/// Abort reason from `tx_result.repr`, when the indexer supplied one.
		reason: Option<String>,
	},
	/// Catch-all for any non-terminal status string.
	Pending,
}

impl TxStatusResponse {
	/// Classifies the raw `tx_status` string into a [`TxStatus`].
	pub fn classify(&self) -> TxStatus {
		if self.tx_status == STATUS_SUCCESS {
			return TxStatus::Success;
		}
		if STATUS_ABORTED.contains(&self.tx_status.as_str()) {
			return TxStatus::Aborted {
				reason: self.tx_result.as_ref().and_then(|r| r.repr.clone()),
			};
		}
		TxStatus::Pending
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn response(status: &str, repr: Option<&str>) -> TxStatusResponse {
		TxStatusResponse {
			tx_status: status.to_string(),
			tx_result: repr.map(|r| TxResult {
				repr: Some(r.to_string()),
			}),
		}
	}

	#[test]
	fn success_is_terminal_favorable() {
		assert_eq!(response("success", None).classify(), TxStatus::Success);
	}

	#[test]
	fn both_abort_variants_carry_the_reason() {
		for status in ["abort_by_response", "abort_by_post_condition"] {
			assert_eq!(
				response(status, Some("(err u5)")).classify(),
				TxStatus::Aborted {
					reason: Some("(err u5)".to_string())
				}
			);
		}
	}

	#[test]
	fn abort_without_result_has_no_reason() {
		assert_eq!(
			response("abort_by_response", None).classify(),
			TxStatus::Aborted { reason: None }
		);
	}

	#[test]
	fn unknown_statuses_are_pending() {
		for status in ["pending", "dropped_replace_by_fee", "weird_future_status", ""] {
			assert_eq!(response(status, None).classify(), TxStatus::Pending);
		}
	}

	#[test]
	fn deserializes_indexer_body_with_extra_fields() {
		let body = r#"{
			"tx_id": "0xabc",
			"tx_status": "abort_by_response",
			"tx_result": { "hex": "0x...", "repr": "(err u9)" },
			"block_height": 12345
		}"#;
		let parsed: TxStatusResponse = serde_json::from_str(body).unwrap();
		assert_eq!(
			parsed.classify(),
			TxStatus::Aborted {
				reason: Some("(err u9)".to_string())
			}
		);
	}
}
