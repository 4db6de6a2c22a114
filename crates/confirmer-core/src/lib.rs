//! Transaction confirmation core for the donation platform.
//!
//! This crate owns the one piece of ledger-confirmation semantics in the
//! system: given a transaction id, poll the status API until the
//! transaction is confirmed, definitively fails, or a timeout elapses.
//! Certain contract abort codes are intentionally raised for conditions
//! callers should treat as a successful no-op; those are classified by
//! the [`benign::BenignAbortPolicy`] rather than surfaced as failures.
//!
//! Every caller that needs confirmation semantics goes through
//! [`poller::ConfirmationPoller`]; there is deliberately no second copy
//! of this logic anywhere in the workspace.

use confirmer_client::FetchError;
use confirmer_types::TxIdError;
use std::time::Duration;
use thiserror::Error;

/// Benign abort-reason classification policy.
pub mod benign;
/// The confirmation poll loop.
pub mod poller;

pub use benign::{BenignAbortPolicy, DEFAULT_BENIGN_ABORT_PATTERNS};
pub use poller::{ConfirmationPoller, PollConfig, PollConfigError};

/// Reason reported when a transaction aborts without one.
const UNKNOWN_ABORT_REASON: &str = "unknown reason";

/// Favorable terminal outcome of a confirmation poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
	/// The ledger reports the transaction as successfully mined.
	Confirmed,
	/// The transaction aborted with a known-benign contract error code.
	///
	/// Treated as resolution, not failure; the reason is preserved so
	/// callers can render the no-op outcome distinctly.
	BenignAbort {
		/// The abort reason that matched the benign policy.
		reason: String,
	},
}

/// Errors that can occur during a confirmation poll.
///
/// Everything here is terminal for the poll that produced it. The only
/// locally-recovered failures are fallback-endpoint errors, which are
/// logged inside the loop and never surface.
#[derive(Debug, Clone, Error)]
pub enum ConfirmError {
	/// The supplied transaction id is malformed; no network I/O was done.
	#[error("invalid transaction id format: {0}")]
	InvalidTxId(#[from] TxIdError),
	/// The overall poll budget elapsed without a terminal status.
	#[error("transaction not confirmed after {}s", waited.as_secs())]
	Timeout {
		/// Wall-clock time spent polling before giving up.
		waited: Duration,
	},
	/// Terminal abort whose reason matched no benign pattern.
	#[error("transaction aborted: {reason}")]
	Aborted {
		/// Raw abort reason, or "unknown reason" when the indexer gave none.
		reason: String,
	},
	/// Transport-level failure on the primary endpoint.
	#[error("network error: {0}")]
	Network(String),
	/// Non-2xx, non-404 response from the primary endpoint.
	#[error("status API returned {status} {status_text}: {body}")]
	Api {
		/// HTTP status code.
		status: u16,
		/// Canonical status text, empty when unknown.
		status_text: String,
		/// Response body, read best-effort for diagnostics.
		body: String,
	},
	/// 2xx primary response whose body could not be decoded.
	#[error("malformed status response: {0}")]
	MalformedResponse(String),
	/// The caller's cancellation signal fired mid-poll.
	#[error("confirmation cancelled by caller")]
	Cancelled,
}

impl From<FetchError> for ConfirmError {
	fn from(err: FetchError) -> Self {
		match err {
			FetchError::Network(message) => ConfirmError::Network(message),
			FetchError::Api {
				status,
				status_text,
				body,
			} => ConfirmError::Api {
				status,
				status_text,
				body,
			},
			FetchError::Decode(message) => ConfirmError::MalformedResponse(message),
		}
	}
}
