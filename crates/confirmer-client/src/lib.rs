//! Status API client module for the confirmation service.
//!
//! This module defines the abstraction the confirmation poller uses to
//! query transaction status, decoupling the poll loop from any concrete
//! HTTP client so it can be unit-tested without network access.

use async_trait::async_trait;
use confirmer_types::{TxId, TxStatusResponse};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod hiro;
}

/// Errors that can occur while querying a status endpoint.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
	/// Transport-level failure before any response was received.
	#[error("network error: {0}")]
	Network(String),
	/// Non-2xx, non-404 response from the endpoint.
	#[error("status API returned {status} {status_text}: {body}")]
	Api {
		/// HTTP status code.
		status: u16,
		/// Canonical status text, empty when unknown.
		status_text: String,
		/// Response body, read best-effort for diagnostics.
		body: String,
	},
	/// 2xx response whose body was not the expected JSON shape.
	#[error("failed to decode status response: {0}")]
	Decode(String),
}

/// Outcome of a single status query that received a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusProbe {
	/// The endpoint returned a status body for the transaction.
	Status(TxStatusResponse),
	/// The endpoint does not know the transaction (HTTP 404).
	NotFound,
}

/// Trait defining the interface for transaction status sources.
///
/// This is the seam between the poll loop and the outside world: the
/// poller only ever calls these two methods. A source exposes a primary
/// endpoint plus a secondary one consulted after a primary 404.
#[async_trait]
pub trait StatusSource: Send + Sync {
	/// Queries the primary status endpoint for a transaction.
	async fn primary_status(&self, tx_id: &TxId) -> Result<StatusProbe, FetchError>;

	/// Queries the fallback status endpoint for a transaction.
	async fn fallback_status(&self, tx_id: &TxId) -> Result<StatusProbe, FetchError>;
}
