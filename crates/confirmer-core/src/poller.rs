//! The confirmation poll loop.
//!
//! Polls the primary status endpoint at a fixed interval until the
//! transaction reaches a terminal state or the overall budget elapses.
//! A primary 404 triggers one fallback probe; fallback failures are the
//! only locally-recovered errors in the loop, everything else is
//! fail-fast so callers never get false confidence about ledger state.

use crate::{BenignAbortPolicy, Confirmation, ConfirmError, UNKNOWN_ABORT_REASON};
use confirmer_client::{StatusProbe, StatusSource};
use confirmer_types::{truncate_id, TxId, TxStatus};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Default overall poll budget.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
/// Default delay between successive status checks.
const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Errors that can occur when building a poll configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollConfigError {
	/// The overall timeout must be non-zero.
	#[error("poll timeout must be positive")]
	ZeroTimeout,
	/// The inter-poll interval must be non-zero.
	#[error("poll interval must be positive")]
	ZeroInterval,
}

/// Tuning parameters for one confirmation poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
	timeout: Duration,
	interval: Duration,
}

impl PollConfig {
	/// Creates a configuration, rejecting zero durations.
	pub fn new(timeout: Duration, interval: Duration) -> Result<Self, PollConfigError> {
		if timeout.is_zero() {
			return Err(PollConfigError::ZeroTimeout);
		}
		if interval.is_zero() {
			return Err(PollConfigError::ZeroInterval);
		}
		Ok(Self { timeout, interval })
	}

	/// Total wall-clock budget for the poll loop.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Delay between successive status checks.
	pub fn interval(&self) -> Duration {
		self.interval
	}
}

impl Default for PollConfig {
	fn default() -> Self {
		Self {
			timeout: DEFAULT_TIMEOUT,
			interval: DEFAULT_INTERVAL,
		}
	}
}

/// Polls a status source until a transaction resolves.
///
/// Each call to [`confirm`](Self::confirm) is an independent, self-contained
/// operation: the poller holds no per-transaction state, so concurrent
/// polls for the same id run with separate timers and are not deduplicated.
pub struct ConfirmationPoller<S> {
	source: S,
	config: PollConfig,
	policy: BenignAbortPolicy,
}

impl<S: StatusSource> ConfirmationPoller<S> {
	/// Creates a poller with the default budget, interval, and benign policy.
	pub fn new(source: S) -> Self {
		Self::with_config(source, PollConfig::default(), BenignAbortPolicy::default())
	}

	/// Creates a poller with explicit tuning and abort policy.
	pub fn with_config(source: S, config: PollConfig, policy: BenignAbortPolicy) -> Self {
		Self {
			source,
			config,
			policy,
		}
	}

	/// Resolves a transaction id to a definitive outcome.
	///
	/// Validates the id before any network I/O, then polls until the
	/// ledger reports a terminal status or the budget elapses.
	pub async fn confirm(&self, tx_id: &str) -> Result<Confirmation, ConfirmError> {
		self.confirm_with_cancellation(tx_id, &CancellationToken::new())
			.await
	}

	/// Like [`confirm`](Self::confirm), with a caller-observable cancellation
	/// signal covering the whole poll.
	///
	/// One token is tied to the entire poll lifetime, so cancelling aborts
	/// whichever request or sleep is currently in flight and settles the
	/// call with [`ConfirmError::Cancelled`].
	#[instrument(skip_all, fields(tx_id = %truncate_id(tx_id)))]
	pub async fn confirm_with_cancellation(
		&self,
		tx_id: &str,
		cancel: &CancellationToken,
	) -> Result<Confirmation, ConfirmError> {
		let tx_id = TxId::parse(tx_id)?;
		let started = tokio::time::Instant::now();

		loop {
			// Budget check at the top of each iteration, before issuing a
			// new request. Overrun is bounded by one in-flight request.
			let waited = started.elapsed();
			if waited > self.config.timeout {
				tracing::warn!(
					waited_secs = waited.as_secs(),
					"Confirmation timed out"
				);
				return Err(ConfirmError::Timeout { waited });
			}

			let probe = tokio::select! {
				biased;
				_ = cancel.cancelled() => return Err(ConfirmError::Cancelled),
				result = self.source.primary_status(&tx_id) => result?,
			};

			match probe {
				StatusProbe::Status(response) => {
					if let Some(outcome) = self.classify(response.classify())? {
						return Ok(outcome);
					}
					tracing::debug!(
						elapsed_secs = started.elapsed().as_secs(),
						"Transaction still pending"
					);
				},
				StatusProbe::NotFound => {
					// The primary not knowing the transaction is not fatal;
					// ask the fallback once, then keep polling the primary.
					if let Some(outcome) = self.try_fallback(&tx_id, cancel).await? {
						return Ok(outcome);
					}
				},
			}

			tokio::select! {
				biased;
				_ = cancel.cancelled() => return Err(ConfirmError::Cancelled),
				_ = tokio::time::sleep(self.config.interval) => {},
			}
		}
	}

	/// Maps a classified status onto the poll outcome.
	///
	/// Returns `Ok(None)` for non-terminal statuses so the loop continues.
	fn classify(&self, status: TxStatus) -> Result<Option<Confirmation>, ConfirmError> {
		match status {
			TxStatus::Success => Ok(Some(Confirmation::Confirmed)),
			TxStatus::Aborted { reason } => match reason {
				Some(reason) if self.policy.is_benign(&reason) => {
					tracing::info!(reason = %reason, "Transaction aborted with benign reason");
					Ok(Some(Confirmation::BenignAbort { reason }))
				},
				reason => Err(ConfirmError::Aborted {
					reason: reason.unwrap_or_else(|| UNKNOWN_ABORT_REASON.to_string()),
				}),
			},
			TxStatus::Pending => Ok(None),
		}
	}

	/// One fallback probe after a primary 404.
	///
	/// Terminal fallback statuses resolve or fail the poll; everything
	/// else (fallback errors, 404s, non-terminal statuses) is recovered
	/// locally and the loop continues with the primary.
	async fn try_fallback(
		&self,
		tx_id: &TxId,
		cancel: &CancellationToken,
	) -> Result<Option<Confirmation>, ConfirmError> {
		let probe = tokio::select! {
			biased;
			_ = cancel.cancelled() => return Err(ConfirmError::Cancelled),
			result = self.source.fallback_status(tx_id) => result,
		};

		match probe {
			Ok(StatusProbe::Status(response)) => match response.classify() {
				TxStatus::Pending => {
					tracing::debug!("Fallback reports non-terminal status; continuing");
					Ok(None)
				},
				terminal => self.classify(terminal),
			},
			Ok(StatusProbe::NotFound) => {
				tracing::debug!("Transaction unknown to fallback as well; continuing");
				Ok(None)
			},
			Err(error) => {
				tracing::warn!(error = %error, "Fallback status check failed; continuing");
				Ok(None)
			},
		}
	}
}
