//! Hiro indexer implementation of the status source.
//!
//! Queries the `/extended/v1/tx/{txid}` endpoint of the Hiro API as the
//! primary source and the stacks.co node API as the fallback. Response
//! handling maps HTTP outcomes onto the probe/error taxonomy the poller
//! consumes: 404 is a probe result, every other non-2xx is an error.

use crate::{FetchError, StatusProbe, StatusSource};
use async_trait::async_trait;
use confirmer_types::{StacksNetwork, TxId, TxStatusResponse};
use std::time::Duration;

/// Per-request timeout. The poll loop budgets wall-clock time itself,
/// so this only bounds a single hung request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest-based status source for the Hiro indexer API.
///
/// One instance holds a single pooled HTTP client and serves any number
/// of concurrent polls; it keeps no per-transaction state.
pub struct HiroClient {
	/// Shared HTTP client with connection pooling.
	client: reqwest::Client,
	/// Base URL of the primary indexer, no trailing slash.
	primary_base: String,
	/// Base URL of the fallback node API, no trailing slash.
	fallback_base: String,
}

impl HiroClient {
	/// Creates a client for the given network with a pooled reqwest client.
	pub fn new(network: StacksNetwork) -> Result<Self, FetchError> {
		let client = reqwest::Client::builder()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(10)
			.timeout(REQUEST_TIMEOUT)
			.build()
			.map_err(|e| FetchError::Network(e.to_string()))?;

		Ok(Self {
			client,
			primary_base: network.primary_api_base(),
			fallback_base: network.fallback_api_base(),
		})
	}

	/// Creates a client against explicit endpoint base URLs.
	///
	/// Used by tests and by deployments fronting the indexer with a proxy.
	pub fn with_endpoints(
		client: reqwest::Client,
		primary_base: impl Into<String>,
		fallback_base: impl Into<String>,
	) -> Self {
		Self {
			client,
			primary_base: primary_base.into(),
			fallback_base: fallback_base.into(),
		}
	}

	/// Issues one status query and maps the response onto the probe taxonomy.
	async fn probe(&self, base: &str, tx_id: &TxId) -> Result<StatusProbe, FetchError> {
		let url = format!("{}/extended/v1/tx/{}", base, tx_id);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| FetchError::Network(e.to_string()))?;

		let status = response.status();
		if status == reqwest::StatusCode::NOT_FOUND {
			return Ok(StatusProbe::NotFound);
		}
		if !status.is_success() {
			// Body read is best-effort; the status line alone is still useful.
			let body = response.text().await.unwrap_or_default();
			return Err(FetchError::Api {
				status: status.as_u16(),
				status_text: status.canonical_reason().unwrap_or("").to_string(),
				body,
			});
		}

		let parsed = response
			.json::<TxStatusResponse>()
			.await
			.map_err(|e| FetchError::Decode(e.to_string()))?;
		Ok(StatusProbe::Status(parsed))
	}
}

#[async_trait]
impl StatusSource for HiroClient {
	async fn primary_status(&self, tx_id: &TxId) -> Result<StatusProbe, FetchError> {
		self.probe(&self.primary_base, tx_id).await
	}

	async fn fallback_status(&self, tx_id: &TxId) -> Result<StatusProbe, FetchError> {
		self.probe(&self.fallback_base, tx_id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use confirmer_types::TxStatus;
	use httpmock::prelude::*;

	const TX: &str = "d72b0b0a2662059e6069b4e9d41a8e57c3fdbc1cdd2a2c6ff0e4b4ac2e8f2f01";

	fn tx_id() -> TxId {
		TxId::parse(TX).unwrap()
	}

	fn client_for(server: &MockServer) -> HiroClient {
		HiroClient::with_endpoints(reqwest::Client::new(), server.base_url(), server.base_url())
	}

	#[tokio::test]
	async fn maps_success_body_to_status_probe() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(GET).path(format!("/extended/v1/tx/0x{}", TX));
				then.status(200)
					.header("content-type", "application/json")
					.body(r#"{"tx_status":"success","tx_result":{"repr":"(ok true)"}}"#);
			})
			.await;

		let probe = client_for(&server).primary_status(&tx_id()).await.unwrap();
		match probe {
			StatusProbe::Status(response) => assert_eq!(response.classify(), TxStatus::Success),
			other => panic!("unexpected probe: {:?}", other),
		}
		mock.assert_async().await;
	}

	#[tokio::test]
	async fn maps_404_to_not_found() {
		let server = MockServer::start_async().await;
		server
			.mock_async(|when, then| {
				when.method(GET).path(format!("/extended/v1/tx/0x{}", TX));
				then.status(404).body(r#"{"error":"not found"}"#);
			})
			.await;

		let probe = client_for(&server).primary_status(&tx_id()).await.unwrap();
		assert_eq!(probe, StatusProbe::NotFound);
	}

	#[tokio::test]
	async fn maps_server_error_to_api_error_with_body() {
		let server = MockServer::start_async().await;
		server
			.mock_async(|when, then| {
				when.method(GET).path(format!("/extended/v1/tx/0x{}", TX));
				then.status(500).body("indexer exploded");
			})
			.await;

		let err = client_for(&server)
			.primary_status(&tx_id())
			.await
			.unwrap_err();
		match err {
			FetchError::Api {
				status,
				status_text,
				body,
			} => {
				assert_eq!(status, 500);
				assert_eq!(status_text, "Internal Server Error");
				assert_eq!(body, "indexer exploded");
			},
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[tokio::test]
	async fn maps_malformed_body_to_decode_error() {
		let server = MockServer::start_async().await;
		server
			.mock_async(|when, then| {
				when.method(GET).path(format!("/extended/v1/tx/0x{}", TX));
				then.status(200)
					.header("content-type", "application/json")
					.body("not json");
			})
			.await;

		let err = client_for(&server)
			.primary_status(&tx_id())
			.await
			.unwrap_err();
		assert!(matches!(err, FetchError::Decode(_)));
	}

	#[tokio::test]
	async fn unreachable_host_is_a_network_error() {
		// Port 9 is discard; nothing listens there in the test environment.
		let client = HiroClient::with_endpoints(
			reqwest::Client::new(),
			"http://127.0.0.1:9",
			"http://127.0.0.1:9",
		);

		let err = client.primary_status(&tx_id()).await.unwrap_err();
		assert!(matches!(err, FetchError::Network(_)));
	}
}
