//! Stacks network selection and status endpoint construction.
//!
//! A single configuration value picks mainnet or testnet; the network
//! determines both the primary Hiro indexer host and the fallback
//! stacks.co node host consulted after a primary 404.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target Stacks network for status queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StacksNetwork {
	/// Production network, the default.
	#[default]
	Mainnet,
	/// Test network.
	Testnet,
}

impl StacksNetwork {
	/// Network name as it appears in API hostnames.
	pub fn as_str(&self) -> &'static str {
		match self {
			StacksNetwork::Mainnet => "mainnet",
			StacksNetwork::Testnet => "testnet",
		}
	}

	/// Base URL of the primary Hiro indexer for this network.
	pub fn primary_api_base(&self) -> String {
		format!("https://api.{}.hiro.so", self.as_str())
	}

	/// Base URL of the fallback stacks.co node API for this network.
	pub fn fallback_api_base(&self) -> String {
		format!("https://stacks-node-api.{}.stacks.co", self.as_str())
	}
}

impl fmt::Display for StacksNetwork {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for StacksNetwork {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"mainnet" => Ok(StacksNetwork::Mainnet),
			"testnet" => Ok(StacksNetwork::Testnet),
			other => Err(format!(
				"unknown network '{}': expected 'mainnet' or 'testnet'",
				other
			)),
		}
	}
}
