//! Main entry point for the transaction confirmation service.
//!
//! This binary wires the Hiro status client into the confirmation
//! poller and exposes it over a small HTTP API consumed by the
//! donation-verification form and the dashboard verification widget.

use clap::Parser;
use confirmer_client::implementations::hiro::HiroClient;
use confirmer_config::Config;
use confirmer_core::{BenignAbortPolicy, ConfirmationPoller, PollConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod server;

/// Command-line arguments for the confirmation service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "confirmer.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the confirmation service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the confirmation poller
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started confirmer");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!(
		"Loaded configuration [{}] for network {}",
		config.confirmer.id,
		config.confirmer.network
	);

	let poller = Arc::new(build_poller(&config)?);
	server::start_server(config, poller).await?;

	tracing::info!("Stopped confirmer");
	Ok(())
}

/// Builds the confirmation poller from configuration.
///
/// The poller is the single source of truth for ledger-confirmation
/// semantics; every API consumer goes through this one instance.
fn build_poller(
	config: &Config,
) -> Result<ConfirmationPoller<HiroClient>, Box<dyn std::error::Error>> {
	let source = HiroClient::new(config.confirmer.network)?;

	let poll_config = PollConfig::new(
		Duration::from_secs(config.poller.timeout_seconds),
		Duration::from_secs(config.poller.interval_seconds),
	)?;

	let policy = match &config.poller.benign_abort_patterns {
		Some(patterns) => BenignAbortPolicy::new(patterns)?,
		None => BenignAbortPolicy::default(),
	};

	Ok(ConfirmationPoller::with_config(source, poll_config, policy))
}
