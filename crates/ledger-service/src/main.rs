//! Main entry point for the order ledger service.
//!
//! This binary wires the storage backend, the catalog and identity
//! collaborators, and the order ledger together, optionally seeds
//! catalog data from the configuration, and serves the HTTP API.

use clap::Parser;
use ledger_catalog::CatalogService;
use ledger_config::Config;
use ledger_identity::IdentityService;
use ledger_order::OrderLedger;
use ledger_storage::{StorageFactory, StorageService};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod seed;
mod server;

// Import implementations from individual crates
use ledger_catalog::implementations::store::create_catalog;
use ledger_identity::implementations::store::create_identity;
use ledger_storage::implementations::file::create_storage as create_file_storage;
use ledger_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments for the ledger service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the ledger service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the storage backend and domain services
/// 5. Applies seed data, then serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	// Create env filter with default from args
	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started order ledger service");

	// Load configuration
	let config = Config::from_file(args.config.to_str().unwrap()).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	// Build the storage backend and domain services
	let storage = build_storage(&config)?;

	if let Some(ref seed_config) = config.seed {
		seed::apply(seed_config, &storage).await?;
	}

	let catalog = Arc::new(CatalogService::new(create_catalog(Arc::clone(&storage))));
	let identity = Arc::new(IdentityService::new(create_identity(Arc::clone(&storage))));
	let ledger = Arc::new(OrderLedger::new(
		Arc::clone(&storage),
		Arc::clone(&catalog),
		Arc::clone(&identity),
	));

	let state = server::AppState {
		ledger,
		catalog,
		identity,
	};

	// Check if the API server should be started
	match config.api {
		Some(ref api_config) if api_config.enabled => {
			server::start_server(api_config.clone(), state).await?;
		},
		_ => {
			tracing::warn!("API server is disabled; nothing to serve");
		},
	}

	tracing::info!("Stopped order ledger service");
	Ok(())
}

/// Builds the configured storage backend wrapped in a StorageService.
///
/// The primary implementation named in the configuration is looked up in
/// the factory map and constructed from its own configuration table.
fn build_storage(config: &Config) -> Result<Arc<StorageService>, Box<dyn std::error::Error>> {
	let mut storage_factories: HashMap<&'static str, StorageFactory> = HashMap::new();
	storage_factories.insert("file", create_file_storage);
	storage_factories.insert("memory", create_memory_storage);

	let factory = storage_factories
		.get(config.storage.primary.as_str())
		.ok_or_else(|| {
			format!(
				"Unknown storage implementation '{}'",
				config.storage.primary
			)
		})?;

	let backend_config = config
		.storage
		.implementations
		.get(&config.storage.primary)
		.cloned()
		.unwrap_or_else(|| toml::Value::Table(toml::map::Map::new()));

	let backend = factory(&backend_config)?;
	Ok(Arc::new(StorageService::new(backend)))
}
