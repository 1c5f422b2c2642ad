//! REST entry point for the Davenport inventory agent.

use clap::Parser;
use davenport_core::agent::{Agent, AgentOptions, RetryPolicy};
use davenport_core::checkpoint::FileCheckpointStore;
use davenport_core::model::{GeminiClient, GeminiConfig};
use davenport_core::server;
use davenport_core::store::{CatalogError, JsonCatalog};
use davenport_core::AppConfig;
use std::error::Error;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "davenport-server", about = "Furniture inventory agent REST server")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// REST API bind address (overrides config if specified)
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    init_tracing();
    info!("Starting Davenport REST server");

    let config_path = args.config.as_deref().map(Path::new);
    let config = AppConfig::load(config_path)?;
    debug!(model = %config.model, catalog = %config.catalog_path.display(), "Configuration loaded");

    let addr: SocketAddr = match args.addr {
        Some(addr) => addr,
        None => config.rest_server.bind.parse()?,
    };

    let gemini = Arc::new(GeminiClient::from_config(&GeminiConfig {
        endpoint: config.endpoint.clone(),
        api_key: config.api_key.clone(),
        embedding_model: config.embedding_model.clone(),
    }));

    let catalog = match JsonCatalog::load(&config.catalog_path) {
        Ok(catalog) => catalog,
        Err(CatalogError::Io { ref source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            warn!(
                path = %config.catalog_path.display(),
                "Catalog file not found; starting with an empty inventory. Run davenport-seed first."
            );
            JsonCatalog::empty()
        }
        Err(other) => return Err(other.into()),
    };

    let checkpoints = Arc::new(FileCheckpointStore::new(config.checkpoint_dir.clone()));

    let options = AgentOptions {
        model: config.model.clone(),
        max_turns: config.max_turns,
        retry: RetryPolicy {
            max_attempts: config.retry_attempts,
            ..RetryPolicy::default()
        },
    };

    let agent = Arc::new(Agent::new(
        gemini.clone(),
        Arc::new(catalog),
        gemini,
        checkpoints,
        options,
    ));

    info!(addr = %addr, "REST server starting");
    server::serve(agent, addr, &config.rest_server.cors_origins).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();
}
