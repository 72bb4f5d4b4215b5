use anyhow::Result;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use runtime::config::RuntimeConfig;
use runtime::server::{self, AppState};
use runtime::workers::spawn_deadline_worker;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = RuntimeConfig::from_env();

    let regions = match &config.regions_file {
        Some(path) => triggers::RegionRegistry::load(path)?,
        None => {
            warn!("CLIMATE_REGIONS_FILE not set; starting with an empty region registry");
            triggers::RegionRegistry::default()
        }
    };
    if config.admin_token.is_none() {
        warn!("CLIMATE_ADMIN_TOKEN not set; admin endpoints are disabled");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, regions);

    spawn_deadline_worker(state.clone());
    info!(
        interval = ?state.config.resolve_interval,
        "proposal deadline worker started"
    );

    server::serve(addr, state).await
}
