use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, loaded once from environment variables.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub port: u16,
    /// Shared secret for admin endpoints. When unset, admin endpoints reject
    /// every request.
    pub admin_token: Option<String>,
    /// CLIMATE tokens credited for each cast vote; 0 disables the reward.
    pub vote_reward: u64,
    /// How often the deadline worker sweeps for due proposals.
    pub resolve_interval: Duration,
    /// YAML file with region seed data; no file means an empty registry.
    pub regions_file: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            admin_token: None,
            vote_reward: 25,
            resolve_interval: Duration::from_secs(30),
            regions_file: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            admin_token: env::var("CLIMATE_ADMIN_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
            vote_reward: env::var("CLIMATE_VOTE_REWARD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.vote_reward),
            resolve_interval: env::var("CLIMATE_RESOLVE_INTERVAL")
                .ok()
                .and_then(|s| humantime::parse_duration(&s).ok())
                .unwrap_or(defaults.resolve_interval),
            regions_file: env::var("CLIMATE_REGIONS_FILE").ok().map(PathBuf::from),
        }
    }
}
