pub mod config;
pub mod events;
pub mod metrics;
pub mod server;
pub mod workers;
