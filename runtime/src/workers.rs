use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::metrics::PlatformMetrics;
use crate::server::AppState;

/// Sweep for proposals whose deadline has passed and resolve them. The
/// engine's transition-once guarantee makes an extra sweep harmless.
pub fn spawn_deadline_worker(state: AppState) -> JoinHandle<()> {
    let interval = state.config.resolve_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let resolved = state.governance.resolve_due(Utc::now()).await;
            if resolved.is_empty() {
                continue;
            }
            PlatformMetrics::record_proposals_resolved(resolved.len() as u64);
            for proposal in &resolved {
                info!(
                    proposal = %proposal.id,
                    status = ?proposal.status,
                    "deadline worker resolved proposal"
                );
            }
        }
    })
}
