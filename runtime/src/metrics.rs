use ::metrics::counter;

/// Domain operation counters. Recorder-agnostic; wiring an exporter is an
/// operator concern.
pub struct PlatformMetrics;

impl PlatformMetrics {
    pub fn increment_ledger_operation(operation: &str, result: &str) {
        counter!("climate_ledger_operations_total", 1,
            "operation" => operation.to_string(),
            "result" => result.to_string()
        );
    }

    pub fn increment_votes_cast(choice: &str) {
        counter!("climate_votes_cast_total", 1, "choice" => choice.to_string());
    }

    pub fn record_proposals_resolved(count: u64) {
        counter!("climate_proposals_resolved_total", count);
    }

    pub fn increment_payout_triggered(kind: &str) {
        counter!("climate_payouts_triggered_total", 1, "kind" => kind.to_string());
    }
}
