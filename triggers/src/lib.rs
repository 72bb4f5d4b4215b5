//! Payout/trigger engine: evaluates regional rainfall/temperature series
//! against stored thresholds and emits payout events.
//!
//! [`evaluate`] is a pure function of (region, series) so re-running it on the
//! same inputs always yields the same verdict; whether a verdict is *recorded*
//! against the region's pool is decided separately by the [`RegionRegistry`].

mod models;
mod registry;

pub use models::{
    DroughtRule, FloodRule, HeatRule, Observation, PayoutEvent, PayoutRecord, Region, TriggerKind,
    TriggerThresholds,
};
pub use registry::{EvaluationOutcome, RegionRegistry};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("unknown region {region_id}")]
    RegionNotFound { region_id: String },
    #[error("observation series must not be empty")]
    EmptySeries,
    #[error("region {region_id} already exists")]
    DuplicateRegion { region_id: String },
}

/// Scan the most recent window of `series` against the region's thresholds.
/// Rules are checked in fixed order (drought, flood, heat); the first match
/// wins. Observations are sorted by date and duplicate dates collapse to one
/// reading before scanning, so the verdict does not depend on input order.
/// Every rule window must cover consecutive calendar days; gapped readings
/// never count.
pub fn evaluate(region: &Region, series: &[Observation]) -> Option<PayoutEvent> {
    let mut sorted: Vec<&Observation> = series.iter().collect();
    sorted.sort_by_key(|obs| obs.date);
    sorted.dedup_by_key(|obs| obs.date);

    let kind = drought_hit(&region.thresholds.drought, &sorted)
        .or_else(|| flood_hit(&region.thresholds.flood, &sorted))
        .or_else(|| heat_hit(&region.thresholds.heat, &sorted))?;

    let amount = payout_amount(region);
    if amount == 0 {
        // Pool exhausted; the condition holds but no payout can be funded.
        tracing::warn!(region = %region.region_id, ?kind, "trigger met with empty pool");
        return None;
    }

    let window_end = sorted.last().map(|obs| obs.date)?;
    let window_start = sorted.first().map(|obs| obs.date)?;
    Some(PayoutEvent {
        region_id: region.region_id.clone(),
        kind,
        amount,
        window_start,
        window_end,
    })
}

fn payout_amount(region: &Region) -> u64 {
    let full = region.farmer_count * region.thresholds.payout_per_farmer;
    full.min(region.pool_balance)
}

/// True when every adjacent pair of dates in the window is exactly one
/// calendar day apart.
fn consecutive_dates(window: &[&Observation]) -> bool {
    window
        .windows(2)
        .all(|pair| pair[0].date.succ_opt() == Some(pair[1].date))
}

/// Drought: every one of the last N consecutive daily readings below the
/// rainfall floor.
fn drought_hit(rule: &DroughtRule, sorted: &[&Observation]) -> Option<TriggerKind> {
    if rule.consecutive_days == 0 || sorted.len() < rule.consecutive_days {
        return None;
    }
    let window = &sorted[sorted.len() - rule.consecutive_days..];
    if !consecutive_dates(window) {
        return None;
    }
    window
        .iter()
        .all(|obs| obs.rainfall_mm < rule.max_daily_rainfall_mm)
        .then_some(TriggerKind::Drought)
}

/// Flood: cumulative rainfall over the trailing consecutive-day window above
/// the ceiling.
fn flood_hit(rule: &FloodRule, sorted: &[&Observation]) -> Option<TriggerKind> {
    if rule.window_days == 0 || sorted.len() < rule.window_days {
        return None;
    }
    let window = &sorted[sorted.len() - rule.window_days..];
    if !consecutive_dates(window) {
        return None;
    }
    let total: f64 = window.iter().map(|obs| obs.rainfall_mm).sum();
    (total > rule.cumulative_rainfall_mm).then_some(TriggerKind::Flood)
}

/// Heat: every one of the last M consecutive daily maxima above the
/// temperature ceiling.
fn heat_hit(rule: &HeatRule, sorted: &[&Observation]) -> Option<TriggerKind> {
    if rule.consecutive_days == 0 || sorted.len() < rule.consecutive_days {
        return None;
    }
    let window = &sorted[sorted.len() - rule.consecutive_days..];
    if !consecutive_dates(window) {
        return None;
    }
    window
        .iter()
        .all(|obs| obs.max_temp_c > rule.min_temp_c)
        .then_some(TriggerKind::Heat)
}
