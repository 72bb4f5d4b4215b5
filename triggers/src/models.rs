use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One daily climate reading for a region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub date: NaiveDate,
    pub rainfall_mm: f64,
    pub max_temp_c: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Drought,
    Flood,
    Heat,
}

/// Daily rainfall below the floor for N consecutive days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DroughtRule {
    pub max_daily_rainfall_mm: f64,
    pub consecutive_days: usize,
}

/// Cumulative rainfall above the ceiling within a trailing window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FloodRule {
    pub cumulative_rainfall_mm: f64,
    pub window_days: usize,
}

/// Daily maximum temperature above the ceiling for M consecutive days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeatRule {
    pub min_temp_c: f64,
    pub consecutive_days: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerThresholds {
    pub drought: DroughtRule,
    pub flood: FloodRule,
    pub heat: HeatRule,
    pub payout_per_farmer: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub region_id: String,
    pub name: String,
    pub farmer_count: u64,
    pub pool_balance: u64,
    #[serde(default)]
    pub crop_types: Vec<String>,
    pub thresholds: TriggerThresholds,
    #[serde(default)]
    pub last_payout: Option<PayoutRecord>,
}

/// Verdict of one evaluation: which rule fired and what it pays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutEvent {
    pub region_id: String,
    pub kind: TriggerKind,
    pub amount: u64,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRecord {
    pub kind: TriggerKind,
    pub amount: u64,
    pub window_end: NaiveDate,
    pub triggered_at: DateTime<Utc>,
}
