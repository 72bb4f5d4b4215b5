use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::{Observation, PayoutEvent, PayoutRecord, Region};
use crate::{evaluate, TriggerError};

/// In-memory region store. Seeded once at startup from a YAML regions file;
/// the only mutation afterwards is recording payouts.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    state: Arc<RwLock<HashMap<String, Region>>>,
}

/// Result of evaluating a series against a region. The verdict is the pure
/// outcome; `recorded` says whether this call debited the pool. A re-run over
/// an already-paid window keeps the verdict but records nothing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOutcome {
    pub verdict: Option<PayoutEvent>,
    pub recorded: bool,
}

impl RegionRegistry {
    pub fn new(regions: Vec<Region>) -> Result<Self, TriggerError> {
        let mut map = HashMap::new();
        for region in regions {
            if map.contains_key(&region.region_id) {
                return Err(TriggerError::DuplicateRegion {
                    region_id: region.region_id,
                });
            }
            map.insert(region.region_id.clone(), region);
        }
        Ok(Self {
            state: Arc::new(RwLock::new(map)),
        })
    }

    /// Load region seed data from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading regions file at {}", path.display()))?;
        let regions: Vec<Region> =
            serde_yaml::from_str(&raw).context("parsing regions YAML")?;
        info!(count = regions.len(), path = %path.display(), "loaded region seed data");
        Self::new(regions).map_err(Into::into)
    }

    pub async fn get(&self, region_id: &str) -> Option<Region> {
        let guard = self.state.read().await;
        guard.get(region_id).cloned()
    }

    pub async fn list(&self) -> Vec<Region> {
        let guard = self.state.read().await;
        let mut regions: Vec<Region> = guard.values().cloned().collect();
        regions.sort_by(|a, b| a.region_id.cmp(&b.region_id));
        regions
    }

    /// Evaluate `series` for a region and, when a rule fires over a window not
    /// yet paid out, debit the pool and stamp the payout, all under one write
    /// guard.
    pub async fn evaluate_and_record(
        &self,
        region_id: &str,
        series: &[Observation],
    ) -> Result<EvaluationOutcome, TriggerError> {
        if series.is_empty() {
            return Err(TriggerError::EmptySeries);
        }
        let mut guard = self.state.write().await;
        let region = guard
            .get_mut(region_id)
            .ok_or_else(|| TriggerError::RegionNotFound {
                region_id: region_id.to_string(),
            })?;

        let verdict = evaluate(region, series);
        let event = match verdict {
            Some(ref event) => event,
            None => {
                return Ok(EvaluationOutcome {
                    verdict: None,
                    recorded: false,
                })
            }
        };

        let already_paid = region
            .last_payout
            .as_ref()
            .map(|record| record.window_end >= event.window_end)
            .unwrap_or(false);
        if already_paid {
            return Ok(EvaluationOutcome {
                verdict,
                recorded: false,
            });
        }

        region.pool_balance -= event.amount;
        region.last_payout = Some(PayoutRecord {
            kind: event.kind,
            amount: event.amount,
            window_end: event.window_end,
            triggered_at: Utc::now(),
        });
        info!(
            region = %region_id,
            kind = ?event.kind,
            amount = event.amount,
            pool = region.pool_balance,
            "payout triggered"
        );
        Ok(EvaluationOutcome {
            verdict,
            recorded: true,
        })
    }
}
