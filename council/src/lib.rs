//! Ethics council registry: membership with unique ids plus a record of past
//! council decisions. No quorum logic; decisions are recorded, not computed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CouncilError {
    #[error("council member {member_id} already exists")]
    DuplicateMember { member_id: String },
    #[error("unknown council member {member_id}")]
    MemberNotFound { member_id: String },
    #[error("council member {member_id} was already removed")]
    AlreadyRemoved { member_id: String },
    #[error("member name must not be empty")]
    EmptyName,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Removed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouncilMember {
    pub member_id: String,
    pub name: String,
    pub role: String,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub removed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecisionOutcome {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub decision_id: String,
    pub title: String,
    pub summary: String,
    pub outcome: DecisionOutcome,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CouncilState {
    members: HashMap<String, CouncilMember>,
    decisions: Vec<DecisionRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct CouncilRegistry {
    state: Arc<RwLock<CouncilState>>,
}

impl CouncilRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_member(&self, name: &str, role: &str) -> Result<CouncilMember, CouncilError> {
        self.add_member_with_id(&format!("member-{}", Uuid::new_v4()), name, role)
            .await
    }

    /// Add a member under a caller-chosen id; ids are unique across active and
    /// removed members alike.
    pub async fn add_member_with_id(
        &self,
        member_id: &str,
        name: &str,
        role: &str,
    ) -> Result<CouncilMember, CouncilError> {
        if name.trim().is_empty() {
            return Err(CouncilError::EmptyName);
        }
        let mut guard = self.state.write().await;
        if guard.members.contains_key(member_id) {
            return Err(CouncilError::DuplicateMember {
                member_id: member_id.to_string(),
            });
        }
        let member = CouncilMember {
            member_id: member_id.to_string(),
            name: name.trim().to_string(),
            role: role.trim().to_string(),
            status: MemberStatus::Active,
            joined_at: Utc::now(),
            removed_at: None,
        };
        guard.members.insert(member_id.to_string(), member.clone());
        info!(member = %member_id, role = %member.role, "council member added");
        Ok(member)
    }

    /// Mark a member removed; the record stays so past decisions keep their
    /// attribution.
    pub async fn remove_member(&self, member_id: &str) -> Result<CouncilMember, CouncilError> {
        let mut guard = self.state.write().await;
        let member =
            guard
                .members
                .get_mut(member_id)
                .ok_or_else(|| CouncilError::MemberNotFound {
                    member_id: member_id.to_string(),
                })?;
        if member.status == MemberStatus::Removed {
            return Err(CouncilError::AlreadyRemoved {
                member_id: member_id.to_string(),
            });
        }
        member.status = MemberStatus::Removed;
        member.removed_at = Some(Utc::now());
        info!(member = %member_id, "council member removed");
        Ok(member.clone())
    }

    pub async fn get_member(&self, member_id: &str) -> Option<CouncilMember> {
        let guard = self.state.read().await;
        guard.members.get(member_id).cloned()
    }

    pub async fn list_members(&self, include_removed: bool) -> Vec<CouncilMember> {
        let guard = self.state.read().await;
        let mut members: Vec<CouncilMember> = guard
            .members
            .values()
            .filter(|m| include_removed || m.status == MemberStatus::Active)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.member_id.cmp(&b.member_id)));
        members
    }

    pub async fn record_decision(
        &self,
        title: &str,
        summary: &str,
        outcome: DecisionOutcome,
    ) -> DecisionRecord {
        let record = DecisionRecord {
            decision_id: format!("decision-{}", Uuid::new_v4()),
            title: title.to_string(),
            summary: summary.to_string(),
            outcome,
            decided_at: Utc::now(),
        };
        let mut guard = self.state.write().await;
        guard.decisions.push(record.clone());
        info!(decision = %record.decision_id, ?outcome, "council decision recorded");
        record
    }

    /// Past decisions, newest first.
    pub async fn decisions(&self) -> Vec<DecisionRecord> {
        let guard = self.state.read().await;
        let mut decisions = guard.decisions.clone();
        decisions.reverse();
        decisions
    }
}
