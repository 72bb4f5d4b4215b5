use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalKind {
    PayoutPolicy,
    EthicsMember,
    FundAllocation,
    RegionExpansion,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum ProposalStatus {
    Active,
    Passed,
    Failed,
}

impl ProposalStatus {
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_ascii_lowercase().as_str() {
            "active" => Some(ProposalStatus::Active),
            "passed" => Some(ProposalStatus::Passed),
            "failed" => Some(ProposalStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    For,
    Against,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: ProposalKind,
    pub proposer: String,
    pub votes_for: u64,
    pub votes_against: u64,
    pub deadline: DateTime<Utc>,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub voters: HashSet<String>,
}

impl Proposal {
    pub fn new(
        id: String,
        title: &str,
        description: &str,
        kind: ProposalKind,
        proposer: &str,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            kind,
            proposer: proposer.to_string(),
            votes_for: 0,
            votes_against: 0,
            deadline,
            status: ProposalStatus::Active,
            created_at: Utc::now(),
            resolved_at: None,
            voters: HashSet::new(),
        }
    }

    pub fn summary(&self) -> ProposalSummary {
        ProposalSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            kind: self.kind,
            votes_for: self.votes_for,
            votes_against: self.votes_against,
            deadline: self.deadline,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSummary {
    pub id: String,
    pub title: String,
    pub kind: ProposalKind,
    pub votes_for: u64,
    pub votes_against: u64,
    pub deadline: DateTime<Utc>,
    pub status: ProposalStatus,
}
