//! Governance engine: community proposals with one vote per account and a
//! single, deadline-driven resolution per proposal.

mod models;

pub use models::{Proposal, ProposalKind, ProposalStatus, ProposalSummary, VoteChoice};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// A proposal passes when at least this share of cast votes are in favour.
pub const APPROVAL_THRESHOLD_PCT: u64 = 60;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("account {account} already voted on proposal {proposal_id}")]
    AlreadyVoted {
        account: String,
        proposal_id: String,
    },
    #[error("proposal {proposal_id} is closed for voting")]
    ProposalClosed { proposal_id: String },
    #[error("unknown proposal {proposal_id}")]
    ProposalNotFound { proposal_id: String },
    #[error("proposal deadline must be in the future")]
    DeadlineInPast,
    #[error("proposal title must not be empty")]
    EmptyTitle,
}

#[derive(Debug, Clone)]
pub struct GovernanceEngine {
    state: Arc<RwLock<HashMap<String, Proposal>>>,
}

impl Default for GovernanceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GovernanceEngine {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn submit(
        &self,
        title: &str,
        description: &str,
        kind: ProposalKind,
        proposer: &str,
        deadline: DateTime<Utc>,
    ) -> Result<Proposal, GovernanceError> {
        if title.trim().is_empty() {
            return Err(GovernanceError::EmptyTitle);
        }
        if deadline <= Utc::now() {
            return Err(GovernanceError::DeadlineInPast);
        }
        let proposal = Proposal::new(
            Uuid::new_v4().to_string(),
            title.trim(),
            description,
            kind,
            proposer,
            deadline,
        );
        let mut guard = self.state.write().await;
        guard.insert(proposal.id.clone(), proposal.clone());
        info!(proposal = %proposal.id, %proposer, "proposal submitted");
        Ok(proposal)
    }

    /// Record one vote per account per proposal. Voting closes at the deadline
    /// even if the status transition has not fired yet.
    pub async fn cast_vote(
        &self,
        account: &str,
        proposal_id: &str,
        choice: VoteChoice,
    ) -> Result<Proposal, GovernanceError> {
        self.cast_vote_at(account, proposal_id, choice, Utc::now())
            .await
    }

    pub async fn cast_vote_at(
        &self,
        account: &str,
        proposal_id: &str,
        choice: VoteChoice,
        now: DateTime<Utc>,
    ) -> Result<Proposal, GovernanceError> {
        let mut guard = self.state.write().await;
        let proposal =
            guard
                .get_mut(proposal_id)
                .ok_or_else(|| GovernanceError::ProposalNotFound {
                    proposal_id: proposal_id.to_string(),
                })?;
        if proposal.status != ProposalStatus::Active || now >= proposal.deadline {
            return Err(GovernanceError::ProposalClosed {
                proposal_id: proposal_id.to_string(),
            });
        }
        if !proposal.voters.insert(account.to_string()) {
            return Err(GovernanceError::AlreadyVoted {
                account: account.to_string(),
                proposal_id: proposal_id.to_string(),
            });
        }
        match choice {
            VoteChoice::For => proposal.votes_for += 1,
            VoteChoice::Against => proposal.votes_against += 1,
        }
        debug!(proposal = %proposal_id, %account, ?choice, "vote recorded");
        Ok(proposal.clone())
    }

    /// Transition every Active proposal whose deadline has passed, exactly
    /// once. Returns the proposals resolved by this call; re-running with the
    /// same `now` resolves nothing further.
    pub async fn resolve_due(&self, now: DateTime<Utc>) -> Vec<Proposal> {
        let mut guard = self.state.write().await;
        let mut resolved = Vec::new();
        for proposal in guard.values_mut() {
            if proposal.status != ProposalStatus::Active || proposal.deadline > now {
                continue;
            }
            let total = proposal.votes_for + proposal.votes_against;
            let passed = total > 0 && proposal.votes_for * 100 >= total * APPROVAL_THRESHOLD_PCT;
            proposal.status = if passed {
                ProposalStatus::Passed
            } else {
                ProposalStatus::Failed
            };
            proposal.resolved_at = Some(now);
            info!(
                proposal = %proposal.id,
                votes_for = proposal.votes_for,
                votes_against = proposal.votes_against,
                status = ?proposal.status,
                "proposal resolved"
            );
            resolved.push(proposal.clone());
        }
        resolved
    }

    pub async fn get(&self, proposal_id: &str) -> Option<Proposal> {
        let guard = self.state.read().await;
        guard.get(proposal_id).cloned()
    }

    /// Proposals newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<ProposalStatus>) -> Vec<Proposal> {
        let guard = self.state.read().await;
        let mut proposals: Vec<Proposal> = guard
            .values()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();
        proposals.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        proposals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn engine_with_proposal(deadline: DateTime<Utc>) -> (GovernanceEngine, String) {
        let engine = GovernanceEngine::new();
        let proposal = engine
            .submit(
                "Increase Drought Payout Threshold",
                "Raise the drought trigger payout for affected zones",
                ProposalKind::PayoutPolicy,
                "farmer-1",
                deadline,
            )
            .await
            .unwrap();
        (engine, proposal.id)
    }

    #[tokio::test]
    async fn second_vote_from_same_account_is_rejected() {
        let (engine, id) = engine_with_proposal(Utc::now() + Duration::days(3)).await;
        engine
            .cast_vote("farmer-2", &id, VoteChoice::For)
            .await
            .unwrap();
        let err = engine
            .cast_vote("farmer-2", &id, VoteChoice::Against)
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::AlreadyVoted { .. }));

        let proposal = engine.get(&id).await.unwrap();
        assert_eq!(proposal.votes_for, 1);
        assert_eq!(proposal.votes_against, 0);
    }

    #[tokio::test]
    async fn voting_closes_at_deadline() {
        let deadline = Utc::now() + Duration::hours(1);
        let (engine, id) = engine_with_proposal(deadline).await;
        let err = engine
            .cast_vote_at("farmer-2", &id, VoteChoice::For, deadline)
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalClosed { .. }));
    }

    #[tokio::test]
    async fn resolution_applies_sixty_percent_threshold() {
        let deadline = Utc::now() + Duration::hours(1);
        let (engine, id) = engine_with_proposal(deadline).await;
        // 3 for, 2 against = 60% exactly: passes.
        for voter in ["v1", "v2", "v3"] {
            engine.cast_vote(voter, &id, VoteChoice::For).await.unwrap();
        }
        for voter in ["v4", "v5"] {
            engine
                .cast_vote(voter, &id, VoteChoice::Against)
                .await
                .unwrap();
        }

        let resolved = engine.resolve_due(deadline).await;
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].status, ProposalStatus::Passed);
    }

    #[tokio::test]
    async fn below_threshold_and_unvoted_proposals_fail() {
        let deadline = Utc::now() + Duration::hours(1);
        let (engine, contested) = engine_with_proposal(deadline).await;
        engine
            .cast_vote("v1", &contested, VoteChoice::For)
            .await
            .unwrap();
        engine
            .cast_vote("v2", &contested, VoteChoice::Against)
            .await
            .unwrap();
        let unvoted = engine
            .submit(
                "Expand to Eastern Plains",
                "",
                ProposalKind::RegionExpansion,
                "farmer-9",
                deadline,
            )
            .await
            .unwrap();

        let resolved = engine.resolve_due(deadline).await;
        assert_eq!(resolved.len(), 2);
        for proposal in resolved {
            assert_eq!(proposal.status, ProposalStatus::Failed);
            assert!(proposal.id == contested || proposal.id == unvoted.id);
        }
    }

    #[tokio::test]
    async fn resolution_fires_exactly_once() {
        let deadline = Utc::now() + Duration::hours(1);
        let (engine, id) = engine_with_proposal(deadline).await;
        engine.cast_vote("v1", &id, VoteChoice::For).await.unwrap();

        assert_eq!(engine.resolve_due(deadline).await.len(), 1);
        assert!(engine.resolve_due(deadline).await.is_empty());
        assert!(engine.resolve_due(deadline + Duration::days(1)).await.is_empty());
        assert_eq!(
            engine.get(&id).await.unwrap().status,
            ProposalStatus::Passed
        );
    }

    #[tokio::test]
    async fn voting_on_resolved_proposal_is_closed() {
        let deadline = Utc::now() + Duration::hours(1);
        let (engine, id) = engine_with_proposal(deadline).await;
        engine.resolve_due(deadline).await;
        let err = engine
            .cast_vote_at("v1", &id, VoteChoice::For, deadline - Duration::minutes(5))
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalClosed { .. }));
    }

    #[tokio::test]
    async fn submit_validates_title_and_deadline() {
        let engine = GovernanceEngine::new();
        assert!(matches!(
            engine
                .submit(
                    "  ",
                    "",
                    ProposalKind::FundAllocation,
                    "farmer-1",
                    Utc::now() + Duration::days(1)
                )
                .await,
            Err(GovernanceError::EmptyTitle)
        ));
        assert!(matches!(
            engine
                .submit(
                    "Legit",
                    "",
                    ProposalKind::FundAllocation,
                    "farmer-1",
                    Utc::now() - Duration::days(1)
                )
                .await,
            Err(GovernanceError::DeadlineInPast)
        ));
    }
}
