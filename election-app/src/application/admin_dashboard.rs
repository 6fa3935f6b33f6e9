use crate::domain::{Caller, DashboardStats};
use crate::infrastructure::db::{
    close_snapshot, read_snapshot, PollRepository, RosterRepository, VoteRepository,
};
use chrono::{DateTime, Utc};
use election_errors::AppResult;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Branch-wide overview for administrators.
pub struct AdminDashboard {
    db: Arc<DatabaseConnection>,
}

impl AdminDashboard {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn stats(&self, caller: &Caller, now: DateTime<Utc>) -> AppResult<DashboardStats> {
        caller.require_admin()?;

        let txn = read_snapshot(&self.db).await?;
        let roster = RosterRepository::new(&txn);
        let votes = VoteRepository::new(&txn);

        let polls = PollRepository::new(&txn)
            .list_in_branch(&caller.branch, None)
            .await?;
        let poll_ids: Vec<i32> = polls.iter().map(|p| p.id).collect();

        let parties = roster.parties_for_polls(&poll_ids).await?;
        let positions = roster.positions_for_polls(&poll_ids).await?;
        let position_ids: Vec<i32> = positions.iter().map(|p| p.id).collect();
        let candidates = roster.candidates_for_positions(&position_ids).await?;
        let candidate_ids: Vec<i32> = candidates.iter().map(|c| c.id).collect();

        let poll_votes = votes.counts_by_poll(&poll_ids).await?;
        let candidate_votes = votes.counts_by_candidate(&candidate_ids).await?;
        close_snapshot(txn).await?;

        tracing::debug!(branch = %caller.branch, polls = polls.len(), "Built admin dashboard");

        Ok(DashboardStats::assemble(
            polls,
            parties,
            positions,
            candidates,
            &poll_votes,
            &candidate_votes,
            now,
        ))
    }
}
