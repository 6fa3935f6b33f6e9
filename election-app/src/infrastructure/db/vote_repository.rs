use super::entities::{candidate_vote, vote, CandidateVote, Vote};
use super::{db_error, to_count};
use crate::domain::VoteCounts;
use chrono::NaiveDate;
use election_errors::AppResult;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use std::collections::HashMap;
use uuid::Uuid;

const VOTE_DAY: &str = r#"DATE("votes"."created_at" AT TIME ZONE 'UTC')"#;

/// Aggregates over cast ballots. Ballots are written elsewhere; this side only
/// counts them. Run related counts on one snapshot so they agree.
pub struct VoteRepository<'a, C> {
    db: &'a C,
}

#[derive(FromQueryResult)]
struct DailyCount {
    day: NaiveDate,
    votes: i64,
}

#[derive(FromQueryResult)]
struct PollVotes {
    poll_id: i32,
    votes: i64,
}

#[derive(FromQueryResult)]
struct CandidateVotes {
    candidate_id: i32,
    votes: i64,
}

impl<'a, C: ConnectionTrait> VoteRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn count_for_poll(&self, poll_id: i32) -> AppResult<u64> {
        Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .count(self.db)
            .await
            .map_err(db_error)
    }

    pub async fn has_voted(&self, user_id: Uuid, poll_id: i32) -> AppResult<bool> {
        let count = Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::PollId.eq(poll_id))
            .count(self.db)
            .await
            .map_err(db_error)?;
        Ok(count > 0)
    }

    /// Ballots per UTC calendar day, only for days that have any.
    pub async fn daily_counts(&self, poll_id: i32) -> AppResult<Vec<(NaiveDate, u64)>> {
        let rows = Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .select_only()
            .column_as(Expr::cust(VOTE_DAY), "day")
            .column_as(vote::Column::Id.count(), "votes")
            .group_by(Expr::cust(VOTE_DAY))
            .order_by_asc(Expr::cust(VOTE_DAY))
            .into_model::<DailyCount>()
            .all(self.db)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(|r| (r.day, to_count(r.votes))).collect())
    }

    /// Ballot count per poll; polls without ballots are absent.
    pub async fn counts_by_poll(&self, poll_ids: &[i32]) -> AppResult<HashMap<i32, u64>> {
        if poll_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Vote::find()
            .filter(vote::Column::PollId.is_in(poll_ids.iter().copied()))
            .select_only()
            .column(vote::Column::PollId)
            .column_as(vote::Column::Id.count(), "votes")
            .group_by(vote::Column::PollId)
            .into_model::<PollVotes>()
            .all(self.db)
            .await
            .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|r| (r.poll_id, to_count(r.votes)))
            .collect())
    }

    /// Selection count per candidate; candidates nobody picked are absent.
    pub async fn counts_by_candidate(&self, candidate_ids: &[i32]) -> AppResult<VoteCounts> {
        if candidate_ids.is_empty() {
            return Ok(VoteCounts::new());
        }

        let rows = CandidateVote::find()
            .filter(candidate_vote::Column::CandidateId.is_in(candidate_ids.iter().copied()))
            .select_only()
            .column(candidate_vote::Column::CandidateId)
            .column_as(candidate_vote::Column::Id.count(), "votes")
            .group_by(candidate_vote::Column::CandidateId)
            .into_model::<CandidateVotes>()
            .all(self.db)
            .await
            .map_err(db_error)?;

        tracing::debug!(candidates = candidate_ids.len(), tallied = rows.len(), "Tallied selections");

        Ok(rows
            .into_iter()
            .map(|r| (r.candidate_id, to_count(r.votes)))
            .collect())
    }
}
