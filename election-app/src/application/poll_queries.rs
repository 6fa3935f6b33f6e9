use crate::domain::{
    BallotPoll, Caller, Poll, PollDetail, PollResult, PollStatistics, PollSummary,
    ResultStatistics,
};
use crate::infrastructure::db::{
    close_snapshot, read_snapshot, PollRepository, RosterRepository, VoteRepository,
};
use chrono::{DateTime, Utc};
use election_errors::{AppError, AppResult};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::sync::Arc;

/// Read side of the election: listings, live statistics and results.
///
/// Every call is scoped to the caller's branch and recomputed from the
/// stored rows inside one read-only snapshot, so the figures of a single
/// response always agree with each other.
pub struct PollQueries {
    db: Arc<DatabaseConnection>,
}

impl PollQueries {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list_polls(
        &self,
        caller: &Caller,
        search: Option<&str>,
    ) -> AppResult<Vec<PollSummary>> {
        let txn = read_snapshot(&self.db).await?;
        let polls = PollRepository::new(&txn)
            .list_in_branch(&caller.branch, search)
            .await?;
        let summaries = summarize(&txn, polls).await?;
        close_snapshot(txn).await?;
        Ok(summaries)
    }

    /// Polls whose voting window has closed.
    pub async fn list_results(
        &self,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<PollSummary>> {
        let txn = read_snapshot(&self.db).await?;
        let polls = PollRepository::new(&txn)
            .list_ended_in_branch(&caller.branch, now)
            .await?;
        let summaries = summarize(&txn, polls).await?;
        close_snapshot(txn).await?;
        Ok(summaries)
    }

    pub async fn get_poll_detail(
        &self,
        caller: &Caller,
        poll_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<PollDetail> {
        let txn = read_snapshot(&self.db).await?;
        let poll = scoped_poll(&txn, caller, poll_id).await?;
        let roster = RosterRepository::new(&txn);
        let votes = VoteRepository::new(&txn);

        let parties = roster.parties_for_polls(&[poll.id]).await?;
        let positions = roster.positions_for_polls(&[poll.id]).await?;
        let votes_cast = votes.count_for_poll(poll.id).await?;
        let has_voted = votes.has_voted(caller.user_id, poll.id).await?;
        close_snapshot(txn).await?;

        let days_remaining = poll.days_remaining(now);
        Ok(PollDetail::assemble(
            poll,
            parties,
            positions,
            votes_cast,
            has_voted,
            days_remaining,
        ))
    }

    pub async fn get_poll_statistics(
        &self,
        caller: &Caller,
        poll_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<PollStatistics> {
        let txn = read_snapshot(&self.db).await?;
        let poll = scoped_poll(&txn, caller, poll_id).await?;
        let votes = VoteRepository::new(&txn);

        let total_votes = votes.count_for_poll(poll.id).await?;
        let participating_parties = RosterRepository::new(&txn).count_parties(poll.id).await?;
        let daily_counts = votes.daily_counts(poll.id).await?;
        close_snapshot(txn).await?;

        tracing::debug!(poll_id = poll.id, total_votes, "Computed poll statistics");

        Ok(PollStatistics::assemble(
            poll,
            total_votes,
            participating_parties,
            &daily_counts,
            now,
        ))
    }

    /// The ballot for a voter who has not voted yet.
    pub async fn get_poll_for_voting(&self, caller: &Caller, poll_id: i32) -> AppResult<BallotPoll> {
        let txn = read_snapshot(&self.db).await?;
        let poll = scoped_poll(&txn, caller, poll_id).await?;

        if VoteRepository::new(&txn).has_voted(caller.user_id, poll.id).await? {
            tracing::warn!(poll_id = poll.id, user_id = %caller.user_id, "Ballot requested twice");
            return Err(AppError::Forbidden("You have already voted".to_string()));
        }

        let roster = RosterRepository::new(&txn);
        let positions = roster.positions_for_polls(&[poll.id]).await?;
        let position_ids: Vec<i32> = positions.iter().map(|p| p.id).collect();
        let candidates = roster.candidates_for_positions(&position_ids).await?;
        close_snapshot(txn).await?;

        Ok(BallotPoll::assemble(poll, positions, candidates))
    }

    /// Winners per position. Only available once the poll has ended.
    pub async fn get_result(
        &self,
        caller: &Caller,
        poll_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<PollResult> {
        let txn = read_snapshot(&self.db).await?;
        let poll = scoped_poll(&txn, caller, poll_id).await?;

        if poll.end_date > now {
            return Err(AppError::Forbidden("Poll has not ended".to_string()));
        }

        let roster = RosterRepository::new(&txn);
        let votes = VoteRepository::new(&txn);
        let parties = roster.parties_for_polls(&[poll.id]).await?;
        let positions = roster.positions_for_polls(&[poll.id]).await?;
        let position_ids: Vec<i32> = positions.iter().map(|p| p.id).collect();
        let candidates = roster.candidates_for_positions(&position_ids).await?;
        let candidate_ids: Vec<i32> = candidates.iter().map(|c| c.id).collect();
        let counts = votes.counts_by_candidate(&candidate_ids).await?;
        let total_votes = votes.count_for_poll(poll.id).await?;
        let has_voted = votes.has_voted(caller.user_id, poll.id).await?;
        close_snapshot(txn).await?;

        Ok(PollResult::assemble(
            poll,
            parties,
            positions,
            candidates,
            &counts,
            total_votes,
            has_voted,
        ))
    }

    /// Per-candidate tallies; `None` until the end date has passed or when
    /// the poll is not visible to the caller.
    pub async fn get_result_statistics(
        &self,
        caller: &Caller,
        poll_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ResultStatistics>> {
        let txn = read_snapshot(&self.db).await?;
        let poll = PollRepository::new(&txn)
            .find_in_branch(&caller.branch, poll_id)
            .await?
            .filter(|poll| poll.has_ended(now));
        let Some(poll) = poll else {
            close_snapshot(txn).await?;
            return Ok(None);
        };

        let roster = RosterRepository::new(&txn);
        let positions = roster.positions_for_polls(&[poll.id]).await?;
        let position_ids: Vec<i32> = positions.iter().map(|p| p.id).collect();
        let candidates = roster.candidates_for_positions(&position_ids).await?;
        let candidate_ids: Vec<i32> = candidates.iter().map(|c| c.id).collect();
        let counts = VoteRepository::new(&txn)
            .counts_by_candidate(&candidate_ids)
            .await?;
        close_snapshot(txn).await?;

        Ok(Some(ResultStatistics::assemble(positions, candidates, &counts)))
    }
}

async fn scoped_poll<C: ConnectionTrait>(db: &C, caller: &Caller, poll_id: i32) -> AppResult<Poll> {
    PollRepository::new(db)
        .find_in_branch(&caller.branch, poll_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))
}

async fn summarize<C: ConnectionTrait>(db: &C, polls: Vec<Poll>) -> AppResult<Vec<PollSummary>> {
    let poll_ids: Vec<i32> = polls.iter().map(|p| p.id).collect();
    let parties = RosterRepository::new(db).parties_for_polls(&poll_ids).await?;
    Ok(PollSummary::from_polls(polls, parties))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::entities::{candidate, party, poll, position};
    use chrono::{Duration, TimeZone};
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    fn caller() -> Caller {
        Caller::voter(Uuid::new_v4(), "B")
    }

    fn poll_model(id: i32, start: DateTime<Utc>, end: DateTime<Utc>) -> poll::Model {
        poll::Model {
            id,
            title: format!("Poll {id}"),
            description: String::new(),
            branch: "B".to_string(),
            start_date: start,
            end_date: end,
            vote_type: "single".to_string(),
            created_at: None,
        }
    }

    fn ended_poll(id: i32) -> poll::Model {
        poll_model(id, now() - Duration::days(5), now() - Duration::days(1))
    }

    fn party_model(id: i32, poll_id: i32, name: &str) -> party::Model {
        party::Model {
            id,
            poll_id,
            name: name.to_string(),
            description: None,
            banner: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn position_model(id: i32, poll_id: i32, title: &str) -> position::Model {
        position::Model {
            id,
            poll_id,
            position: title.to_string(),
            description: None,
            created_at: None,
        }
    }

    fn candidate_model(id: i32, position_id: i32, party_id: Option<i32>) -> candidate::Model {
        candidate::Model {
            id,
            position_id,
            party_id,
            name: format!("Candidate {id}"),
            photo: None,
            description: None,
            created_at: None,
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
        btreemap! { "num_items" => Value::BigInt(Some(n)) }
    }

    #[tokio::test]
    async fn test_list_polls_attaches_party_names() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[ended_poll(1), ended_poll(2)]])
            .append_query_results([[party_model(1, 1, "Red"), party_model(2, 1, "Blue")]])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let polls = queries.list_polls(&caller(), None).await.unwrap();

        assert_eq!(polls.len(), 2);
        assert_eq!(polls[0].parties, vec!["Red", "Blue"]);
        assert!(polls[1].parties.is_empty());
    }

    #[tokio::test]
    async fn test_list_results_without_polls_skips_party_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<poll::Model>::new()])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let results = queries.list_results(&caller(), now()).await.unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_poll_detail_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<poll::Model>::new()])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let result = queries.get_poll_detail(&caller(), 99, now()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_poll_detail() {
        let open = poll_model(1, now() - Duration::days(1), now() + Duration::days(3));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[open]])
            .append_query_results([[party_model(1, 1, "Red")]])
            .append_query_results([[position_model(1, 1, "President")]])
            .append_query_results([[count_row(4)], [count_row(1)]])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let detail = queries.get_poll_detail(&caller(), 1, now()).await.unwrap();

        assert_eq!(detail.votes_cast, 4);
        assert!(detail.has_voted);
        assert_eq!(detail.days_remaining, 3);
        assert_eq!(detail.parties[0].name, "Red");
        assert_eq!(detail.positions[0].position, "President");
    }

    #[tokio::test]
    async fn test_poll_statistics_series() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[poll_model(1, start, end)]])
            .append_query_results([[count_row(3)], [count_row(0)]])
            .append_query_results([[
                btreemap! {
                    "day" => Value::from(start.date_naive()),
                    "votes" => Value::BigInt(Some(2)),
                },
                btreemap! {
                    "day" => Value::from(end.date_naive()),
                    "votes" => Value::BigInt(Some(1)),
                },
            ]])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let stats = queries.get_poll_statistics(&caller(), 1, now()).await.unwrap();

        assert_eq!(stats.total_votes, 3);
        assert_eq!(stats.participating_parties, 0);
        let series: Vec<(&str, u64)> = stats
            .votes_stats
            .iter()
            .map(|d| (d.vote_date.as_str(), d.votes_per_day))
            .collect();
        assert_eq!(series, vec![("01-01", 2), ("01-02", 0), ("01-03", 1)]);
        let series_total: u64 = stats.votes_stats.iter().map(|d| d.votes_per_day).sum();
        assert_eq!(series_total, stats.total_votes);
    }

    #[tokio::test]
    async fn test_statistics_reads_share_one_snapshot() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll_model(1, start, end)]])
                .append_query_results([[count_row(0)], [count_row(0)]])
                .append_query_results([Vec::<std::collections::BTreeMap<&str, Value>>::new()])
                .into_connection(),
        );

        let queries = PollQueries::new(Arc::clone(&db));
        queries.get_poll_statistics(&caller(), 1, now()).await.unwrap();
        drop(queries);

        let db = Arc::try_unwrap(db).ok().expect("connection still shared");
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql: Vec<&str> = log[0].statements().iter().map(|s| s.sql.as_str()).collect();
        assert_eq!(sql.len(), 6);
        assert_eq!(sql.first(), Some(&"BEGIN"));
        assert_eq!(sql.last(), Some(&"COMMIT"));
    }

    #[tokio::test]
    async fn test_voting_twice_is_forbidden() {
        let open = poll_model(1, now() - Duration::days(1), now() + Duration::days(1));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[open]])
            .append_query_results([[count_row(1)]])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let result = queries.get_poll_for_voting(&caller(), 1).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_voting_on_other_branch_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<poll::Model>::new()])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let result = queries.get_poll_for_voting(&caller(), 1).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_ballot_lists_candidates_per_position() {
        let open = poll_model(1, now() - Duration::days(1), now() + Duration::days(1));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[open]])
            .append_query_results([[count_row(0)]])
            .append_query_results([[
                position_model(1, 1, "President"),
                position_model(2, 1, "Auditor"),
            ]])
            .append_query_results([[
                candidate_model(3, 1, Some(1)),
                candidate_model(4, 1, Some(2)),
            ]])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let ballot = queries.get_poll_for_voting(&caller(), 1).await.unwrap();

        assert_eq!(ballot.positions.len(), 2);
        assert_eq!(ballot.positions[0].candidates.len(), 2);
        assert!(ballot.positions[1].candidates.is_empty());
    }

    #[tokio::test]
    async fn test_result_before_close_is_forbidden() {
        let open = poll_model(1, now() - Duration::days(1), now() + Duration::hours(1));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[open]])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let result = queries.get_result(&caller(), 1, now()).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_result_missing_poll_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<poll::Model>::new()])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let result = queries.get_result(&caller(), 1, now()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_result_returns_tied_winners() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[ended_poll(1)]])
            .append_query_results([[party_model(1, 1, "Red")]])
            .append_query_results([[position_model(1, 1, "President")]])
            .append_query_results([[
                candidate_model(1, 1, Some(1)),
                candidate_model(2, 1, None),
                candidate_model(3, 1, None),
            ]])
            .append_query_results([[
                btreemap! { "candidate_id" => Value::Int(Some(1)), "votes" => Value::BigInt(Some(5)) },
                btreemap! { "candidate_id" => Value::Int(Some(2)), "votes" => Value::BigInt(Some(5)) },
                btreemap! { "candidate_id" => Value::Int(Some(3)), "votes" => Value::BigInt(Some(2)) },
            ]])
            .append_query_results([[count_row(12)], [count_row(0)]])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let result = queries.get_result(&caller(), 1, now()).await.unwrap();

        assert_eq!(result.total_votes, 12);
        assert!(!result.has_voted);
        let winners: Vec<i32> = result.position_winners[0]
            .winners
            .iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(winners, vec![1, 2]);
        assert_eq!(result.position_winners[0].winners[0].party.as_deref(), Some("Red"));
    }

    #[tokio::test]
    async fn test_result_statistics_hidden_while_open() {
        let open = poll_model(1, now() - Duration::days(1), now() + Duration::days(1));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[open]])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let stats = queries.get_result_statistics(&caller(), 1, now()).await.unwrap();

        assert!(stats.is_none());
    }

    #[tokio::test]
    async fn test_result_statistics_hidden_at_end_instant() {
        let closing = poll_model(1, now() - Duration::days(1), now());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[closing]])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let stats = queries.get_result_statistics(&caller(), 1, now()).await.unwrap();

        assert!(stats.is_none());
    }

    #[tokio::test]
    async fn test_result_statistics_after_close() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[ended_poll(1)]])
            .append_query_results([[position_model(1, 1, "President")]])
            .append_query_results([[candidate_model(1, 1, Some(2)), candidate_model(2, 1, Some(1))]])
            .append_query_results([[
                btreemap! { "candidate_id" => Value::Int(Some(1)), "votes" => Value::BigInt(Some(7)) },
            ]])
            .into_connection();

        let queries = PollQueries::new(Arc::new(db));
        let stats = queries
            .get_result_statistics(&caller(), 1, now())
            .await
            .unwrap()
            .unwrap();

        let tallies: Vec<(i32, u64)> = stats.positions[0]
            .candidates
            .iter()
            .map(|c| (c.id, c.votes))
            .collect();
        assert_eq!(tallies, vec![(2, 0), (1, 7)]);
    }
}
