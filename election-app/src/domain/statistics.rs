use super::poll::{Poll, PollStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVotes {
    /// `MM-DD`
    pub vote_date: String,
    pub votes_per_day: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollStatistics {
    pub id: i32,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_votes: u64,
    pub participating_parties: u64,
    pub status: PollStatus,
    pub votes_stats: Vec<DailyVotes>,
}

impl PollStatistics {
    pub fn assemble(
        poll: Poll,
        total_votes: u64,
        participating_parties: u64,
        daily_counts: &[(NaiveDate, u64)],
        now: DateTime<Utc>,
    ) -> Self {
        let status = poll.status_at(now);
        let votes_stats =
            daily_vote_series(poll.start_date.date_naive(), poll.end_date.date_naive(), daily_counts);

        Self {
            id: poll.id,
            title: poll.title,
            start_date: poll.start_date,
            end_date: poll.end_date,
            total_votes,
            participating_parties,
            status,
            votes_stats,
        }
    }
}

/// Votes per calendar day (UTC) for every day in `start..=end`, including
/// days nobody voted. `daily_counts` holds the days that had ballots; days
/// outside the range are ignored.
pub fn daily_vote_series(
    start: NaiveDate,
    end: NaiveDate,
    daily_counts: &[(NaiveDate, u64)],
) -> Vec<DailyVotes> {
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for day in start.iter_days().take_while(|day| *day <= end) {
        per_day.insert(day, 0);
    }

    for (day, votes) in daily_counts {
        if let Some(count) = per_day.get_mut(day) {
            *count += votes;
        }
    }

    per_day
        .into_iter()
        .map(|(day, votes_per_day)| DailyVotes {
            vote_date: day.format("%m-%d").to_string(),
            votes_per_day,
        })
        .collect()
}
