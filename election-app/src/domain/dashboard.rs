use super::poll::{Poll, PollStatus, VoteType};
use super::roster::{Candidate, Party, Position, VoteCounts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MOST_VOTED_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePollInfo {
    pub id: i32,
    pub name: String,
    pub branch: String,
    pub end_date: DateTime<Utc>,
    pub vote_type: VoteType,
    pub votes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollComposition {
    pub name: String,
    pub positions: u64,
    pub parties: u64,
    pub candidates: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopCandidate {
    pub id: i32,
    pub name: String,
    pub position: String,
    pub party: Option<String>,
    #[serde(rename = "totalVotes")]
    pub total_votes: u64,
}

/// Branch-wide overview for administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub active_polls: u64,
    pub total_parties: u64,
    pub total_positions: u64,
    pub total_candidates: u64,
    pub active_polls_information: Vec<ActivePollInfo>,
    pub poll_stats_per_poll: Vec<PollComposition>,
    pub most_voted_candidates: Vec<TopCandidate>,
}

impl DashboardStats {
    pub fn assemble(
        polls: Vec<Poll>,
        parties: Vec<Party>,
        positions: Vec<Position>,
        candidates: Vec<Candidate>,
        poll_votes: &HashMap<i32, u64>,
        candidate_votes: &VoteCounts,
        now: DateTime<Utc>,
    ) -> Self {
        let mut polls = polls;
        polls.sort_by_key(|p| p.id);

        let mut parties_per_poll: HashMap<i32, u64> = HashMap::new();
        for party in &parties {
            *parties_per_poll.entry(party.poll_id).or_default() += 1;
        }

        let position_poll: HashMap<i32, i32> = positions.iter().map(|p| (p.id, p.poll_id)).collect();
        let mut positions_per_poll: HashMap<i32, u64> = HashMap::new();
        for position in &positions {
            *positions_per_poll.entry(position.poll_id).or_default() += 1;
        }

        let mut candidates_per_poll: HashMap<i32, u64> = HashMap::new();
        for candidate in &candidates {
            if let Some(poll_id) = position_poll.get(&candidate.position_id) {
                *candidates_per_poll.entry(*poll_id).or_default() += 1;
            }
        }

        let active_polls_information: Vec<ActivePollInfo> = polls
            .iter()
            .filter(|p| p.status_at(now) == PollStatus::Ongoing)
            .map(|p| ActivePollInfo {
                id: p.id,
                name: p.title.clone(),
                branch: p.branch.clone(),
                end_date: p.end_date,
                vote_type: p.vote_type,
                votes: poll_votes.get(&p.id).copied().unwrap_or(0),
            })
            .collect();

        let poll_stats_per_poll = polls
            .iter()
            .map(|p| PollComposition {
                name: p.title.clone(),
                positions: positions_per_poll.get(&p.id).copied().unwrap_or(0),
                parties: parties_per_poll.get(&p.id).copied().unwrap_or(0),
                candidates: candidates_per_poll.get(&p.id).copied().unwrap_or(0),
            })
            .collect();

        let party_names: HashMap<i32, &str> = parties.iter().map(|p| (p.id, p.name.as_str())).collect();
        let position_titles: HashMap<i32, &str> =
            positions.iter().map(|p| (p.id, p.position.as_str())).collect();

        let mut most_voted: Vec<TopCandidate> = candidates
            .iter()
            .filter_map(|c| {
                let total_votes = candidate_votes.get(&c.id).copied().unwrap_or(0);
                if total_votes == 0 {
                    return None;
                }
                Some(TopCandidate {
                    id: c.id,
                    name: c.name.clone(),
                    position: position_titles
                        .get(&c.position_id)
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                    party: c
                        .party_id
                        .and_then(|id| party_names.get(&id))
                        .map(|n| n.to_string()),
                    total_votes,
                })
            })
            .collect();
        most_voted.sort_by(|a, b| b.total_votes.cmp(&a.total_votes).then(a.id.cmp(&b.id)));
        most_voted.truncate(MOST_VOTED_LIMIT);

        Self {
            active_polls: active_polls_information.len() as u64,
            total_parties: parties.len() as u64,
            total_positions: positions.len() as u64,
            total_candidates: candidates.len() as u64,
            active_polls_information,
            poll_stats_per_poll,
            most_voted_candidates: most_voted,
        }
    }
}
