use super::poll::Poll;
use super::roster::{candidates_by_position, Candidate, Party, Position, VoteCounts};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub id: i32,
    pub name: String,
    pub photo: Option<String>,
    pub description: Option<String>,
    pub party_id: Option<i32>,
    pub party: Option<String>,
    pub votes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionWinners {
    pub position_id: i32,
    pub position: String,
    pub winners: Vec<Winner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResult {
    #[serde(flatten)]
    pub poll: Poll,
    pub parties: Vec<String>,
    #[serde(rename = "totalVotes")]
    pub total_votes: u64,
    #[serde(rename = "hasVoted")]
    pub has_voted: bool,
    pub position_winners: Vec<PositionWinners>,
}

impl PollResult {
    pub fn assemble(
        poll: Poll,
        parties: Vec<Party>,
        positions: Vec<Position>,
        candidates: Vec<Candidate>,
        counts: &VoteCounts,
        total_votes: u64,
        has_voted: bool,
    ) -> Self {
        let party_names: HashMap<i32, String> =
            parties.iter().map(|p| (p.id, p.name.clone())).collect();

        let mut names: Vec<String> = parties.into_iter().map(|p| p.name).collect();
        names.sort();
        names.dedup();

        let mut grouped = candidates_by_position(candidates);
        let mut positions = positions;
        positions.sort_by_key(|p| p.id);

        let position_winners = positions
            .into_iter()
            .map(|position| {
                let entries: Vec<Winner> = grouped
                    .remove(&position.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| Winner {
                        votes: counts.get(&c.id).copied().unwrap_or(0),
                        party: c.party_id.and_then(|id| party_names.get(&id).cloned()),
                        id: c.id,
                        name: c.name,
                        photo: c.photo,
                        description: c.description,
                        party_id: c.party_id,
                    })
                    .collect();

                PositionWinners {
                    position_id: position.id,
                    position: position.position,
                    winners: top_ranked(entries, |w| w.votes),
                }
            })
            .collect();

        Self {
            poll,
            parties: names,
            total_votes,
            has_voted,
            position_winners,
        }
    }
}

/// Every entry sharing the highest non-zero count. A tie yields several
/// winners; nobody wins without a vote.
pub fn top_ranked<T>(entries: Vec<T>, votes: impl Fn(&T) -> u64) -> Vec<T> {
    let best = entries.iter().map(&votes).max().unwrap_or(0);
    if best == 0 {
        return Vec::new();
    }
    entries.into_iter().filter(|e| votes(e) == best).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTally {
    pub id: i32,
    pub name: String,
    pub party_id: Option<i32>,
    pub votes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTally {
    pub id: i32,
    pub position: String,
    pub candidates: Vec<CandidateTally>,
}

/// Full per-candidate breakdown of a finished poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultStatistics {
    pub positions: Vec<PositionTally>,
}

impl ResultStatistics {
    pub fn assemble(positions: Vec<Position>, candidates: Vec<Candidate>, counts: &VoteCounts) -> Self {
        let mut grouped = candidates_by_position(candidates);
        let mut positions = positions;
        positions.sort_by_key(|p| p.id);

        let positions = positions
            .into_iter()
            .map(|position| PositionTally {
                candidates: grouped
                    .remove(&position.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| CandidateTally {
                        votes: counts.get(&c.id).copied().unwrap_or(0),
                        id: c.id,
                        name: c.name,
                        party_id: c.party_id,
                    })
                    .collect(),
                id: position.id,
                position: position.position,
            })
            .collect();

        Self { positions }
    }
}
