use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// CandidateVote rows per candidate id.
pub type VoteCounts = HashMap<i32, u64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: i32,
    pub poll_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub banner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: i32,
    pub poll_id: i32,
    pub position: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i32,
    pub position_id: i32,
    pub party_id: Option<i32>,
    pub name: String,
    pub photo: Option<String>,
    pub description: Option<String>,
}

impl Candidate {
    /// Party id ascending, unaffiliated candidates last, then candidate id.
    pub fn party_order_key(&self) -> (bool, i32, i32) {
        (self.party_id.is_none(), self.party_id.unwrap_or_default(), self.id)
    }
}

/// Groups candidates under their position, each group in party order so that
/// running mates sit next to each other.
pub fn candidates_by_position(candidates: Vec<Candidate>) -> HashMap<i32, Vec<Candidate>> {
    let mut grouped: HashMap<i32, Vec<Candidate>> = HashMap::new();
    for candidate in candidates {
        grouped.entry(candidate.position_id).or_default().push(candidate);
    }
    for group in grouped.values_mut() {
        group.sort_by_key(Candidate::party_order_key);
    }
    grouped
}
