use super::poll::Poll;
use super::roster::{candidates_by_position, Candidate, Position};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotCandidate {
    pub id: i32,
    pub photo: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub party_id: Option<i32>,
}

impl From<Candidate> for BallotCandidate {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            photo: candidate.photo,
            name: candidate.name,
            description: candidate.description,
            party_id: candidate.party_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotPosition {
    pub id: i32,
    pub position: String,
    pub description: Option<String>,
    pub candidates: Vec<BallotCandidate>,
}

/// What a voter sees when filling in a ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotPoll {
    #[serde(flatten)]
    pub poll: Poll,
    pub positions: Vec<BallotPosition>,
}

impl BallotPoll {
    pub fn assemble(poll: Poll, positions: Vec<Position>, candidates: Vec<Candidate>) -> Self {
        let mut grouped = candidates_by_position(candidates);

        let mut positions = positions;
        positions.sort_by_key(|p| p.id);

        let positions = positions
            .into_iter()
            .map(|position| {
                let candidates = grouped
                    .remove(&position.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(BallotCandidate::from)
                    .collect();

                BallotPosition {
                    id: position.id,
                    position: position.position,
                    description: position.description,
                    candidates,
                }
            })
            .collect();

        Self { poll, positions }
    }
}
