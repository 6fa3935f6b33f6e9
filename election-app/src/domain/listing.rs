use super::poll::Poll;
use super::roster::{Party, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A poll as shown in listings, with the names of its parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSummary {
    #[serde(flatten)]
    pub poll: Poll,
    pub parties: Vec<String>,
}

impl PollSummary {
    /// Pairs every poll with its party names. Polls keep their order; party
    /// names follow party id.
    pub fn from_polls(polls: Vec<Poll>, parties: Vec<Party>) -> Vec<Self> {
        let mut parties = parties;
        parties.sort_by_key(|p| p.id);

        let mut names: HashMap<i32, Vec<String>> = HashMap::new();
        for party in parties {
            names.entry(party.poll_id).or_default().push(party.name);
        }

        polls
            .into_iter()
            .map(|poll| {
                let parties = names.remove(&poll.id).unwrap_or_default();
                PollSummary { poll, parties }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyInfo {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub banner: Option<String>,
}

impl From<Party> for PartyInfo {
    fn from(party: Party) -> Self {
        Self {
            id: party.id,
            name: party.name,
            description: party.description,
            banner: party.banner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub id: i32,
    pub position: String,
    pub description: Option<String>,
}

impl From<Position> for PositionInfo {
    fn from(position: Position) -> Self {
        Self {
            id: position.id,
            position: position.position,
            description: position.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDetail {
    #[serde(flatten)]
    pub poll: Poll,
    pub parties: Vec<PartyInfo>,
    pub positions: Vec<PositionInfo>,
    #[serde(rename = "votesCast")]
    pub votes_cast: u64,
    #[serde(rename = "hasVoted")]
    pub has_voted: bool,
    #[serde(rename = "daysRemaining")]
    pub days_remaining: i64,
}

impl PollDetail {
    pub fn assemble(
        poll: Poll,
        parties: Vec<Party>,
        positions: Vec<Position>,
        votes_cast: u64,
        has_voted: bool,
        days_remaining: i64,
    ) -> Self {
        let mut parties: Vec<PartyInfo> = parties.into_iter().map(PartyInfo::from).collect();
        parties.sort_by_key(|p| p.id);
        parties.dedup_by_key(|p| p.id);

        let mut positions: Vec<PositionInfo> =
            positions.into_iter().map(PositionInfo::from).collect();
        positions.sort_by_key(|p| p.id);
        positions.dedup_by_key(|p| p.id);

        Self {
            poll,
            parties,
            positions,
            votes_cast,
            has_voted,
            days_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VoteType;
    use chrono::{TimeZone, Utc};

    fn poll(id: i32) -> Poll {
        Poll {
            id,
            title: format!("Poll {id}"),
            description: String::new(),
            branch: "north".to_string(),
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            vote_type: VoteType::Single,
            created_at: None,
        }
    }

    fn party(id: i32, poll_id: i32, name: &str) -> Party {
        Party {
            id,
            poll_id,
            name: name.to_string(),
            description: None,
            banner: None,
        }
    }

    #[test]
    fn test_summaries_without_parties_get_empty_list() {
        let summaries = PollSummary::from_polls(
            vec![poll(1), poll(2)],
            vec![party(7, 1, "Blue"), party(3, 1, "Red")],
        );

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].parties, vec!["Red", "Blue"]);
        assert!(summaries[1].parties.is_empty());
    }

    #[test]
    fn test_detail_deduplicates() {
        let detail = PollDetail::assemble(
            poll(1),
            vec![party(2, 1, "Blue"), party(1, 1, "Red"), party(2, 1, "Blue")],
            vec![],
            4,
            true,
            2,
        );

        let ids: Vec<i32> = detail.parties.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(detail.positions.is_empty());
    }

    #[test]
    fn test_detail_serializes_camel_case_counters() {
        let detail = PollDetail::assemble(poll(1), vec![], vec![], 3, false, -1);
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["votesCast"], 3);
        assert_eq!(json["hasVoted"], false);
        assert_eq!(json["daysRemaining"], -1);
        assert_eq!(json["title"], "Poll 1");
        assert_eq!(json["vote_type"], "single");
    }
}
