pub mod candidate;
pub mod candidate_vote;
pub mod party;
pub mod poll;
pub mod position;
pub mod vote;

pub use candidate::Entity as Candidate;
pub use candidate_vote::Entity as CandidateVote;
pub use party::Entity as Party;
pub use poll::Entity as Poll;
pub use position::Entity as Position;
pub use vote::Entity as Vote;
