mod ballot;
mod caller;
mod dashboard;
mod listing;
mod poll;
mod result;
mod roster;
mod statistics;

pub use ballot::{BallotCandidate, BallotPoll, BallotPosition};
pub use caller::{Caller, Role};
pub use dashboard::{ActivePollInfo, DashboardStats, PollComposition, TopCandidate, MOST_VOTED_LIMIT};
pub use listing::{PartyInfo, PollDetail, PollSummary, PositionInfo};
pub use poll::{NewPoll, Poll, PollStatus, VoteType, MAX_TITLE_LEN};
pub use result::{
    top_ranked, CandidateTally, PollResult, PositionTally, PositionWinners, ResultStatistics,
    Winner,
};
pub use roster::{candidates_by_position, Candidate, Party, Position, VoteCounts};
pub use statistics::{daily_vote_series, DailyVotes, PollStatistics};
