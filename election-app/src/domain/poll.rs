use chrono::{DateTime, Utc};
use election_errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    /// One candidate per position.
    Single,
    /// Several candidates per position.
    Multiple,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Single => "single",
            VoteType::Multiple => "multiple",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(VoteType::Single),
            "multiple" => Ok(VoteType::Multiple),
            other => Err(AppError::InvalidInput(format!("unknown vote type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl PollStatus {
    /// Both window bounds count as `Ongoing`.
    pub fn at(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if now < start {
            PollStatus::Upcoming
        } else if now <= end {
            PollStatus::Ongoing
        } else {
            PollStatus::Completed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub branch: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub vote_type: VoteType,
    pub created_at: Option<DateTime<Utc>>,
}

impl Poll {
    pub fn status_at(&self, now: DateTime<Utc>) -> PollStatus {
        PollStatus::at(now, self.start_date, self.end_date)
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_date < now
    }

    /// Calendar days (UTC) until the end date; negative once it has passed.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.end_date.date_naive() - now.date_naive()).num_days()
    }
}

/// Poll fields supplied by an administrator when creating or updating a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPoll {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub vote_type: VoteType,
}

/// Width of the `poll.title` column.
pub const MAX_TITLE_LEN: usize = 255;

impl NewPoll {
    pub fn validate(&self) -> Result<(), AppError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput("title is required".to_string()));
        }

        if title.chars().count() > MAX_TITLE_LEN {
            return Err(AppError::InvalidInput(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }

        if self.end_date <= self.start_date {
            return Err(AppError::InvalidInput(
                "end_date must be after start_date".to_string(),
            ));
        }

        Ok(())
    }
}
