use crate::domain::{Caller, NewPoll, Poll};
use crate::infrastructure::db::{db_error, PollRepository};
use election_errors::{AppError, AppResult};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::Arc;

/// Administrative writes on polls. Every operation is limited to the
/// administrator's own branch.
pub struct ManagePolls {
    db: Arc<DatabaseConnection>,
}

impl ManagePolls {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create_poll(&self, caller: &Caller, draft: NewPoll) -> AppResult<Poll> {
        caller.require_admin()?;
        draft.validate().map_err(|e| rejected("create", e))?;

        let poll = PollRepository::new(self.db.as_ref())
            .create(&caller.branch, &draft)
            .await?;
        tracing::info!(poll_id = poll.id, branch = %poll.branch, "Poll created");
        Ok(poll)
    }

    pub async fn update_poll(&self, caller: &Caller, poll_id: i32, draft: NewPoll) -> AppResult<Poll> {
        caller.require_admin()?;
        draft.validate().map_err(|e| rejected("update", e))?;

        let txn = self.db.begin().await.map_err(db_error)?;
        let poll = PollRepository::new(&txn)
            .update(&caller.branch, poll_id, &draft)
            .await?;
        txn.commit().await.map_err(db_error)?;

        tracing::info!(poll_id = poll.id, branch = %poll.branch, "Poll updated");
        Ok(poll)
    }

    pub async fn delete_poll(&self, caller: &Caller, poll_id: i32) -> AppResult<Poll> {
        caller.require_admin()?;

        let txn = self.db.begin().await.map_err(db_error)?;
        let poll = PollRepository::new(&txn).delete(&caller.branch, poll_id).await?;
        txn.commit().await.map_err(db_error)?;

        tracing::info!(poll_id = poll.id, branch = %poll.branch, "Poll deleted");
        Ok(poll)
    }
}

fn rejected(action: &str, err: AppError) -> AppError {
    match err {
        AppError::InvalidInput(reason) => AppError::Gone(format!("failed to {action} poll: {reason}")),
        other => other,
    }
}
