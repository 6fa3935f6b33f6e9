use super::db_error;
use super::entities::{poll, Poll};
use crate::domain::{self, NewPoll};
use chrono::{DateTime, Utc};
use election_errors::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};

pub struct PollRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> PollRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_in_branch(&self, branch: &str, id: i32) -> AppResult<Option<domain::Poll>> {
        self.find_model(branch, id)
            .await?
            .map(domain::Poll::try_from)
            .transpose()
    }

    /// Polls of a branch ordered by id. `search` matches the title,
    /// case-insensitively; a blank term means no filter.
    pub async fn list_in_branch(
        &self,
        branch: &str,
        search: Option<&str>,
    ) -> AppResult<Vec<domain::Poll>> {
        let mut query = Poll::find().filter(poll::Column::Branch.eq(branch));

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((Poll, poll::Column::Title))))
                    .like(title_pattern(term)),
            );
        }

        let models = query
            .order_by_asc(poll::Column::Id)
            .all(self.db)
            .await
            .map_err(db_error)?;

        into_polls(models)
    }

    pub async fn list_ended_in_branch(
        &self,
        branch: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<domain::Poll>> {
        let models = Poll::find()
            .filter(poll::Column::Branch.eq(branch))
            .filter(poll::Column::EndDate.lt(now))
            .order_by_asc(poll::Column::Id)
            .all(self.db)
            .await
            .map_err(db_error)?;

        into_polls(models)
    }

    pub async fn create(&self, branch: &str, draft: &NewPoll) -> AppResult<domain::Poll> {
        let active = poll::ActiveModel {
            title: Set(draft.title.trim().to_string()),
            description: Set(draft.description.clone()),
            branch: Set(branch.to_string()),
            start_date: Set(draft.start_date),
            end_date: Set(draft.end_date),
            vote_type: Set(draft.vote_type.as_str().to_string()),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        };

        match active.insert(self.db).await {
            Ok(model) => model.try_into(),
            Err(e) => Err(rejected_write("create", e)),
        }
    }

    pub async fn update(&self, branch: &str, id: i32, draft: &NewPoll) -> AppResult<domain::Poll> {
        let Some(existing) = self.find_model(branch, id).await? else {
            return Err(AppError::Gone("failed to update poll".to_string()));
        };

        let mut active: poll::ActiveModel = existing.into();
        active.title = Set(draft.title.trim().to_string());
        active.description = Set(draft.description.clone());
        active.start_date = Set(draft.start_date);
        active.end_date = Set(draft.end_date);
        active.vote_type = Set(draft.vote_type.as_str().to_string());

        match active.update(self.db).await {
            Ok(model) => model.try_into(),
            Err(e) => Err(rejected_write("update", e)),
        }
    }

    /// Hard delete; positions, parties and ballots go with it through the
    /// foreign keys. Returns the removed row.
    pub async fn delete(&self, branch: &str, id: i32) -> AppResult<domain::Poll> {
        let Some(existing) = self.find_model(branch, id).await? else {
            return Err(AppError::Gone("failed to delete poll".to_string()));
        };

        let res = Poll::delete_by_id(existing.id)
            .exec(self.db)
            .await
            .map_err(db_error)?;

        if res.rows_affected == 0 {
            return Err(AppError::Gone("failed to delete poll".to_string()));
        }

        existing.try_into()
    }

    async fn find_model(&self, branch: &str, id: i32) -> AppResult<Option<poll::Model>> {
        Poll::find()
            .filter(poll::Column::Id.eq(id))
            .filter(poll::Column::Branch.eq(branch))
            .one(self.db)
            .await
            .map_err(db_error)
    }
}

/// A write the store turned down (no row back, or a constraint violation)
/// is `Gone`; anything else is a storage fault.
fn rejected_write(action: &str, err: DbErr) -> AppError {
    if matches!(
        err,
        DbErr::RecordNotInserted | DbErr::RecordNotUpdated | DbErr::RecordNotFound(_)
    ) {
        return AppError::Gone(format!("failed to {action} poll"));
    }
    match err.sql_err() {
        Some(violation) => AppError::Gone(format!("failed to {action} poll: {violation}")),
        None => db_error(err),
    }
}

fn into_polls(models: Vec<poll::Model>) -> AppResult<Vec<domain::Poll>> {
    models.into_iter().map(domain::Poll::try_from).collect()
}

/// LIKE pattern for a lowercase substring match with wildcards escaped.
fn title_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
