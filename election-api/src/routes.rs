use crate::extractors::AuthCaller;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use election_app::domain::{
    BallotPoll, Caller, DashboardStats, NewPoll, Poll, PollDetail, PollResult, PollStatistics,
    PollSummary, ResultStatistics,
};
use election_app::AppContext;
use election_errors::{AppError, AppResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/poll", get(list_polls).post(create_poll))
        .route("/poll/results", get(list_results))
        .route("/poll/adminDashboard", get(admin_dashboard))
        .route(
            "/poll/{id}",
            get(poll_detail).patch(update_poll).delete(delete_poll),
        )
        .route("/poll/{id}/statistics", get(poll_statistics))
        .route("/poll/{id}/vote", get(poll_for_voting))
        .route("/poll/{id}/result", get(poll_result))
        .route("/poll/{id}/result/statistics", get(result_statistics))
        .with_state(ctx)
}

async fn health() -> &'static str {
    "ok"
}

async fn list_polls(
    State(ctx): State<AppContext>,
    AuthCaller(caller): AuthCaller,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<PollSummary>>> {
    let polls = ctx
        .poll_queries
        .list_polls(&caller, params.search.as_deref())
        .await?;
    Ok(Json(polls))
}

async fn list_results(
    State(ctx): State<AppContext>,
    AuthCaller(caller): AuthCaller,
) -> AppResult<Json<Vec<PollSummary>>> {
    let polls = ctx.poll_queries.list_results(&caller, Utc::now()).await?;
    Ok(Json(polls))
}

async fn admin_dashboard(
    State(ctx): State<AppContext>,
    AuthCaller(caller): AuthCaller,
) -> AppResult<Json<DashboardStats>> {
    let stats = ctx.dashboard.stats(&caller, Utc::now()).await?;
    Ok(Json(stats))
}

async fn poll_detail(
    State(ctx): State<AppContext>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<i32>,
) -> AppResult<Json<PollDetail>> {
    let detail = ctx.poll_queries.get_poll_detail(&caller, id, Utc::now()).await?;
    Ok(Json(detail))
}

async fn poll_statistics(
    State(ctx): State<AppContext>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<i32>,
) -> AppResult<Json<PollStatistics>> {
    let stats = ctx
        .poll_queries
        .get_poll_statistics(&caller, id, Utc::now())
        .await?;
    Ok(Json(stats))
}

async fn poll_for_voting(
    State(ctx): State<AppContext>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<i32>,
) -> AppResult<Json<BallotPoll>> {
    let ballot = ctx.poll_queries.get_poll_for_voting(&caller, id).await?;
    Ok(Json(ballot))
}

async fn poll_result(
    State(ctx): State<AppContext>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<i32>,
) -> AppResult<Json<PollResult>> {
    let result = ctx.poll_queries.get_result(&caller, id, Utc::now()).await?;
    Ok(Json(result))
}

async fn result_statistics(
    State(ctx): State<AppContext>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<i32>,
) -> AppResult<Json<Option<ResultStatistics>>> {
    let stats = ctx
        .poll_queries
        .get_result_statistics(&caller, id, Utc::now())
        .await?;
    Ok(Json(stats))
}

async fn create_poll(
    State(ctx): State<AppContext>,
    AuthCaller(caller): AuthCaller,
    body: Result<Json<NewPoll>, JsonRejection>,
) -> AppResult<Json<Poll>> {
    let draft = read_draft(&caller, "create", body)?;
    let poll = ctx.manage_polls.create_poll(&caller, draft).await?;
    Ok(Json(poll))
}

async fn update_poll(
    State(ctx): State<AppContext>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<i32>,
    body: Result<Json<NewPoll>, JsonRejection>,
) -> AppResult<Json<Poll>> {
    let draft = read_draft(&caller, "update", body)?;
    let poll = ctx.manage_polls.update_poll(&caller, id, draft).await?;
    Ok(Json(poll))
}

async fn delete_poll(
    State(ctx): State<AppContext>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<i32>,
) -> AppResult<Json<Poll>> {
    let poll = ctx.manage_polls.delete_poll(&caller, id).await?;
    Ok(Json(poll))
}

/// Unreadable poll bodies are failed writes, reported after the admin check.
fn read_draft(
    caller: &Caller,
    action: &str,
    body: Result<Json<NewPoll>, JsonRejection>,
) -> AppResult<NewPoll> {
    caller.require_admin()?;
    body.map(|Json(draft)| draft)
        .map_err(|rejection| AppError::Gone(format!("failed to {action} poll: {rejection}")))
}
