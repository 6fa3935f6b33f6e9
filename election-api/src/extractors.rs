//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use election_app::domain::{Caller, Role};
use election_errors::AppError;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const BRANCH_HEADER: &str = "x-user-branch";
pub const ROLE_HEADER: &str = "x-user-role";

/// Caller identity forwarded by the authentication proxy in front of the API.
#[derive(Debug, Clone)]
pub struct AuthCaller(pub Caller);

impl<S> FromRequestParts<S> for AuthCaller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| AppError::Unauthorized("missing or invalid user id".to_string()))?;

        let branch = header(parts, BRANCH_HEADER)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing branch".to_string()))?;

        // A missing role header means a regular voter.
        let role = header(parts, ROLE_HEADER).map(Role::parse).unwrap_or(Role::Voter);

        Ok(Self(Caller::new(user_id, branch.trim(), role)))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}
