use election_errors::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Voter,
    Admin,
}

impl Role {
    /// Anything other than `admin` is treated as a regular voter.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Voter
        }
    }
}

/// Identity of the requester as established by the authentication layer.
///
/// Every read and write is scoped to `branch`; it is never taken from the
/// request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Uuid,
    pub branch: String,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: Uuid, branch: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            branch: branch.into(),
            role,
        }
    }

    pub fn voter(user_id: Uuid, branch: impl Into<String>) -> Self {
        Self::new(user_id, branch, Role::Voter)
    }

    pub fn admin(user_id: Uuid, branch: impl Into<String>) -> Self {
        Self::new(user_id, branch, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }
}
