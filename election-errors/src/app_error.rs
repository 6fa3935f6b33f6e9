use serde::{Deserialize, Serialize};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    /// A write touched no row: the target is gone or the store rejected it.
    #[error("{0}")]
    Gone(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn user_message(&self) -> &str {
        match self {
            Self::NotFound(_) => "The requested poll could not be found.",
            Self::Forbidden(_) => "You are not allowed to do that right now.",
            Self::Gone(_) => "The change could not be applied. Try again.",
            Self::Unauthorized(_) => "Sign in to continue.",
            Self::InvalidInput(_) => "The request was not valid.",
            Self::Database(_) | Self::Internal(_) => "Something went wrong on the server. Try again later.",
        }
    }

    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

#[cfg(feature = "http")]
mod http_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        message: String,
    }

    impl AppError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                AppError::Gone(_) => StatusCode::GONE,
                AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            // Server-side details are not echoed to clients.
            let message = if self.is_client_error() {
                self.to_string()
            } else {
                self.user_message().to_string()
            };
            (status, Json(ErrorResponse { message })).into_response()
        }
    }
}
