use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// One failed field rule, reported together with its peers rather than
/// short-circuiting on the first failure.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),

    Validation(Vec<Violation>),

    /// Missing/invalid bearer token. Always rendered with the same reason so
    /// callers cannot distinguish absent from unknown tokens.
    Unauthenticated,

    /// Authenticated but the credentials or ownership do not check out.
    Unauthorized(String),

    Forbidden(String),

    NotFound(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Validation(violations) => {
                write!(f, "Validation error: {}", join_messages(violations))
            }
            ApiError::Unauthenticated => write!(f, "{}", UNAUTHENTICATED_REASON),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

const UNAUTHENTICATED_REASON: &str = "User has not been authenticated.";

/// Wire shape of every failure: `{"error": true, "reason": "..."}`, with the
/// individual field violations attached when the failure was a validation one.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: bool,
    reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<Vec<Violation>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason, violations) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Validation(violations) => (
                StatusCode::BAD_REQUEST,
                join_messages(&violations),
                Some(violations),
            ),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                UNAUTHENTICATED_REASON.to_string(),
                None,
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: true,
            reason,
            violations,
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(format!("{err:#}"))
    }
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}

fn join_messages(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join(" and ")
}
