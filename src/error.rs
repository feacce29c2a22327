use actix_web::{HttpResponse, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::engine::status::{Decision, RequestKind, RequestStatus};

/// Every failure the core can surface, in categorically distinct variants:
/// validation and authorization reject before any side effect, domain-state
/// conditions abort the enclosing transaction, and `Compensation` is the one
/// deliberately doubled error (override finalize failed AND the rollback
/// failed, so manual reconciliation may be required).
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}: {}", field, message)]
    Validation {
        field: &'static str,
        message: String,
    },

    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "{} not found", entity)]
    NotFound { entity: &'static str },

    #[display(fmt = "cannot {} {} request from status {}", decision, kind, from)]
    InvalidTransition {
        kind: RequestKind,
        decision: Decision,
        from: RequestStatus,
    },

    #[display(fmt = "cannot cancel {} request from status {}", kind, from)]
    InvalidCancellation {
        kind: RequestKind,
        from: RequestStatus,
    },

    #[display(
        fmt = "INSUFFICIENT_BALANCE: requested {} but only {} available",
        requested,
        available
    )]
    InsufficientBalance { requested: f64, available: f64 },

    #[display(
        fmt = "leave balance already exists for employee {} leave type {} year {}",
        employee_id,
        leave_type_id,
        year
    )]
    DuplicateBalance {
        employee_id: u64,
        leave_type_id: u64,
        year: i32,
    },

    #[display(fmt = "{}; compensating rollback failed: {}", original, rollback)]
    Compensation { original: String, rollback: String },

    #[display(fmt = "{}", _0)]
    Internal(String),

    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for ApiError {}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err)
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidTransition { .. }
            | ApiError::InvalidCancellation { .. }
            | ApiError::DuplicateBalance { .. } => StatusCode::CONFLICT,
            ApiError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Compensation { .. } | ApiError::Internal(_) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Database(e) => {
                tracing::error!(error = %e, "database failure");
                "Internal Server Error".to_string()
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_names_the_condition() {
        let err = ApiError::InsufficientBalance {
            requested: 5.0,
            available: 2.5,
        };
        assert!(err.to_string().starts_with("INSUFFICIENT_BALANCE"));
    }

    #[test]
    fn transition_error_names_kind_and_decision() {
        let err = ApiError::InvalidTransition {
            kind: RequestKind::Overtime,
            decision: Decision::Reject,
            from: RequestStatus::Cancelled,
        };
        assert_eq!(
            err.to_string(),
            "cannot reject overtime request from status cancelled"
        );
    }

    #[test]
    fn compensation_error_carries_both_failures() {
        let err = ApiError::Compensation {
            original: "finalize failed".to_string(),
            rollback: "rollback failed".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("finalize failed"));
        assert!(rendered.contains("rollback failed"));
    }
}
