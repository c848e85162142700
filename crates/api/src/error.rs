use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use async_graphql::ErrorExtensions;
use infra::registration::{DenyReason, RegistrationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Stable machine-readable code, exposed as the `code` GraphQL extension.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Registration(e) => match e {
                RegistrationError::InvalidDay(_) => "INVALID_DAY",
                RegistrationError::InvalidUser => "INVALID_USER",
                RegistrationError::InvalidRequest(_) => "BAD_REQUEST",
                RegistrationError::Denied(DenyReason::DayAlreadyUsed { .. }) => "DAY_ALREADY_USED",
                RegistrationError::Denied(DenyReason::GlobalCapReached { .. }) => "GLOBAL_CAP_REACHED",
                RegistrationError::AdmissionCheckFailed(_) => "ADMISSION_CHECK_FAILED",
                RegistrationError::AssignmentFailed(_) => "ASSIGNMENT_FAILED",
                RegistrationError::DuplicateRegistrationId(_) => "DUPLICATE_REGISTRATION_ID",
                RegistrationError::DuplicateReceiptNumber(_) => "DUPLICATE_RECEIPT_NUMBER",
                RegistrationError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
                RegistrationError::NotFound(_) => "NOT_FOUND",
                RegistrationError::Forbidden(_) => "FORBIDDEN",
            },
            AppError::Unauthorized(_) => "UNAUTHENTICATED",
            AppError::BadRequest(_) => "BAD_REQUEST",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Registration(e) if e.is_retryable())
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Registration(e) => match e {
                RegistrationError::InvalidDay(_)
                | RegistrationError::InvalidUser
                | RegistrationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                RegistrationError::Denied(_)
                | RegistrationError::DuplicateRegistrationId(_)
                | RegistrationError::DuplicateReceiptNumber(_) => StatusCode::CONFLICT,
                RegistrationError::NotFound(_) => StatusCode::NOT_FOUND,
                RegistrationError::Forbidden(_) => StatusCode::FORBIDDEN,
                RegistrationError::AdmissionCheckFailed(_)
                | RegistrationError::AssignmentFailed(_)
                | RegistrationError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        let retryable = self.is_retryable();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", code);
            e.set("retryable", retryable);
        })
    }
}

/// Converts any error the resolvers see into a GraphQL error carrying its code.
pub fn gql_error(err: impl Into<AppError>) -> async_graphql::Error {
    err.into().extend()
}

#[cfg(test)]
mod tests {
    use infra::models::GameDay;
    use infra::registration::StoreError;

    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        let denied = AppError::from(RegistrationError::Denied(DenyReason::DayAlreadyUsed {
            day: GameDay::Day1,
            game_name: "Algo Cricket".into(),
            registration_id: "SAF-ACR-1-1 [A]".into(),
        }));
        assert_eq!(denied.code(), "DAY_ALREADY_USED");
        assert_eq!(denied.status(), StatusCode::CONFLICT);
        assert!(denied.to_string().contains("Algo Cricket"));

        let outage = AppError::from(RegistrationError::AdmissionCheckFailed(StoreError::Unavailable(
            "down".into(),
        )));
        assert!(outage.is_retryable());
        assert_eq!(outage.status(), StatusCode::SERVICE_UNAVAILABLE);

        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);

        let clash = AppError::from(RegistrationError::DuplicateReceiptNumber("VEYG-7".into()));
        assert_eq!(clash.code(), "DUPLICATE_RECEIPT_NUMBER");
        assert_eq!(clash.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_graphql_extension_code() {
        let err = gql_error(RegistrationError::InvalidDay(3));
        let extensions = err.extensions.expect("extensions set");
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("INVALID_DAY"))
        );
    }
}
