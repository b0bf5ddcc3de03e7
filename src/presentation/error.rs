use axum::{
    Json,
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// json body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// converts `DomainError` and request-parsing failures into the matching HTTP response
#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    /// the query string, form or body could not be read; status comes from the extractor
    MalformedRequest { status: StatusCode, detail: String },
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::MalformedRequest {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedRequest {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::MalformedRequest {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::CapacityExceeded
        | DomainError::NotRegistered
        | DomainError::CapacityBelowEnrollment { .. } => StatusCode::BAD_REQUEST,
        DomainError::InvalidEmail
        | DomainError::InvalidMaxParticipants
        | DomainError::EmptyField(_)
        | DomainError::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::InvalidCredentials | DomainError::InvalidToken => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden => StatusCode::FORBIDDEN,
        DomainError::Repository(_)
        | DomainError::PasswordHash(_)
        | DomainError::TokenIssue(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Domain(err) => {
                let status = domain_status(&err);
                // internal details stay in the log
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                    (status, "Internal server error".to_string())
                } else {
                    (status, err.to_string())
                }
            }
            Self::MalformedRequest { status, detail } => {
                tracing::debug!(%status, %detail, "malformed request");
                (status, detail)
            }
        };

        let mut response = (status, Json(ErrorResponse { detail })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::RepositoryError;

    #[test]
    fn each_error_kind_has_its_own_status() {
        let cases = [
            (DomainError::NotFound("Activity"), StatusCode::NOT_FOUND),
            (DomainError::Conflict("dup".into()), StatusCode::CONFLICT),
            (DomainError::CapacityExceeded, StatusCode::BAD_REQUEST),
            (DomainError::NotRegistered, StatusCode::BAD_REQUEST),
            (DomainError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (DomainError::InvalidToken, StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden, StatusCode::FORBIDDEN),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn unauthorized_asks_for_a_bearer_token() {
        let response = ApiError::from(DomainError::InvalidToken).into_response();
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn store_failures_are_opaque() {
        let err = DomainError::Repository(RepositoryError::DatabaseError("secret dsn".into()));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
