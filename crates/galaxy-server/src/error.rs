//! HTTP mapping for request failures.
//!
//! Every error body has the shape `{"status":"error","message":...}`.
//! Credential problems are 401. Failures reading revocation state are 500
//! and the request is refused: an unreachable cache never means "allowed".

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use galaxy_auth::AuthError;
use galaxy_id::ParseIdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The generator refused to mint an ID, e.g. after a clock regression.
    #[error("id generation failed: {0}")]
    IdGeneration(#[from] galaxy_id::Error),

    #[error("invalid id: {0}")]
    InvalidId(#[from] ParseIdError),

    #[error("{0}")]
    InvalidRequest(&'static str),

    /// Password hashing runs on the blocking pool; the task died.
    #[error("blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(e) if e.is_unauthorized() => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::UsernameTaken { .. }) => StatusCode::CONFLICT,
            Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IdGeneration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidId(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_owned()
        } else {
            if status == StatusCode::SERVICE_UNAVAILABLE {
                tracing::error!(error = %self, "request failed");
            }
            self.to_string()
        };

        let body = serde_json::json!({
            "status": "error",
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_auth::CacheError;

    #[test]
    fn statuses_follow_failure_kind() {
        assert_eq!(
            ApiError::from(AuthError::MissingToken).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Blacklisted).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Invalidated {
                issued_at: 1,
                invalidated_at: 2
            })
            .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Cache(CacheError::Unavailable("down".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(galaxy_id::Error::ClockMovedBackward {
                last_timestamp: 2,
                now: 1
            })
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ParseIdError::Empty).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::UsernameTaken {
                username: "ada".into()
            })
            .status(),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let response =
            ApiError::from(AuthError::Cache(CacheError::Unavailable("10.0.0.3:6379".into())))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": "error", "message": "internal server error"})
        );
    }
}
