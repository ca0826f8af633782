//! Error to response mapping.
//!
//! # Responsibilities
//! - Map denials to 403 with a JSON body naming the profiles
//! - Map configuration errors to 500 without leaking details
//!
//! # Design Decisions
//! - Denials are logged at warn, configuration errors at error

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::GuardError;

/// Body returned with guard failures.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
}

impl GuardError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_configuration() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::FORBIDDEN
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if self.is_configuration() {
            tracing::error!(error = %self, "Security profile misconfigured");
            "Internal Server Error".to_string()
        } else {
            tracing::warn!(error = %self, "Request rejected by security policy");
            self.to_string()
        };

        let body = ErrorBody {
            status_code: status.as_u16(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_denial_is_forbidden() {
        let response = GuardError::ForbiddenAddress {
            profiles: "a, b".into(),
            address: "1.2.3.4".into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 403);
        assert_eq!(body["message"], "Forbidden IP address: 1.2.3.4, profile name: a, b");
    }

    #[tokio::test]
    async fn test_configuration_error_hidden() {
        let response = GuardError::ProfileNotFound("ghost".into()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 500);
        assert_eq!(body["message"], "Internal Server Error");
    }
}
