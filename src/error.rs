//! Unified API error type and its JSON envelope.
//!
//! Every failure response carries `success: false` plus an `error` string,
//! and depending on the variant a `message`, `details`, `required` list or
//! the looked-up key (`uniqueId`, `email`, `zetaId`).

use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

static DEVELOPMENT: OnceLock<bool> = OnceLock::new();

/// Record the configured environment once at state construction. Until then
/// internal error detail stays suppressed.
pub fn set_development(development: bool) {
    let _ = DEVELOPMENT.set(development);
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Required request fields are absent or empty.
    #[error("Missing required fields")]
    MissingFields(Vec<&'static str>),

    /// Request-level validation failure with an error and optional details.
    #[error("{error}")]
    Validation {
        error: &'static str,
        details: Option<String>,
    },

    /// Lookup or delete target does not exist. `key` names the identifier
    /// the caller searched by and is echoed back in the envelope.
    #[error("{what} not found")]
    NotFound {
        what: &'static str,
        key: &'static str,
        value: String,
    },

    /// `/getCode` was hit without an authorization code.
    #[error("Authorization code is required")]
    MissingCode,

    /// Outbound provider call failed at the transport level.
    #[error("{error}")]
    Upstream { error: &'static str, details: String },

    /// Anything unexpected. Detail is exposed only in development mode.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(what: &'static str, key: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            key,
            value: value.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::Validation { .. } | Self::MissingCode => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Upstream { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn envelope(&self) -> Value {
        let mut body = Map::new();
        body.insert("success".into(), json!(false));
        match self {
            Self::MissingFields(required) => {
                body.insert("error".into(), json!("Missing required fields"));
                body.insert("required".into(), json!(required));
            }
            Self::Validation { error, details } => {
                body.insert("error".into(), json!(error));
                if let Some(details) = details {
                    body.insert("details".into(), json!(details));
                }
            }
            Self::NotFound { what, key, value } => {
                body.insert("error".into(), json!(format!("{what} not found")));
                body.insert((*key).into(), json!(value));
            }
            Self::MissingCode => {
                body.insert("error".into(), json!("Authorization code is required"));
                body.insert(
                    "message".into(),
                    json!("No authorization code received from the provider"),
                );
            }
            Self::Upstream { error, details } => {
                body.insert("error".into(), json!(error));
                body.insert("details".into(), json!(details));
            }
            Self::Internal(e) => {
                body.insert("error".into(), json!("Something went wrong!"));
                let message = if is_development() {
                    e.to_string()
                } else {
                    "Internal server error".to_string()
                };
                body.insert("message".into(), json!(message));
            }
        }
        Value::Object(body)
    }
}

fn is_development() -> bool {
    *DEVELOPMENT.get().unwrap_or(&false)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(e) = &self {
            tracing::error!(error = %e, "unexpected error");
        }
        (self.status_code(), Json(self.envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_the_required_set() {
        let err = ApiError::MissingFields(vec!["name", "email", "zeta_id"]);
        let body = err.envelope();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("Missing required fields"));
        assert_eq!(body["required"], json!(["name", "email", "zeta_id"]));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_echoes_the_lookup_key() {
        let err = ApiError::not_found("Student", "zetaId", "Z1");
        let body = err.envelope();
        assert_eq!(body["error"], json!("Student not found"));
        assert_eq!(body["zetaId"], json!("Z1"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_detail_is_suppressed_unless_development_is_configured() {
        let err = ApiError::Internal(anyhow::anyhow!("secret connection string"));
        let body = err.envelope();
        assert_eq!(body["error"], json!("Something went wrong!"));
        assert_eq!(body["message"], json!("Internal server error"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_code_is_a_bad_request() {
        let err = ApiError::MissingCode;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.envelope()["error"],
            json!("Authorization code is required")
        );
    }
}
