use crate::api::ErrorResponse;
use crate::reconcile::ReconcileError;
use crate::store::StoreError;
use crate::validate::ValidationError;
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request body contains invalid or missing parameters.")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Ingredients(#[from] ReconcileError),

    #[error("Recipe with ID {0} not found.")]
    NotFound(String),

    #[error("Recipe with title '{0}' already exists.")]
    Conflict(String),

    #[error("Method {method} not allowed.")]
    MethodNotAllowed {
        method: Method,
        allowed: &'static [&'static str],
    },

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

impl ApiError {
    /// Classify a failed write that used `title`: duplicate keys become a
    /// conflict, everything else is passed through as unknown.
    pub fn from_store(err: StoreError, title: &str) -> Self {
        match err {
            StoreError::UniqueViolation(_) => ApiError::Conflict(title.to_string()),
            other => ApiError::Unknown(other.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Ingredients(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Unknown(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Unknown(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Validation(reason) => tracing::debug!("Rejected request body: {}", reason),
            ApiError::Ingredients(reason) => tracing::debug!("Rejected ingredients: {:?}", reason),
            ApiError::Unknown(message) => tracing::error!("Request failed: {}", message),
            _ => {}
        }

        let allow = match &self {
            ApiError::MethodNotAllowed { allowed, .. } => {
                HeaderValue::from_str(&allowed.join(", ")).ok()
            }
            _ => None,
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response();

        if let Some(allow) = allow {
            response.headers_mut().insert(header::ALLOW, allow);
        }

        response
    }
}
