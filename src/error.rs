use axum::http::StatusCode;
use axum::response::{ IntoResponse, Response };
use axum::Json;
use log::error;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::llm::ProviderError;
use crate::models::api::ErrorDetail;
use crate::profile::ProfileError;

/// Everything a chat or upload request can fail with.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("failed to stage upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    BadRequest(String),
}

impl AgentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AgentError::Provider(ProviderError::AuthRejected) => StatusCode::UNAUTHORIZED,
            AgentError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(ErrorDetail { detail: self.to_string() })).into_response()
    }
}
