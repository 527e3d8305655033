use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use archdrift_core::errors::ArchDriftError;

/// Wraps every fallible handler's error path. `Other` covers `anyhow`
/// context added at this crate's own boundary (request validation,
/// mismatched repo id) rather than a typed core failure.
#[derive(Debug)]
pub enum ApiError {
    Core(ArchDriftError),
    Other(anyhow::Error),
}

impl From<ArchDriftError> for ApiError {
    fn from(err: ArchDriftError) -> Self {
        Self::Core(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

fn status_for(kind: &str) -> StatusCode {
    match kind {
        "InvalidConfig" | "InvalidEdge" => StatusCode::BAD_REQUEST,
        "BaselineMissing" => StatusCode::NOT_FOUND,
        "SnapshotNotFound" => StatusCode::NOT_FOUND,
        "BaselineHashMismatch" => StatusCode::CONFLICT,
        "Timeout" => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            Self::Core(err) => (status_for(err.kind()), err.kind().to_string(), err.to_string()),
            Self::Other(err) => (StatusCode::BAD_REQUEST, "InvalidRequest".to_string(), format!("{err:#}")),
        };
        (status, Json(ErrorBody { error: kind, message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
