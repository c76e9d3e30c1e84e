use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use store::{MoneyError, StoreError};
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotUnique => AppError::BadRequest("Value already exists.".into()),
            StoreError::StillReferenced => {
                AppError::Conflict("Still referenced by existing records.".into())
            }
            StoreError::Money(error) => error.into(),
            other => AppError::InternalError(Box::new(other)),
        }
    }
}

impl From<MoneyError> for AppError {
    fn from(error: MoneyError) -> Self {
        AppError::BadRequest(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::InternalError(ref e) => {
                error!("Internal error: {e}");

                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
            }
        };

        (status, self.to_string()).into_response()
    }
}
