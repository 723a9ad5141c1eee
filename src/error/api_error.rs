use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::query_error::QueryExecutionError;
use super::request_error::RequestError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    QueryExecutionError(#[from] QueryExecutionError),
    #[error(transparent)]
    RequestError(#[from] RequestError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::QueryExecutionError(error) => error.into_response(),
            ApiError::RequestError(error) => error.into_response(),
        }
    }
}
