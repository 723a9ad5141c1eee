use crate::response::api_response::ApiErrorResponse;
use axum::extract::rejection::BytesRejection;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::error_code;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid json body: {0}")]
    InvalidBody(#[from] serde_json::Error),
    #[error(transparent)]
    BodyRejection(#[from] BytesRejection),
}

impl RequestError {
    fn get_code(&self) -> u32 {
        match self {
            RequestError::InvalidBody(_) => error_code::INVALID_BODY,
            RequestError::BodyRejection(_) => error_code::BODY_REJECTION,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        match self {
            RequestError::InvalidBody(_) => {
                ApiErrorResponse::send(400, self.get_code(), Some(self.to_string()))
            }
            RequestError::BodyRejection(ref rejection) => ApiErrorResponse::send(
                rejection.status().as_u16(),
                self.get_code(),
                Some(self.to_string()),
            ),
        }
    }
}
