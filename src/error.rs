use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde_json::json;

use crate::database::SqliteDatabaseError;

#[derive(Debug)]
pub struct InternalError {
    pub message: String,
}

impl InternalError {
    pub fn new(message: String) -> InternalError {
        InternalError { message }
    }
}

impl From<SqliteDatabaseError> for InternalError {
    fn from(err: SqliteDatabaseError) -> InternalError {
        InternalError::new(format!("{err}"))
    }
}

impl IntoResponse for InternalError {
    fn into_response(self) -> Response {
        // The details stay in the log, the client only learns that the
        // request failed.
        error!(
            "Error encountered while processing request: {}",
            self.message
        );
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "internal server error" })),
        )
            .into_response()
    }
}
