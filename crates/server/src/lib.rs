use axum::{Json, http::StatusCode, response::IntoResponse};
use sea_orm::DbErr;

use api_types::ErrorResponse;
pub use server::{CountdownConfig, router, run, run_with_listener, spawn_with_listener};

mod data;
mod server;
mod user;

pub enum ServerError {
    /// The request was understood but its content is not acceptable.
    Generic(String),
    /// A database operation failed; only `message` reaches the client.
    Storage { message: &'static str, source: DbErr },
}

impl ServerError {
    pub(crate) fn storage(message: &'static str) -> impl FnOnce(DbErr) -> Self {
        move |source| Self::Storage { message, source }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Storage { message, source } => {
                tracing::error!("database error: {source}");
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
