use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use servdash_kv::KvError;
use thiserror::Error;

/// Errors raised while configuring or starting the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("storage error: {0}")]
    Storage(#[from] KvError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Errors returned by request handlers.
///
/// Bodies are short plain-text messages. Internal details are logged and
/// never sent to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid body, expected JSON array")]
    InvalidBody,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("storage error: {0}")]
    Storage(#[from] KvError),

    #[error("stored data is not valid JSON: {0}")]
    CorruptData(serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidBody => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Storage(_) | ApiError::CorruptData(_) => {
                tracing::error!(error = %self, "data endpoint failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response();
            }
        };
        (status, self.to_string()).into_response()
    }
}
