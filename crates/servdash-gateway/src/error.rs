use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection refused, DNS failure, timeout, TLS, etc.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// The payload could not be decoded as a collection.
    #[error("malformed payload: {0}")]
    Decode(String),

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("storage error: {0}")]
    Kv(#[from] servdash_kv::KvError),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
