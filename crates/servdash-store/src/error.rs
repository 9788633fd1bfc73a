use servdash_gateway::GatewayError;
use thiserror::Error;

/// Errors reported by collection store operations.
///
/// Validation and not-found errors leave the collection untouched. A
/// persistence error after a mutation means the mutation is applied in
/// memory but not stored.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("server not found: {0}")]
    ServerNotFound(String),

    #[error("file server not found: {0}")]
    FileServerNotFound(String),

    #[error("site {site_id} not found in file server {file_server_id}")]
    SiteNotFound {
        site_id: String,
        file_server_id: String,
    },

    #[error("persistence error: {0}")]
    Persistence(#[from] GatewayError),
}

/// Coarse classification of a [`DashboardError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Persistence,
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFields(_) | Self::InvalidInput(_) => ErrorKind::Validation,
            Self::ServerNotFound(_) | Self::FileServerNotFound(_) | Self::SiteNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
