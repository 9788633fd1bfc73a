use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use servdash_types::Collection;

use crate::error::GatewayResult;

/// Acknowledgement returned by a successful whole-collection write.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteAck {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

fn default_success() -> bool {
    true
}

impl WriteAck {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Whole-collection persistence.
///
/// Implementations must satisfy:
/// - `read` returns the complete stored collection, or an empty one if
///   nothing was stored yet. It never returns a partial collection.
/// - `write` replaces the complete stored collection in one step.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn read(&self) -> GatewayResult<Collection>;

    async fn write(&self, collection: &Collection) -> GatewayResult<WriteAck>;
}
