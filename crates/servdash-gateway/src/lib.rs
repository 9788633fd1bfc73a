//! Blob store gateway for servdash.
//!
//! The dashboard keeps its whole collection in memory and persists it as a
//! single JSON array. A [`Gateway`] is the only way the collection store
//! talks to persistence: it reads the whole collection or overwrites it.
//! There are no partial reads, partial writes, or version checks; two
//! writers simply overwrite each other.
//!
//! - [`HttpGateway`] -- `GET`/`PUT {base}/api/data` over HTTP
//! - [`KvGateway`] -- direct access to a [`servdash_kv::KvStore`] in-process

pub mod error;
pub mod http;
pub mod kv;
pub mod traits;

pub use error::{GatewayError, GatewayResult};
pub use http::{GatewayConfig, HttpGateway, DATA_PATH};
pub use kv::{KvGateway, DEFAULT_DATA_KEY};
pub use traits::{Gateway, WriteAck};
