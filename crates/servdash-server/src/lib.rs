//! HTTP server for servdash.
//!
//! Stores the whole dashboard collection as one JSON array under a single
//! key and exposes it at `/api/data`:
//! - `GET` returns the stored array, or `[]` when nothing is stored
//! - `PUT` replaces it with the request body, which must be a JSON array
//!
//! The server does not look inside the array. Validation of servers and
//! sites happens in the client-side collection store.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::{ServerConfig, DEFAULT_DATA_KEY};
pub use error::{ApiError, ServerError, ServerResult};
pub use router::build_router;
pub use server::DashboardServer;
pub use state::AppState;
