//! Collection store for servdash.
//!
//! [`CollectionStore`] holds the whole dashboard collection in memory,
//! derives the list views the dashboard shows, and applies create, edit,
//! and delete mutations. Every successful mutation is followed by a write of
//! the complete collection through a [`Gateway`](servdash_gateway::Gateway).
//!
//! The pure pieces are usable on their own:
//! - [`views`] -- read-only projections of a [`Collection`]
//! - [`mutation`] -- validated in-memory edits of a [`Collection`]
//! - [`input`] -- form-shaped inputs for servers and sites

pub mod error;
pub mod input;
pub mod mutation;
pub mod store;
pub mod views;

#[cfg(test)]
mod testing;

pub use error::{DashboardError, DashboardResult, ErrorKind};
pub use input::{ServerInput, SiteInput};
pub use mutation::DeletedServer;
pub use store::CollectionStore;
pub use views::{DeleteImpact, FlattenedSite, Stats, NOT_AVAILABLE};

// Re-export key types
pub use servdash_gateway::{Gateway, GatewayError, WriteAck};
pub use servdash_types::{
    CategoryFilter, Collection, CustomField, Server, ServerCategory, Site, SiteAssociation,
};
