//! Data model for servdash.
//!
//! This crate defines the shapes that are persisted as one JSON array and
//! shared by every other servdash crate.
//!
//! # Key Types
//!
//! - [`Collection`] -- the ordered list of top-level [`Item`]s persisted as a unit
//! - [`Server`] -- a tracked machine or service, tagged with a [`ServerCategory`]
//! - [`Site`] -- a hosted domain, nested inside exactly one file server
//! - [`CategoryRules`] -- per-category required fields and field shaping
//! - [`SiteAssociation`] -- the four weak references a site may hold

pub mod category;
pub mod collection;
pub mod error;
pub mod id;
pub mod item;
pub mod mx;
pub mod server;
pub mod site;

pub use category::{CategoryFilter, CategoryRules, RequiredField, ServerCategory};
pub use collection::Collection;
pub use error::TypeError;
pub use id::generate_id;
pub use item::Item;
pub use mx::{join_mx_lines, join_mx_list, parse_mx_lines, parse_mx_list};
pub use server::{CustomField, Server};
pub use site::{Site, SiteAssociation, DEFAULT_ADMIN_CREDENTIAL};
