//! Single-key value storage for the servdash data endpoint.
//!
//! The HTTP surface persists the whole dashboard collection as one JSON
//! string under one key. This crate provides the storage behind it.
//!
//! # Storage Backends
//!
//! All backends implement the [`KvStore`] trait:
//!
//! - [`InMemoryKvStore`] -- `HashMap`-based store for tests and ephemeral servers
//! - [`FileKvStore`] -- one file per key, replaced atomically on write
//!
//! # Design Rules
//!
//! 1. Values are opaque strings; the store never interprets them.
//! 2. A write replaces the whole value. There are no partial updates.
//! 3. Readers never observe a half-written value.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod key;
pub mod memory;
pub mod traits;

pub use error::{KvError, KvResult};
pub use file::FileKvStore;
pub use key::validate_key;
pub use memory::InMemoryKvStore;
pub use traits::KvStore;
