//! # ordinal-store
//!
//! Durable allocation of human-readable sequence numbers and the
//! per-entity-type template registry that renders them.
//!
//! This crate provides:
//! - [`SequenceStore`]: atomic per-key `allocate`, backed by Postgres or memory
//! - [`FormatRegistry`]: template lookup with graceful fallback to raw integers
//! - [`create_numbered`]: allocate-then-commit helper for creation workflows
//! - Connection pool and migration management
//!
//! The database layer uses SQLx with Postgres.

mod db;
mod error;
mod hook;
mod registry;
mod sequence;
mod templates;

pub use db::{Database, DbConfig};
pub use error::StoreError;
pub use hook::{create_numbered, CreateError, Numbered};
pub use registry::FormatRegistry;
pub use sequence::{MemorySequenceStore, PgSequenceStore, SequenceStore};
pub use templates::{PgTemplateStore, StaticTemplates, TemplateRow, TemplateSource};
