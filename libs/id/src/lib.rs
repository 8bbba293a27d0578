//! # ordinal-id
//!
//! Sequence keys, display templates, and search-token translation for
//! human-readable sequential identifiers.
//!
//! ## Design Principles
//!
//! - The stored value is a plain integer; the display string is derived
//! - Templates are parsed once; formatting and search are pure functions
//! - Formatting then searching recovers the integer (round-trip law)
//! - Counters are keyed by entity type and an optional scope
//!
//! ## Identifier Format
//!
//! A template holds one placeholder, e.g. `REQ-{0000}`:
//! - `format(42)` renders `REQ-42`
//! - searching `REQ-42` or `req-42` resolves to an exact match on 42
//! - searching `Login bug` stays free text
//!
//! Everything in this crate is synchronous and side-effect free. Allocation
//! lives in `ordinal-store`.

mod error;
mod macros;
mod search;
mod template;
mod types;

pub use error::IdError;
pub use macros::MAX_LABEL_LEN;
pub use search::{resolve_raw, resolve_search_token, SearchToken};
pub use template::{format_identifier, IdentifierTemplate};
pub use types::*;
