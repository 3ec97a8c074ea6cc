//! Service layer for the tiered CRUD services.
//! - `storage` holds the in-memory record map.
//! - `crud` holds the strictness policies and the single handler set that
//!   every variant runs through.
//! - Errors are framework-agnostic; the HTTP crate translates them.

pub mod errors;
pub mod storage;
pub mod crud;
