//! Storage abstractions for the service layer
//!
//! The record store lives only in process memory; every handler that needs a
//! check-then-write sequence runs it under a single write lock.

pub mod memory_map_store;
