//! The CRUD handler set shared by every variant.
//!
//! A [`Variant`] names one of the six tutorial tiers and yields the
//! [`CrudPolicy`] that decides which operations fail and which quietly
//! succeed. [`CrudService`] is the single implementation driven by it.

pub mod policy;
pub mod record;
pub mod seed;
pub mod service;

pub use policy::{CreateMode, CreateShape, CrudPolicy, FieldCheck, IdSource, MissingPolicy, Resource, UpdateMode, Variant};
pub use record::{Record, RecordId};
pub use service::{CrudService, Outcome, Removal, Written};
