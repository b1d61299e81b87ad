//! Resource domain model for the entity-attribute-value store.
//!
//! # Responsibility
//! - Define the meta row, the resolved resource and typed attribute values.
//! - Own the raw-input classification used by attribute writes.
//!
//! # Invariants
//! - A resource is identified by an externally assigned integer id.
//! - Absence of an attribute is the absence of its row, never a null value.

pub mod resource;
pub mod value;
