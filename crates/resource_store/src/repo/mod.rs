//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the resource data access contract.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Repository APIs report NotFound as `None`, and reserve errors for
//!   database failures and schema problems.
//! - The repository borrows a connection; it never opens or closes one.

pub mod resource_repo;
