//! Use-case services built on top of the repository layer.
//!
//! # Responsibility
//! - Compose single-call repository operations into multi-step use-cases.
//! - Keep transaction scoping out of the repository itself.

pub mod resource_service;
