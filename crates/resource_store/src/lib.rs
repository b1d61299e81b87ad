//! Entity-attribute-value resource store over SQLite.
//!
//! Resources carry an integer id, a free-form type and an optional parent;
//! attributes are open-ended named values stored in one of three typed
//! columns. See `repo::resource_repo` for the access contract.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{create_tables, open_db, open_db_in_memory, with_transaction, DbError, DbResult};
pub use db::{Engine, SchemaTarget};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::resource::{Attributes, Resource, ResourceId, ResourceMeta};
pub use model::value::{classify_value, AttributeValue};
pub use repo::resource_repo::{
    LookupMode, RepoError, RepoResult, ResourceRepository, SqliteResourceRepository,
};
pub use service::resource_service::{replace_attributes, ResourceService};

/// Returns the crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
