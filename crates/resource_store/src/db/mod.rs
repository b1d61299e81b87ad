//! SQLite storage bootstrap, schema provisioning and transaction scoping.
//!
//! # Responsibility
//! - Provision the `resource_meta` / `resource_attribute` tables per engine.
//! - Open convenience SQLite connections with the schema in place.
//! - Offer an opt-in scoped transaction for multi-statement writes.
//!
//! # Invariants
//! - DDL is selected by engine; unknown engines fail before any statement runs.
//! - Schema provisioning is idempotent (`IF NOT EXISTS` everywhere).

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;
mod transaction;

pub use open::{open_db, open_db_in_memory};
pub use schema::{create_tables, Engine, SchemaTarget};
pub use transaction::with_transaction;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedEngine { driver: String },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedEngine { driver } => {
                write!(f, "unsupported database engine `{driver}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedEngine { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
