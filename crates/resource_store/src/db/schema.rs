//! Engine-specific DDL for the two resource tables.
//!
//! # Responsibility
//! - Map a driver name to a known `Engine` profile.
//! - Own the DDL statements for each profile.
//! - Apply them through any connection that implements `SchemaTarget`.
//!
//! # Invariants
//! - Every statement is `CREATE ... IF NOT EXISTS`; re-running is a no-op.
//! - `resource_attribute` is unique on `(id, attribute)` in every profile.

use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const SQLITE_DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS resource_meta (
        id INTEGER PRIMARY KEY,
        type TEXT,
        parent INTEGER
    );",
    "CREATE TABLE IF NOT EXISTS resource_attribute (
        id INTEGER,
        attribute TEXT,
        value_int INTEGER,
        value_real REAL,
        value_text TEXT,
        PRIMARY KEY (id, attribute)
    );",
];

const MYSQL_DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS `resource_meta` (
        `id` INT(11) NOT NULL AUTO_INCREMENT,
        `type` VARCHAR(50) NULL DEFAULT NULL,
        `parent` INT(11) NULL DEFAULT NULL,
        PRIMARY KEY (`id`),
        INDEX `id_parent` (`parent`)
    )
    ENGINE=InnoDB",
    "CREATE TABLE IF NOT EXISTS `resource_attribute` (
        `id` INT(11) NOT NULL,
        `attribute` VARCHAR(50) NOT NULL,
        `value_int` INT(11) NULL DEFAULT NULL,
        `value_real` FLOAT NULL DEFAULT NULL,
        `value_text` TEXT NULL,
        UNIQUE (`id`, `attribute`)
    )
    COLLATE=\"utf8_unicode_ci\"
    ENGINE=InnoDB",
];

/// Database dialects with a known DDL profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// Embedded single-file engine.
    Sqlite,
    /// Client/server engine (MySQL and MariaDB).
    MySql,
}

impl Engine {
    /// Resolves a driver name (case-insensitive) to an engine profile.
    ///
    /// Returns `None` for drivers without a DDL profile.
    pub fn from_driver_name(driver: &str) -> Option<Self> {
        match driver.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            "mysql" | "mariadb" => Some(Self::MySql),
            _ => None,
        }
    }

    /// DDL statements that provision both resource tables, in execution order.
    pub fn ddl(self) -> &'static [&'static str] {
        match self {
            Self::Sqlite => SQLITE_DDL,
            Self::MySql => MYSQL_DDL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::MySql => "mysql",
        }
    }
}

impl Display for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection capabilities required to provision the schema.
///
/// Implementors report their dialect and run raw DDL. Anything beyond the
/// bundled SQLite connection (e.g. a MySQL client) plugs in here.
pub trait SchemaTarget {
    /// Driver name of the active connection, e.g. `sqlite` or `mysql`.
    fn driver_name(&self) -> String;

    /// Executes one raw DDL statement.
    fn execute_ddl(&self, sql: &str) -> DbResult<()>;
}

impl SchemaTarget for Connection {
    fn driver_name(&self) -> String {
        Engine::Sqlite.as_str().to_string()
    }

    fn execute_ddl(&self, sql: &str) -> DbResult<()> {
        self.execute_batch(sql)?;
        Ok(())
    }
}

/// Creates `resource_meta` and `resource_attribute` if they are absent.
///
/// # Errors
/// - `DbError::UnsupportedEngine` when the target's driver has no profile.
///   Nothing is executed in that case.
/// - Any error raised by the target while executing DDL.
pub fn create_tables<T: SchemaTarget + ?Sized>(target: &T) -> DbResult<()> {
    let started_at = Instant::now();
    let driver = target.driver_name();

    let Some(engine) = Engine::from_driver_name(&driver) else {
        error!(
            "event=schema_create module=db status=error driver={} error_code=unsupported_engine",
            driver
        );
        return Err(DbError::UnsupportedEngine { driver });
    };

    for sql in engine.ddl() {
        target.execute_ddl(sql)?;
    }

    info!(
        "event=schema_create module=db status=ok engine={} statements={} duration_ms={}",
        engine,
        engine.ddl().len(),
        started_at.elapsed().as_millis()
    );
    Ok(())
}
