//! Resource repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read and write `resource_meta` / `resource_attribute` rows.
//! - Coalesce the three typed value columns into one `AttributeValue`.
//!
//! # Invariants
//! - Every write is a single statement; meta and attribute writes are
//!   upserts (`REPLACE INTO`), so the last writer wins.
//! - An attribute row holds at most one non-null value column.
//! - NotFound is reported as `None` (or an empty map), never as an error.
//! - Multi-entry writes are not atomic; wrap them in
//!   `db::with_transaction` when that matters.

use crate::db::DbError;
use crate::model::resource::{Attributes, Resource, ResourceId, ResourceMeta};
use crate::model::value::{classify_value, integral_i64, parse_numeric, AttributeValue};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const META_TABLE: &str = "resource_meta";
const ATTRIBUTE_TABLE: &str = "resource_attribute";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for resource persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite failure, passed through untranslated.
    Db(DbError),
    /// Connection is missing one of the resource tables.
    MissingRequiredTable(&'static str),
    /// Resource table exists but lacks an expected column.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// How `get_attribute` treats stored values that are "falsy".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// `0`, `0.0`, `""` and `"0"` are reported as absent.
    #[default]
    Compat,
    /// Only a missing row is reported as absent.
    Strict,
}

/// Repository interface for resource meta and attribute access.
///
/// The provided methods compose the required ones exactly the way callers
/// would: `get` is `get_meta` plus `get_attributes`, `get_parent` is
/// `get_meta` followed by `get` on the parent id.
pub trait ResourceRepository {
    fn get_meta(&self, id: ResourceId) -> RepoResult<Option<ResourceMeta>>;
    fn get_attribute(&self, id: ResourceId, name: &str) -> RepoResult<Option<AttributeValue>>;
    fn get_attributes(&self, id: ResourceId) -> RepoResult<Attributes>;

    /// Upserts the meta row. Unconditional overwrite, no field merge.
    fn set_meta(&self, id: ResourceId, kind: &str, parent: Option<ResourceId>) -> RepoResult<()>;

    /// Upserts one attribute, or deletes it when `value` is `None`.
    fn set_attribute(&self, id: ResourceId, name: &str, value: Option<&str>) -> RepoResult<()>;

    /// Deletes every attribute row of `id`.
    fn clear_attributes(&self, id: ResourceId) -> RepoResult<()>;

    /// Resolves the meta row and attaches all attributes.
    fn get(&self, id: ResourceId) -> RepoResult<Option<Resource>> {
        let Some(meta) = self.get_meta(id)? else {
            return Ok(None);
        };
        let attributes = self.get_attributes(id)?;
        Ok(Some(Resource { meta, attributes }))
    }

    /// Writes each entry in order through `set_attribute`.
    ///
    /// `None` clears all attributes of `id`. Attributes not named in
    /// `attributes` are left untouched.
    fn set_attributes<K, V>(
        &self,
        id: ResourceId,
        attributes: Option<&[(K, Option<V>)]>,
    ) -> RepoResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let Some(entries) = attributes else {
            return self.clear_attributes(id);
        };
        for (name, value) in entries {
            self.set_attribute(id, name.as_ref(), value.as_ref().map(AsRef::as_ref))?;
        }
        Ok(())
    }

    /// Writes a positional list; each index becomes the attribute name.
    fn set_attribute_list<V>(&self, id: ResourceId, values: &[Option<V>]) -> RepoResult<()>
    where
        V: AsRef<str>,
    {
        for (index, value) in values.iter().enumerate() {
            self.set_attribute(id, &index.to_string(), value.as_ref().map(AsRef::as_ref))?;
        }
        Ok(())
    }

    /// Resolves the direct parent of `id` (one level).
    fn get_parent(&self, id: ResourceId) -> RepoResult<Option<Resource>> {
        match self.get_meta(id)?.and_then(|meta| meta.parent) {
            Some(parent_id) => self.get(parent_id),
            None => Ok(None),
        }
    }
}

/// SQLite-backed resource repository over a caller-owned connection.
pub struct SqliteResourceRepository<'conn> {
    conn: &'conn Connection,
    lookup_mode: LookupMode,
}

impl<'conn> SqliteResourceRepository<'conn> {
    /// Wraps `conn` without checking the schema.
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            lookup_mode: LookupMode::default(),
        }
    }

    /// Wraps `conn` after verifying both resource tables are present.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_resource_connection_ready(conn)?;
        Ok(Self::new(conn))
    }

    pub fn with_lookup_mode(mut self, lookup_mode: LookupMode) -> Self {
        self.lookup_mode = lookup_mode;
        self
    }

    pub fn lookup_mode(&self) -> LookupMode {
        self.lookup_mode
    }
}

impl ResourceRepository for SqliteResourceRepository<'_> {
    fn get_meta(&self, id: ResourceId) -> RepoResult<Option<ResourceMeta>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, type, parent
                 FROM resource_meta
                 WHERE id = ?1;",
                [id],
                |row| {
                    Ok((
                        row.get::<_, ResourceId>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Value>(2)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(id, kind, parent)| ResourceMeta {
            id,
            kind,
            parent: decode_parent(id, parent),
        }))
    }

    fn get_attribute(&self, id: ResourceId, name: &str) -> RepoResult<Option<AttributeValue>> {
        let value = self
            .conn
            .query_row(
                "SELECT COALESCE(value_int, value_real, value_text) AS value
                 FROM resource_attribute
                 WHERE id = ?1 AND attribute = ?2
                 LIMIT 1;",
                params![id, name],
                |row| row.get::<_, Value>(0),
            )
            .optional()?
            .and_then(attribute_value_from_sql);

        Ok(match (value, self.lookup_mode) {
            (Some(value), LookupMode::Compat) if value.is_falsy() => None,
            (value, _) => value,
        })
    }

    fn get_attributes(&self, id: ResourceId) -> RepoResult<Attributes> {
        let mut stmt = self.conn.prepare(
            "SELECT attribute, COALESCE(value_int, value_real, value_text) AS value
             FROM resource_attribute
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut attributes = Attributes::new();

        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            if let Some(value) = attribute_value_from_sql(row.get(1)?) {
                attributes.insert(name, value);
            }
        }

        Ok(attributes)
    }

    fn set_meta(&self, id: ResourceId, kind: &str, parent: Option<ResourceId>) -> RepoResult<()> {
        self.conn.execute(
            "REPLACE INTO resource_meta (id, type, parent) VALUES (?1, ?2, ?3);",
            params![id, kind, parent],
        )?;
        Ok(())
    }

    fn set_attribute(&self, id: ResourceId, name: &str, value: Option<&str>) -> RepoResult<()> {
        let Some(raw) = value else {
            self.conn.execute(
                "DELETE FROM resource_attribute WHERE id = ?1 AND attribute = ?2;",
                params![id, name],
            )?;
            return Ok(());
        };

        let classified = classify_value(raw);
        let (value_int, value_real, value_text) = match &classified {
            AttributeValue::Int(value) => (Some(*value), None, None),
            AttributeValue::Real(value) => (None, Some(*value), None),
            AttributeValue::Text(value) => (None, None, Some(value.as_str())),
        };

        self.conn.execute(
            "REPLACE INTO resource_attribute (
                id,
                attribute,
                value_int,
                value_real,
                value_text
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![id, name, value_int, value_real, value_text],
        )?;

        debug!(
            "event=attribute_set module=repo status=ok id={} attribute={} column={}",
            id,
            name,
            classified.column()
        );
        Ok(())
    }

    fn clear_attributes(&self, id: ResourceId) -> RepoResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM resource_attribute WHERE id = ?1;", [id])?;
        debug!(
            "event=attributes_clear module=repo status=ok id={} removed={}",
            id, removed
        );
        Ok(())
    }
}

/// Maps the storage class of a coalesced value back to the typed enum.
///
/// `NULL` (a row with every value column empty) reads as absent.
fn attribute_value_from_sql(value: Value) -> Option<AttributeValue> {
    match value {
        Value::Null => None,
        Value::Integer(value) => Some(AttributeValue::Int(value)),
        Value::Real(value) => Some(AttributeValue::Real(value)),
        Value::Text(value) => Some(AttributeValue::Text(value)),
        Value::Blob(bytes) => Some(AttributeValue::Text(
            String::from_utf8_lossy(&bytes).into_owned(),
        )),
    }
}

/// Decodes `resource_meta.parent` into a usable id.
///
/// Integers, in-range integral reals and integral numeric text (`"7"`,
/// `"7.0"`) resolve; anything else is treated as "no parent".
fn decode_parent(id: ResourceId, parent: Value) -> Option<ResourceId> {
    let decoded = match &parent {
        Value::Null => return None,
        Value::Integer(value) => Some(*value),
        Value::Real(value) => integral_i64(*value),
        Value::Text(value) => value
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| parse_numeric(value).and_then(integral_i64)),
        Value::Blob(_) => None,
    };

    if decoded.is_none() {
        warn!(
            "event=parent_decode module=repo status=error id={} error_code=non_numeric_parent",
            id
        );
    }
    decoded
}

fn ensure_resource_connection_ready(conn: &Connection) -> RepoResult<()> {
    let required: [(&'static str, &[&'static str]); 2] = [
        (META_TABLE, &["id", "type", "parent"]),
        (
            ATTRIBUTE_TABLE,
            &["id", "attribute", "value_int", "value_real", "value_text"],
        ),
    ];

    for (table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for column in columns.iter().copied() {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
