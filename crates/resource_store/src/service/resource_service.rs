//! Resource use-case service.
//!
//! # Responsibility
//! - Walk parent chains by repeated one-level `get_parent` calls.
//! - Replace a resource's whole attribute set atomically.
//!
//! # Invariants
//! - Ancestor walks terminate: bounded by `max_depth` and stopped on cycles.
//! - `replace_attributes` either applies every entry or none.

use crate::db::with_transaction;
use crate::model::resource::{Resource, ResourceId};
use crate::repo::resource_repo::{
    RepoError, RepoResult, ResourceRepository, SqliteResourceRepository,
};
use log::warn;
use rusqlite::Connection;
use std::collections::HashSet;

/// Use-case wrapper over any `ResourceRepository`.
pub struct ResourceService<R: ResourceRepository> {
    repo: R,
}

impl<R: ResourceRepository> ResourceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Writes meta and attributes for one resource and reads it back.
    ///
    /// Not atomic on its own; run it on a transaction-backed repository when
    /// partial writes are unacceptable.
    pub fn put<K, V>(
        &self,
        id: ResourceId,
        kind: &str,
        parent: Option<ResourceId>,
        attributes: &[(K, Option<V>)],
    ) -> RepoResult<Option<Resource>>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.repo.set_meta(id, kind, parent)?;
        self.repo.set_attributes(id, Some(attributes))?;
        self.repo.get(id)
    }

    /// Resolves ancestors of `id`, nearest first.
    ///
    /// # Contract
    /// - Stops at the first unresolvable parent.
    /// - Returns at most `max_depth` resources.
    /// - Stops before revisiting an id (cyclic parent references), and
    ///   never includes `id` itself.
    pub fn ancestors(&self, id: ResourceId, max_depth: usize) -> RepoResult<Vec<Resource>> {
        let mut visited = HashSet::from([id]);
        let mut chain = Vec::new();
        let mut current = id;

        while chain.len() < max_depth {
            let Some(parent) = self.repo.get_parent(current)? else {
                break;
            };
            if !visited.insert(parent.id()) {
                warn!(
                    "event=ancestor_walk module=service status=error id={} error_code=parent_cycle at={}",
                    id,
                    parent.id()
                );
                break;
            }
            current = parent.id();
            chain.push(parent);
        }

        Ok(chain)
    }
}

/// Replaces the full attribute set of `id` in one transaction.
///
/// Existing attributes are removed first, then every entry is written in
/// order. Any failure rolls the whole replacement back.
pub fn replace_attributes<K, V>(
    conn: &mut Connection,
    id: ResourceId,
    attributes: &[(K, Option<V>)],
) -> RepoResult<()>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    with_transaction(conn, |tx| -> Result<(), RepoError> {
        let repo = SqliteResourceRepository::new(tx);
        repo.clear_attributes(id)?;
        repo.set_attributes(id, Some(attributes))
    })
}
