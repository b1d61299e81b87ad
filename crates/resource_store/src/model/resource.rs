//! Resource meta rows and resolved resources.
//!
//! # Invariants
//! - `parent` is a loose reference; nothing enforces that it resolves.
//! - `Resource` is always a meta row plus the full attribute map at read time.

use super::value::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Externally assigned resource identifier (`resource_meta.id`).
pub type ResourceId = i64;

/// Attribute name to coalesced value. Names are unique per resource.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// One `resource_meta` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMeta {
    pub id: ResourceId,
    /// Free-form category. Serialized as `type` to match the column name.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub parent: Option<ResourceId>,
}

impl ResourceMeta {
    pub fn new(id: ResourceId, kind: impl Into<String>, parent: Option<ResourceId>) -> Self {
        Self {
            id,
            kind: Some(kind.into()),
            parent,
        }
    }
}

/// A meta row with its attributes attached, as returned by `get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(flatten)]
    pub meta: ResourceMeta,
    pub attributes: Attributes,
}

impl Resource {
    pub fn id(&self) -> ResourceId {
        self.meta.id
    }

    pub fn kind(&self) -> Option<&str> {
        self.meta.kind.as_deref()
    }

    pub fn parent(&self) -> Option<ResourceId> {
        self.meta.parent
    }

    /// Looks up one attribute without the falsy-as-absent conflation.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}
