//! Record-kind introspection: the relation fields each record kind declares.
//!
//! The planner only needs to know, per record kind, which other record kinds it
//! points at and whether each pointer is optional. [`RecordCatalog`] is the
//! in-memory source loaded from a manifest; [`CachedRelations`] wraps any source
//! with a shared, rebuildable cache.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// One relation field declared on a record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationField {
    pub field_name: String,
    /// Record kind the field points at.
    pub target_record_kind: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub has_default: bool,
}

impl RelationField {
    pub fn new(field_name: impl Into<String>, target_record_kind: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            target_record_kind: target_record_kind.into(),
            nullable: false,
            has_default: false,
        }
    }

    /// Mark the field as nullable with a default value.
    #[must_use]
    pub fn optional_with_default(mut self) -> Self {
        self.nullable = true;
        self.has_default = true;
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// A nullable field with a default never forces creation order.
    pub fn is_optional_with_default(&self) -> bool {
        self.nullable && self.has_default
    }
}

/// Errors from relation metadata lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntrospectionError {
    #[error("unknown record kind `{0}`")]
    UnknownRecordKind(String),
    #[error("relation `{record_kind}.{field_name}` has no target record kind")]
    MalformedRelation {
        record_kind: String,
        field_name: String,
    },
    #[error("relation metadata unavailable: {0}")]
    Unavailable(String),
}

/// Source of relation metadata per record kind.
pub trait RelationSource: Send + Sync {
    fn relations_of(&self, record_kind: &str) -> Result<Vec<RelationField>, IntrospectionError>;
}

impl<S: RelationSource + ?Sized> RelationSource for Arc<S> {
    fn relations_of(&self, record_kind: &str) -> Result<Vec<RelationField>, IntrospectionError> {
        (**self).relations_of(record_kind)
    }
}

/// Owning domain of a record kind: the text before the first `.`.
///
/// `auth.user` belongs to `auth`; a bare `user` has no domain.
pub fn owning_domain(record_kind: &str) -> Option<&str> {
    record_kind
        .split_once('.')
        .map(|(domain, _)| domain)
        .filter(|d| !d.is_empty())
}

/// In-memory relation metadata keyed by record kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordCatalog {
    kinds: BTreeMap<String, Vec<RelationField>>,
}

impl RecordCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record kind with no relations.
    #[must_use]
    pub fn with_kind(mut self, record_kind: impl Into<String>) -> Self {
        self.kinds.entry(record_kind.into()).or_default();
        self
    }

    /// Register a relation on `record_kind`, creating the kind if needed.
    #[must_use]
    pub fn with_relation(mut self, record_kind: impl Into<String>, field: RelationField) -> Self {
        self.insert_relation(record_kind, field);
        self
    }

    pub fn insert_relation(&mut self, record_kind: impl Into<String>, field: RelationField) {
        self.kinds.entry(record_kind.into()).or_default().push(field);
    }

    pub fn contains(&self, record_kind: &str) -> bool {
        self.kinds.contains_key(record_kind)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }
}

impl From<BTreeMap<String, Vec<RelationField>>> for RecordCatalog {
    fn from(kinds: BTreeMap<String, Vec<RelationField>>) -> Self {
        Self { kinds }
    }
}

impl RelationSource for RecordCatalog {
    fn relations_of(&self, record_kind: &str) -> Result<Vec<RelationField>, IntrospectionError> {
        let fields = self
            .kinds
            .get(record_kind)
            .ok_or_else(|| IntrospectionError::UnknownRecordKind(record_kind.to_string()))?;

        if let Some(bad) = fields
            .iter()
            .find(|f| f.target_record_kind.trim().is_empty())
        {
            return Err(IntrospectionError::MalformedRelation {
                record_kind: record_kind.to_string(),
                field_name: bad.field_name.clone(),
            });
        }

        Ok(fields.clone())
    }
}

/// Caches relation metadata per record kind in front of another source.
///
/// Safe to share across concurrent planning calls. Failed lookups are not
/// cached, so a transient error is retried on the next plan.
pub struct CachedRelations<S> {
    inner: S,
    cache: RwLock<HashMap<String, Arc<[RelationField]>>>,
}

impl<S: RelationSource> CachedRelations<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every cached entry; the next lookup per kind hits the inner source.
    pub fn invalidate(&self) {
        self.cache.write().clear();
    }

    /// Number of record kinds currently cached.
    pub fn cached_kinds(&self) -> usize {
        self.cache.read().len()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: RelationSource> RelationSource for CachedRelations<S> {
    fn relations_of(&self, record_kind: &str) -> Result<Vec<RelationField>, IntrospectionError> {
        if let Some(hit) = self.cache.read().get(record_kind) {
            return Ok(hit.to_vec());
        }

        let fields: Arc<[RelationField]> = self.inner.relations_of(record_kind)?.into();
        self.cache
            .write()
            .entry(record_kind.to_string())
            .or_insert_with(|| Arc::clone(&fields));
        Ok(fields.to_vec())
    }
}
