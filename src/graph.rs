// Copyright (c) 2025 - Cowboy AI, Inc.

//! Declarative Resource Graph
//!
//! The output of stack composition: an ordered list of resource *intents*
//! with their properties and dependency edges. Nothing here talks to a
//! cloud API; the graph is handed to an external realization engine.
//!
//! # Ordering
//!
//! ```text
//! declare(A) ──> declare(B, props referencing A) ──> declare(C, ...)
//!     │                    │
//!     └── must exist ──────┘  (GraphError::UnknownDependency otherwise)
//! ```
//!
//! Every dependency of a resource is declared before the resource itself, so
//! the declaration order is always a valid topological order for
//! realization. Late-bound values (ARNs, DNS names, generated ids) are
//! expressed as [`AttrRef`]s; a property holding an `AttrRef` implies a
//! dependency edge on the referenced resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::domain::ResourceKind;

/// Graph construction errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A resource with this id was already declared
    #[error("Resource {0} declared twice")]
    Duplicate(ResourceId),

    /// A resource references something not declared yet
    #[error("Resource {resource} depends on undeclared resource {dependency}")]
    UnknownDependency {
        resource: ResourceId,
        dependency: ResourceId,
    },

    /// Properties could not be serialized
    #[error("Failed to serialize properties of {resource}: {message}")]
    Serialization {
        resource: ResourceId,
        message: String,
    },
}

/// Logical, path-like identifier of a declared resource (`AppVpc/Vpc`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Scope a child id under this one
    pub fn child(&self, name: impl AsRef<str>) -> Self {
        Self(format!("{}/{}", self.0, name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attribute of a realized resource, known only after realization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Id,
    Arn,
    DnsName,
}

/// Late-bound reference to an attribute of another declared resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttrRef {
    #[serde(rename = "ref")]
    pub resource: ResourceId,
    #[serde(rename = "attr")]
    pub attribute: Attribute,
}

impl AttrRef {
    pub fn new(resource: &ResourceId, attribute: Attribute) -> Self {
        Self {
            resource: resource.clone(),
            attribute,
        }
    }

    pub fn id(resource: &ResourceId) -> Self {
        Self::new(resource, Attribute::Id)
    }

    pub fn arn(resource: &ResourceId) -> Self {
        Self::new(resource, Attribute::Arn)
    }

    pub fn dns_name(resource: &ResourceId) -> Self {
        Self::new(resource, Attribute::DnsName)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One declared resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    /// Pre-existing resource looked up, never created
    #[serde(default, skip_serializing_if = "is_false")]
    pub imported: bool,
    pub properties: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<ResourceId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Resource {
    /// Typed view of the properties
    pub fn properties_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.properties.clone())
    }
}

/// Collect every resource an `AttrRef` inside `value` points at
fn collect_refs(value: &Value, out: &mut Vec<ResourceId>) {
    match value {
        Value::Object(map) => {
            if let Ok(attr) = serde_json::from_value::<AttrRef>(value.clone()) {
                if !out.contains(&attr.resource) {
                    out.push(attr.resource);
                }
                return;
            }
            for v in map.values() {
                collect_refs(v, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect_refs(v, out);
            }
        }
        _ => {}
    }
}

/// Ordered, dependency-checked set of resource declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGraph {
    resources: Vec<Resource>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a resource to be created
    ///
    /// Dependencies are inferred from `AttrRef`s inside `properties`.
    pub fn declare<P: Serialize>(
        &mut self,
        id: ResourceId,
        kind: ResourceKind,
        properties: &P,
    ) -> Result<ResourceId, GraphError> {
        self.insert(id, kind, properties, &[], false)
    }

    /// Declare a resource with extra ordering edges not visible in its properties
    pub fn declare_after<P: Serialize>(
        &mut self,
        id: ResourceId,
        kind: ResourceKind,
        properties: &P,
        after: &[&ResourceId],
    ) -> Result<ResourceId, GraphError> {
        self.insert(id, kind, properties, after, false)
    }

    /// Record a pre-existing resource that is looked up rather than created
    pub fn import<P: Serialize>(
        &mut self,
        id: ResourceId,
        kind: ResourceKind,
        properties: &P,
    ) -> Result<ResourceId, GraphError> {
        self.insert(id, kind, properties, &[], true)
    }

    fn insert<P: Serialize>(
        &mut self,
        id: ResourceId,
        kind: ResourceKind,
        properties: &P,
        after: &[&ResourceId],
        imported: bool,
    ) -> Result<ResourceId, GraphError> {
        if self.contains(&id) {
            return Err(GraphError::Duplicate(id));
        }

        let properties =
            serde_json::to_value(properties).map_err(|e| GraphError::Serialization {
                resource: id.clone(),
                message: e.to_string(),
            })?;

        let mut depends_on = Vec::new();
        collect_refs(&properties, &mut depends_on);
        for extra in after {
            if !depends_on.contains(extra) {
                depends_on.push((*extra).clone());
            }
        }

        if let Some(missing) = depends_on.iter().find(|dep| !self.contains(dep)) {
            return Err(GraphError::UnknownDependency {
                resource: id,
                dependency: missing.clone(),
            });
        }

        debug!(resource = %id, %kind, deps = depends_on.len(), "declared resource");

        self.resources.push(Resource {
            id: id.clone(),
            kind,
            imported,
            properties,
            depends_on,
            tags: BTreeMap::new(),
        });
        Ok(id)
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.resources.iter().any(|r| &r.id == id)
    }

    pub fn get(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| &r.id == id)
    }

    /// Declaration index of a resource
    pub fn position(&self, id: &ResourceId) -> Option<usize> {
        self.resources.iter().position(|r| &r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Tag every resource the stack creates; imported resources are left alone
    pub fn apply_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        for resource in self.resources.iter_mut().filter(|r| !r.imported) {
            resource.tags.insert(key.clone(), value.clone());
        }
    }

    /// Check that every dependency precedes its dependent
    ///
    /// Always holds for graphs built through `declare`; useful for graphs
    /// deserialized from elsewhere.
    pub fn verify_order(&self) -> Result<(), GraphError> {
        for (index, resource) in self.resources.iter().enumerate() {
            for dep in &resource.depends_on {
                match self.position(dep) {
                    Some(dep_index) if dep_index < index => {}
                    _ => {
                        return Err(GraphError::UnknownDependency {
                            resource: resource.id.clone(),
                            dependency: dep.clone(),
                        })
                    }
                }
            }
        }
        Ok(())
    }
}
