//! Resource coordinates identifying one object on a remote cluster

use serde::{Deserialize, Serialize};

/// Identity of a single object on a remote cluster.
///
/// A coordinate is immutable once constructed: fields are private and there
/// are no setters. Every operation takes a coordinate by reference; callers
/// that need a different target construct a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceCoordinate {
    group: String,
    version: String,
    kind: String,
    namespace: Option<String>,
    name: String,
}

impl ResourceCoordinate {
    /// Coordinate of a namespaced object
    pub fn namespaced(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Coordinate of a cluster-scoped object
    pub fn cluster_scoped(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            namespace: None,
            name: name.into(),
        }
    }

    /// API group ("" for the core group)
    pub fn group(&self) -> &str {
        &self.group
    }

    /// API version within the group
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Resource kind
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Namespace; `None` for cluster-scoped kinds
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Object name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the `apiVersion` field value for this coordinate
    ///
    /// - group "apps", version "v1" -> "apps/v1"
    /// - core group (""), version "v1" -> "v1"
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl std::fmt::Display for ResourceCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", ns, self.kind, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}
