use std::fmt;

/// Identifies a namespaced resource.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ResourceId {
    pub namespace: String,
    pub name: String,
}

/// Correlates a `PolicyEndpoint` with the node-local programs that enforce it.
///
/// Formatted as `<namespace>/<name>`. Kubernetes forbids `/` in both namespace and object names,
/// so distinct resources never share an identifier.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct PolicyId(String);

// === impl ResourceId ===

impl ResourceId {
    pub fn new(namespace: impl ToString, name: impl ToString) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// === impl PolicyId ===

impl PolicyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ResourceId> for PolicyId {
    fn from(id: &ResourceId) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
