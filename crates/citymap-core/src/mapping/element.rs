//! Path element identity shared by every type and property.

use super::reference::{Ref, SchemaHandle};

/// Marker prefix of XML attribute paths.
pub const ATTRIBUTE_MARKER: char = '@';

/// Path of a scalar leaf that takes the name of its enclosing attribute.
pub const SELF_PATH: &str = ".";

/// Name and owning schema of a mapping element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathElement {
    /// Element path, e.g. `Building`, `lod2Solid` or `@class`.
    pub path: String,
    /// Schema the element is declared in.
    pub schema: Ref<SchemaHandle>,
    /// Explicit queryability; unset falls back to the schema default.
    pub queryable: Option<bool>,
}

impl PathElement {
    /// Create a path element in the given schema.
    pub fn new(path: impl Into<String>, schema: impl Into<Ref<SchemaHandle>>) -> Self {
        Self {
            path: path.into(),
            schema: schema.into(),
            queryable: None,
        }
    }

    /// Set explicit queryability.
    pub fn with_queryable(mut self, queryable: bool) -> Self {
        self.queryable = Some(queryable);
        self
    }

    /// Local name with the attribute marker stripped.
    pub fn name(&self) -> &str {
        strip_attribute_marker(&self.path)
    }

    /// Whether the path denotes an XML attribute.
    pub fn is_attribute(&self) -> bool {
        self.path.starts_with(ATTRIBUTE_MARKER)
    }

    /// Whether the element is queryable, ignoring schema defaults.
    pub fn is_queryable(&self) -> bool {
        self.queryable.unwrap_or(true)
    }

    /// Whether queryability was set explicitly.
    pub fn is_set_queryable(&self) -> bool {
        self.queryable.is_some()
    }

    /// Compare the local part of a qualified name against the path.
    pub fn matches_local_name(&self, local_name: &str) -> bool {
        self.name() == strip_attribute_marker(local_name)
    }
}

/// Strip a leading attribute marker from a path.
pub fn strip_attribute_marker(path: &str) -> &str {
    path.strip_prefix(ATTRIBUTE_MARKER).unwrap_or(path)
}
