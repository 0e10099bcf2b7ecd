//! Application schemas.

use serde::{Deserialize, Serialize};

use super::reference::{TypeHandle, TypeKind};
use super::value::{CityGMLContext, Namespace};
use crate::error::MappingError;

/// An application schema: a namespace-tagged unit declaring types and properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Unique schema id.
    pub id: String,
    /// Namespaces of the schema, one per supported CityGML version.
    pub namespaces: Vec<Namespace>,
    /// Explicit XML prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_prefix: Option<String>,
    /// Default queryability of the schema's elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queryable: Option<bool>,
    #[serde(skip)]
    members: SchemaMembers,
}

// Derived members are not part of a schema's identity.
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.namespaces == other.namespaces
            && self.xml_prefix == other.xml_prefix
            && self.queryable == other.queryable
    }
}

impl Eq for Schema {}

/// Types declared in a schema, populated during validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaMembers {
    /// Registered feature types.
    pub feature_types: Vec<TypeHandle>,
    /// Registered object types.
    pub object_types: Vec<TypeHandle>,
    /// Registered global complex types.
    pub complex_types: Vec<TypeHandle>,
}

impl Schema {
    /// Create a schema with a single namespace.
    pub fn new(id: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            id: id.into(),
            namespaces: vec![namespace],
            xml_prefix: None,
            queryable: None,
            members: SchemaMembers::default(),
        }
    }

    /// Add another namespace.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    /// Set an explicit XML prefix.
    pub fn with_xml_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.xml_prefix = Some(prefix.into());
        self
    }

    /// Set the default queryability.
    pub fn with_queryable(mut self, queryable: bool) -> Self {
        self.queryable = Some(queryable);
        self
    }

    /// The explicit XML prefix or one generated from the schema id.
    pub fn xml_prefix(&self) -> String {
        match &self.xml_prefix {
            Some(prefix) => prefix.clone(),
            None => generated_prefix(&self.id),
        }
    }

    /// Whether the XML prefix is generated rather than declared.
    pub fn has_generated_prefix(&self) -> bool {
        self.xml_prefix.is_none()
    }

    /// Whether one of the namespaces has the given URI.
    pub fn matches_namespace_uri(&self, uri: &str) -> bool {
        self.namespaces.iter().any(|ns| ns.uri == uri)
    }

    /// The namespace for a CityGML version.
    pub fn namespace(&self, context: CityGMLContext) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.context == context)
    }

    /// Whether the schema offers a namespace for the CityGML version.
    pub fn has_context(&self, context: CityGMLContext) -> bool {
        self.namespace(context).is_some()
    }

    /// Types declared in this schema.
    pub fn members(&self) -> &SchemaMembers {
        &self.members
    }

    pub(crate) fn clear_members(&mut self) {
        self.members = SchemaMembers::default();
    }

    pub(crate) fn register_member(&mut self, handle: TypeHandle) {
        let list = match handle.kind() {
            TypeKind::Feature => &mut self.members.feature_types,
            TypeKind::Object => &mut self.members.object_types,
            TypeKind::Complex => &mut self.members.complex_types,
        };
        if !list.contains(&handle) {
            list.push(handle);
        }
    }

    /// Check id and namespaces.
    pub fn validate(&self) -> Result<(), MappingError> {
        let element = format!("schema '{}'", self.id);
        if self.id.is_empty() {
            return Err(MappingError::missing("schema", "id"));
        }
        if self.namespaces.is_empty() {
            return Err(MappingError::missing(element, "namespace"));
        }
        for (i, ns) in self.namespaces.iter().enumerate() {
            if ns.uri.is_empty() {
                return Err(MappingError::missing(element, "namespace uri"));
            }
            if self.namespaces[..i].iter().any(|other| other.context == ns.context) {
                return Err(MappingError::invariant(
                    element,
                    format!("more than one namespace for {}", ns.context),
                ));
            }
        }
        Ok(())
    }
}

/// Derive an XML prefix from a schema id.
///
/// Keeps ASCII alphanumerics, lowercased. Falls back to `ns` when nothing is
/// left and prepends `ns` when the result starts with a digit.
fn generated_prefix(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    match cleaned.chars().next() {
        None => "ns".to_string(),
        Some(c) if c.is_ascii_digit() => format!("ns{}", cleaned),
        Some(_) => cleaned,
    }
}
