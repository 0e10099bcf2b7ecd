//! Complex attribute types.

use super::property::Property;
use super::reference::{Ref, SchemaHandle};

/// A reusable container of attribute properties.
///
/// Global attribute types carry an id and a schema and are registered in the
/// mapping; inline ones are declared inside a complex attribute and carry
/// neither id nor table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexAttributeType {
    /// Id of a global attribute type.
    pub id: Option<String>,
    /// Table of a global attribute type.
    pub table: Option<String>,
    /// Schema of the attribute type.
    pub schema: Option<Ref<SchemaHandle>>,
    /// Simple or complex attributes.
    pub attributes: Vec<Property>,
}

impl ComplexAttributeType {
    /// Create a global attribute type.
    pub fn global(id: impl Into<String>, schema: impl Into<Ref<SchemaHandle>>) -> Self {
        Self {
            id: Some(id.into()),
            table: None,
            schema: Some(schema.into()),
            attributes: Vec::new(),
        }
    }

    /// Create an attribute type for inline use.
    pub fn inline() -> Self {
        Self {
            id: None,
            table: None,
            schema: None,
            attributes: Vec::new(),
        }
    }

    /// Set the table.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, attribute: Property) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Label used in error messages.
    pub fn describe(&self) -> String {
        match &self.id {
            Some(id) => format!("complex attribute type '{}'", id),
            None => "inline complex attribute type".to_string(),
        }
    }
}
