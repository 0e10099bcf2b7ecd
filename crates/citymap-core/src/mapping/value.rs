//! Value types shared by every mapping element.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MappingError;

/// Scalar column type of a simple attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleType {
    /// Character data.
    String,
    /// Whole number.
    Integer,
    /// Floating point number.
    Double,
    /// Boolean flag.
    Boolean,
    /// Calendar date.
    Date,
    /// Date and time.
    Timestamp,
    /// Large character object.
    Clob,
}

impl SimpleType {
    /// Name used in mapping documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimpleType::String => "string",
            SimpleType::Integer => "integer",
            SimpleType::Double => "double",
            SimpleType::Boolean => "boolean",
            SimpleType::Date => "date",
            SimpleType::Timestamp => "timestamp",
            SimpleType::Clob => "clob",
        }
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of geometry stored by a geometry property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeometryType {
    AbstractGeometry,
    Envelope,
    Point,
    MultiPoint,
    Curve,
    LineString,
    MultiCurve,
    Polygon,
    Surface,
    CompositeSurface,
    TriangulatedSurface,
    Tin,
    MultiSurface,
    Solid,
    CompositeSolid,
    MultiSolid,
    GeometricComplex,
}

impl GeometryType {
    /// Whether the geometry is a surface-based aggregate.
    ///
    /// Surface geometries are usually stored in a separate surface geometry
    /// table and referenced by a foreign key column.
    pub fn is_surface_based(&self) -> bool {
        matches!(
            self,
            GeometryType::Polygon
                | GeometryType::Surface
                | GeometryType::CompositeSurface
                | GeometryType::TriangulatedSurface
                | GeometryType::Tin
                | GeometryType::MultiSurface
                | GeometryType::Solid
                | GeometryType::CompositeSolid
                | GeometryType::MultiSolid
                | GeometryType::GeometricComplex
        )
    }
}

/// How a type-valued property relates to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    /// The target exists independently and is only referenced.
    #[default]
    Association,
    /// The target is part of the owner but may be shared.
    Aggregation,
    /// The target is exclusively owned by the owner.
    Composition,
}

/// Discriminator of every path element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathElementType {
    FeatureType,
    ObjectType,
    ComplexType,
    ComplexAttributeType,
    SimpleAttribute,
    ComplexAttribute,
    FeatureProperty,
    ObjectProperty,
    ComplexProperty,
    GeometryProperty,
    ImplicitGeometryProperty,
}

impl PathElementType {
    /// Human readable label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            PathElementType::FeatureType => "feature type",
            PathElementType::ObjectType => "object type",
            PathElementType::ComplexType => "complex type",
            PathElementType::ComplexAttributeType => "complex attribute type",
            PathElementType::SimpleAttribute => "simple attribute",
            PathElementType::ComplexAttribute => "complex attribute",
            PathElementType::FeatureProperty => "feature property",
            PathElementType::ObjectProperty => "object property",
            PathElementType::ComplexProperty => "complex property",
            PathElementType::GeometryProperty => "geometry property",
            PathElementType::ImplicitGeometryProperty => "implicit geometry property",
        }
    }

    /// Whether this element is a type rather than a property.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            PathElementType::FeatureType
                | PathElementType::ObjectType
                | PathElementType::ComplexType
                | PathElementType::ComplexAttributeType
        )
    }
}

impl fmt::Display for PathElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// CityGML version a namespace or injected property belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CityGMLContext {
    #[serde(rename = "citygml-1.0")]
    CityGML1,
    #[serde(rename = "citygml-2.0")]
    CityGML2,
}

impl CityGMLContext {
    /// Version string used in mapping documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            CityGMLContext::CityGML1 => "citygml-1.0",
            CityGMLContext::CityGML2 => "citygml-2.0",
        }
    }
}

impl fmt::Display for CityGMLContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A namespace URI tagged with the CityGML version it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    /// Namespace URI.
    pub uri: String,
    /// CityGML version of the namespace.
    pub context: CityGMLContext,
}

impl Namespace {
    /// Create a new namespace.
    pub fn new(uri: impl Into<String>, context: CityGMLContext) -> Self {
        Self {
            uri: uri.into(),
            context,
        }
    }
}

/// Column filter attached to a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Column the condition applies to.
    pub column: String,
    /// Literal value or reserved token.
    pub value: String,
    /// Type of the literal value.
    #[serde(rename = "type")]
    pub simple_type: SimpleType,
}

impl Condition {
    /// Create a new condition.
    pub fn new(column: impl Into<String>, value: impl Into<String>, simple_type: SimpleType) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
            simple_type,
        }
    }
}

/// Recursive self-join description for tables that store trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeHierarchy {
    /// Column referencing the parent row.
    pub parent_column: String,
    /// Column referencing the root row.
    pub root_column: String,
}

impl TreeHierarchy {
    /// Create a new tree hierarchy.
    pub fn new(parent_column: impl Into<String>, root_column: impl Into<String>) -> Self {
        Self {
            parent_column: parent_column.into(),
            root_column: root_column.into(),
        }
    }
}

/// Maximum length of the database prefix used for generated storage objects.
pub const MAX_DB_PREFIX_LENGTH: usize = 4;

/// Descriptive metadata of a schema mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Mapping name.
    pub name: String,
    /// Mapping version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Free text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Short prefix for storage objects created for this mapping.
    pub db_prefix: String,
}

impl Metadata {
    /// Create metadata with a name and database prefix.
    pub fn new(name: impl Into<String>, db_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            description: None,
            db_prefix: db_prefix.into(),
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check name and database prefix.
    pub fn validate(&self) -> Result<(), MappingError> {
        if self.name.trim().is_empty() {
            return Err(MappingError::missing("metadata", "name"));
        }
        if self.db_prefix.is_empty() {
            return Err(MappingError::missing("metadata", "dbPrefix"));
        }
        if self.db_prefix.len() > MAX_DB_PREFIX_LENGTH
            || !self.db_prefix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(MappingError::invariant(
                "metadata",
                format!(
                    "dbPrefix '{}' must be at most {} alphanumeric characters",
                    self.db_prefix, MAX_DB_PREFIX_LENGTH
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_validation() {
        assert!(Metadata::new("CityGML", "cdb").validate().is_ok());
        assert!(Metadata::new("", "cdb").validate().is_err());
        assert!(Metadata::new("CityGML", "").validate().is_err());
        assert!(Metadata::new("CityGML", "toolong").validate().is_err());
        assert!(Metadata::new("CityGML", "a_b").validate().is_err());
    }

    #[test]
    fn test_context_serde_names() {
        let json = serde_json::to_string(&CityGMLContext::CityGML2).unwrap();
        assert_eq!(json, "\"citygml-2.0\"");
        let parsed: CityGMLContext = serde_json::from_str("\"citygml-1.0\"").unwrap();
        assert_eq!(parsed, CityGMLContext::CityGML1);
    }

    #[test]
    fn test_surface_based_geometries() {
        assert!(GeometryType::MultiSurface.is_surface_based());
        assert!(GeometryType::Solid.is_surface_based());
        assert!(!GeometryType::Point.is_surface_based());
        assert!(!GeometryType::MultiCurve.is_surface_based());
    }

    #[test]
    fn test_default_relation_type() {
        assert_eq!(RelationType::default(), RelationType::Association);
    }
}
