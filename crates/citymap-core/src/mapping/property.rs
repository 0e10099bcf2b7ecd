//! Property definitions.
//!
//! A [`Property`] carries the data every property shares (path, schema,
//! cardinality, join); the storage binding lives in the closed
//! [`PropertyKind`] union.

use super::attribute::ComplexAttributeType;
use super::element::{PathElement, SELF_PATH};
use super::join::AbstractJoin;
use super::reference::{AttributeTypeHandle, Ref, SchemaHandle, TypeHandle, TypeKind};
use super::types::ComplexType;
use super::value::{GeometryType, PathElementType, RelationType, SimpleType};
use crate::error::MappingError;

/// Allowed level of detail range.
pub const MIN_LOD: u8 = 0;
/// Allowed level of detail range.
pub const MAX_LOD: u8 = 4;
/// Default coordinate dimension of geometry columns.
pub const DEFAULT_SRS_DIMENSION: u8 = 3;

/// A property of a type, attribute type or property injection.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Path and owning schema.
    pub element: PathElement,
    /// Lower bound; unset means 0.
    pub min_occurs: Option<u32>,
    /// Upper bound; unset means unbounded.
    pub max_occurs: Option<u32>,
    /// How the property's storage is reached from the owner's table.
    pub join: Option<AbstractJoin>,
    /// Storage binding.
    pub kind: PropertyKind,
}

/// Storage binding of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    SimpleAttribute(SimpleAttribute),
    ComplexAttribute(ComplexAttribute),
    ObjectProperty(TypeReference),
    FeatureProperty(TypeReference),
    ComplexProperty(ComplexProperty),
    GeometryProperty(GeometryProperty),
    ImplicitGeometryProperty(ImplicitGeometryProperty),
}

/// Scalar value stored in a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleAttribute {
    /// Column holding the value.
    pub column: String,
    /// Scalar type of the column.
    pub simple_type: SimpleType,
    /// Logical name replacing the path, set for `.` leaves of inline attribute types.
    pub name: Option<String>,
}

/// Structured value described by a complex attribute type.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexAttribute {
    /// Reference to a global attribute type.
    pub type_ref: Option<Ref<AttributeTypeHandle>>,
    /// Attribute type declared in place.
    pub inline_type: Option<Box<ComplexAttributeType>>,
}

/// Reference from an object or feature property to its target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    /// Target type.
    pub target: Ref<TypeHandle>,
    /// Relation between owner and target.
    pub relation_type: RelationType,
}

/// Property whose value is a complex type, referenced or declared inline.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexProperty {
    /// Reference to a global complex type.
    pub type_ref: Option<Ref<TypeHandle>>,
    /// Complex type declared in place.
    pub inline_type: Option<Box<ComplexType>>,
    relation_type: RelationType,
}

/// Geometry stored either inline in a column or referenced by a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryProperty {
    /// Kind of geometry.
    pub geometry_type: GeometryType,
    /// Column referencing a row of a geometry table.
    pub ref_column: Option<String>,
    /// Column holding the geometry value.
    pub inline_column: Option<String>,
    srs_dimension: Option<u8>,
    lod: Option<u8>,
}

/// Reference to a shared implicit geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitGeometryProperty {
    lod: u8,
}

impl Property {
    /// Create a property with an explicit kind.
    pub fn new(path: impl Into<String>, schema: impl Into<Ref<SchemaHandle>>, kind: PropertyKind) -> Self {
        Self {
            element: PathElement::new(path, schema),
            min_occurs: None,
            max_occurs: None,
            join: None,
            kind,
        }
    }

    /// Create a simple attribute.
    pub fn simple_attribute(
        path: impl Into<String>,
        schema: impl Into<Ref<SchemaHandle>>,
        column: impl Into<String>,
        simple_type: SimpleType,
    ) -> Self {
        Self::new(
            path,
            schema,
            PropertyKind::SimpleAttribute(SimpleAttribute {
                column: column.into(),
                simple_type,
                name: None,
            }),
        )
    }

    /// Create a complex attribute referencing a global attribute type.
    pub fn complex_attribute(
        path: impl Into<String>,
        schema: impl Into<Ref<SchemaHandle>>,
        attribute_type: impl Into<Ref<AttributeTypeHandle>>,
    ) -> Self {
        Self::new(
            path,
            schema,
            PropertyKind::ComplexAttribute(ComplexAttribute {
                type_ref: Some(attribute_type.into()),
                inline_type: None,
            }),
        )
    }

    /// Create a complex attribute with an inline attribute type.
    pub fn inline_complex_attribute(
        path: impl Into<String>,
        schema: impl Into<Ref<SchemaHandle>>,
        attribute_type: ComplexAttributeType,
    ) -> Self {
        Self::new(
            path,
            schema,
            PropertyKind::ComplexAttribute(ComplexAttribute {
                type_ref: None,
                inline_type: Some(Box::new(attribute_type)),
            }),
        )
    }

    /// Create an object property.
    pub fn object(
        path: impl Into<String>,
        schema: impl Into<Ref<SchemaHandle>>,
        target: impl Into<Ref<TypeHandle>>,
        relation_type: RelationType,
    ) -> Self {
        Self::new(
            path,
            schema,
            PropertyKind::ObjectProperty(TypeReference {
                target: target.into(),
                relation_type,
            }),
        )
    }

    /// Create a feature property.
    pub fn feature(
        path: impl Into<String>,
        schema: impl Into<Ref<SchemaHandle>>,
        target: impl Into<Ref<TypeHandle>>,
        relation_type: RelationType,
    ) -> Self {
        Self::new(
            path,
            schema,
            PropertyKind::FeatureProperty(TypeReference {
                target: target.into(),
                relation_type,
            }),
        )
    }

    /// Create a complex property referencing a global complex type.
    pub fn complex(
        path: impl Into<String>,
        schema: impl Into<Ref<SchemaHandle>>,
        complex_type: impl Into<Ref<TypeHandle>>,
        relation_type: RelationType,
    ) -> Self {
        Self::new(
            path,
            schema,
            PropertyKind::ComplexProperty(ComplexProperty::referenced(complex_type, relation_type)),
        )
    }

    /// Create a complex property with an inline complex type.
    pub fn inline_complex(
        path: impl Into<String>,
        schema: impl Into<Ref<SchemaHandle>>,
        complex_type: ComplexType,
    ) -> Self {
        Self::new(
            path,
            schema,
            PropertyKind::ComplexProperty(ComplexProperty::inline(complex_type)),
        )
    }

    /// Create a geometry property.
    pub fn geometry(
        path: impl Into<String>,
        schema: impl Into<Ref<SchemaHandle>>,
        geometry: GeometryProperty,
    ) -> Self {
        Self::new(path, schema, PropertyKind::GeometryProperty(geometry))
    }

    /// Create an implicit geometry property.
    pub fn implicit_geometry(
        path: impl Into<String>,
        schema: impl Into<Ref<SchemaHandle>>,
        lod: u8,
    ) -> Result<Self, MappingError> {
        Ok(Self::new(
            path,
            schema,
            PropertyKind::ImplicitGeometryProperty(ImplicitGeometryProperty::new(lod)?),
        ))
    }

    /// Set the lower bound.
    pub fn with_min_occurs(mut self, min_occurs: u32) -> Self {
        self.min_occurs = Some(min_occurs);
        self
    }

    /// Set the upper bound.
    pub fn with_max_occurs(mut self, max_occurs: u32) -> Self {
        self.max_occurs = Some(max_occurs);
        self
    }

    /// Set the join.
    pub fn with_join(mut self, join: impl Into<AbstractJoin>) -> Self {
        self.join = Some(join.into());
        self
    }

    /// Set explicit queryability.
    pub fn with_queryable(mut self, queryable: bool) -> Self {
        self.element.queryable = Some(queryable);
        self
    }

    /// The property path.
    pub fn path(&self) -> &str {
        &self.element.path
    }

    /// Logical name: the path without attribute marker, or an assigned name.
    pub fn name(&self) -> &str {
        match &self.kind {
            PropertyKind::SimpleAttribute(SimpleAttribute { name: Some(name), .. }) => name,
            _ => self.element.name(),
        }
    }

    /// Name of an attribute of this property's attribute type.
    ///
    /// Leaves with the reserved path `.` are named after this property.
    pub fn attribute_name<'a>(&'a self, attribute: &'a Property) -> &'a str {
        if attribute.path() == SELF_PATH {
            self.name()
        } else {
            attribute.name()
        }
    }

    /// Whether a lower bound is set.
    pub fn is_set_min_occurs(&self) -> bool {
        self.min_occurs.is_some()
    }

    /// Lower bound, 0 when unset.
    pub fn min_occurs(&self) -> u32 {
        self.min_occurs.unwrap_or(0)
    }

    /// Whether an upper bound is set.
    pub fn is_set_max_occurs(&self) -> bool {
        self.max_occurs.is_some()
    }

    /// Upper bound, `None` for unbounded.
    pub fn max_occurs(&self) -> Option<u32> {
        self.max_occurs
    }

    /// Element discriminator.
    pub fn element_type(&self) -> PathElementType {
        match &self.kind {
            PropertyKind::SimpleAttribute(_) => PathElementType::SimpleAttribute,
            PropertyKind::ComplexAttribute(_) => PathElementType::ComplexAttribute,
            PropertyKind::ObjectProperty(_) => PathElementType::ObjectProperty,
            PropertyKind::FeatureProperty(_) => PathElementType::FeatureProperty,
            PropertyKind::ComplexProperty(_) => PathElementType::ComplexProperty,
            PropertyKind::GeometryProperty(_) => PathElementType::GeometryProperty,
            PropertyKind::ImplicitGeometryProperty(_) => PathElementType::ImplicitGeometryProperty,
        }
    }

    /// Kind of the target type for type-valued properties.
    pub fn target_kind(&self) -> Option<TypeKind> {
        match &self.kind {
            PropertyKind::ObjectProperty(_) => Some(TypeKind::Object),
            PropertyKind::FeatureProperty(_) => Some(TypeKind::Feature),
            PropertyKind::ComplexProperty(_) => Some(TypeKind::Complex),
            _ => None,
        }
    }

    /// Referenced target type, if the property references a global type.
    pub fn target(&self) -> Option<&Ref<TypeHandle>> {
        match &self.kind {
            PropertyKind::ObjectProperty(reference) | PropertyKind::FeatureProperty(reference) => {
                Some(&reference.target)
            }
            PropertyKind::ComplexProperty(complex) => complex.type_ref.as_ref(),
            _ => None,
        }
    }

    /// Relation to the target for type-valued properties.
    pub fn relation_type(&self) -> Option<RelationType> {
        match &self.kind {
            PropertyKind::ObjectProperty(reference) | PropertyKind::FeatureProperty(reference) => {
                Some(reference.relation_type)
            }
            PropertyKind::ComplexProperty(complex) => Some(complex.relation_type()),
            _ => None,
        }
    }

    /// Whether the property may appear in a complex attribute type.
    pub fn is_attribute(&self) -> bool {
        matches!(
            self.kind,
            PropertyKind::SimpleAttribute(_) | PropertyKind::ComplexAttribute(_)
        )
    }

    /// Label used in error messages.
    pub fn describe(&self) -> String {
        format!("{} '{}'", self.element_type(), self.element.path)
    }
}

impl ComplexProperty {
    /// Reference a global complex type.
    pub fn referenced(complex_type: impl Into<Ref<TypeHandle>>, relation_type: RelationType) -> Self {
        Self {
            type_ref: Some(complex_type.into()),
            inline_type: None,
            relation_type,
        }
    }

    /// Declare the complex type in place.
    pub fn inline(complex_type: ComplexType) -> Self {
        Self {
            type_ref: None,
            inline_type: Some(Box::new(complex_type)),
            relation_type: RelationType::Composition,
        }
    }

    /// Whether the value is declared inline.
    pub fn is_inline(&self) -> bool {
        self.inline_type.is_some()
    }

    /// Relation to the value; inline values are always compositions.
    pub fn relation_type(&self) -> RelationType {
        if self.is_inline() {
            RelationType::Composition
        } else {
            self.relation_type
        }
    }

    /// Set the relation type; ignored for inline values.
    pub fn set_relation_type(&mut self, relation_type: RelationType) {
        self.relation_type = if self.is_inline() {
            RelationType::Composition
        } else {
            relation_type
        };
    }
}

impl GeometryProperty {
    /// Create a geometry binding without columns.
    pub fn new(geometry_type: GeometryType) -> Self {
        Self {
            geometry_type,
            ref_column: None,
            inline_column: None,
            srs_dimension: None,
            lod: None,
        }
    }

    /// Store the geometry by reference in `column`.
    pub fn with_ref_column(mut self, column: impl Into<String>) -> Self {
        self.ref_column = Some(column.into());
        self
    }

    /// Store the geometry value in `column`.
    pub fn with_inline_column(mut self, column: impl Into<String>) -> Self {
        self.inline_column = Some(column.into());
        self
    }

    /// Set the coordinate dimension.
    pub fn with_srs_dimension(mut self, srs_dimension: u8) -> Result<Self, MappingError> {
        self.set_srs_dimension(srs_dimension)?;
        Ok(self)
    }

    /// Set the level of detail.
    pub fn with_lod(mut self, lod: u8) -> Result<Self, MappingError> {
        self.set_lod(lod)?;
        Ok(self)
    }

    /// Set the coordinate dimension, which must be 2 or 3.
    pub fn set_srs_dimension(&mut self, srs_dimension: u8) -> Result<(), MappingError> {
        check_range("srsDimension", srs_dimension, 2, 3)?;
        self.srs_dimension = Some(srs_dimension);
        Ok(())
    }

    /// Set the level of detail, which must be between 0 and 4.
    pub fn set_lod(&mut self, lod: u8) -> Result<(), MappingError> {
        check_range("lod", lod, MIN_LOD, MAX_LOD)?;
        self.lod = Some(lod);
        Ok(())
    }

    /// Whether a coordinate dimension is set.
    pub fn is_set_srs_dimension(&self) -> bool {
        self.srs_dimension.is_some()
    }

    /// Coordinate dimension, 3 when unset.
    pub fn srs_dimension(&self) -> u8 {
        self.srs_dimension.unwrap_or(DEFAULT_SRS_DIMENSION)
    }

    /// Level of detail, if the geometry is LOD specific.
    pub fn lod(&self) -> Option<u8> {
        self.lod
    }

    /// Check column and dimension rules.
    pub(crate) fn validate(&self, element: &str) -> Result<(), MappingError> {
        match (&self.ref_column, &self.inline_column) {
            (None, None) => {
                return Err(MappingError::invariant(
                    element,
                    "either a ref column or an inline column must be set",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(MappingError::invariant(
                    element,
                    "a ref column and an inline column are mutually exclusive",
                ))
            }
            (Some(column), None) | (None, Some(column)) if column.is_empty() => {
                return Err(MappingError::missing(element, "column"));
            }
            _ => {}
        }
        if self.ref_column.is_some() && self.srs_dimension() != 3 {
            return Err(MappingError::invariant(
                element,
                "geometries stored by reference require srs dimension 3",
            ));
        }
        Ok(())
    }
}

impl ImplicitGeometryProperty {
    /// Create an implicit geometry binding for a level of detail.
    pub fn new(lod: u8) -> Result<Self, MappingError> {
        check_range("lod", lod, MIN_LOD, MAX_LOD)?;
        Ok(Self { lod })
    }

    /// Level of detail.
    pub fn lod(&self) -> u8 {
        self.lod
    }
}

fn check_range(argument: &'static str, value: u8, min: u8, max: u8) -> Result<(), MappingError> {
    if value < min || value > max {
        return Err(MappingError::OutOfRange {
            argument,
            value: value.into(),
            min: min.into(),
            max: max.into(),
        });
    }
    Ok(())
}
