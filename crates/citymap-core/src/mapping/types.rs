//! Type definitions: object, feature and complex types.

use super::element::PathElement;
use super::join::Join;
use super::property::Property;
use super::reference::{Ref, SchemaHandle, TypeHandle, TypeKind};
use super::value::PathElementType;

/// Single-inheritance link from a type to its base type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Base type of the same kind.
    pub base: Ref<TypeHandle>,
    /// Join to the base type's table, when it differs from the subtype's.
    pub join: Option<Join>,
}

impl Extension {
    /// Extend the type with the given id.
    pub fn new(base: impl Into<Ref<TypeHandle>>) -> Self {
        Self {
            base: base.into(),
            join: None,
        }
    }

    /// Set the join to the base table.
    pub fn with_join(mut self, join: Join) -> Self {
        self.join = Some(join);
        self
    }
}

/// Data shared by every type kind.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCore {
    /// Path and owning schema.
    pub element: PathElement,
    /// Whether the type cannot be instantiated.
    pub is_abstract: bool,
    /// Properties declared by this type, in document order.
    pub properties: Vec<Property>,
    /// Base type link.
    pub extension: Option<Extension>,
}

impl TypeCore {
    /// Create a concrete type core without properties.
    pub fn new(path: impl Into<String>, schema: impl Into<Ref<SchemaHandle>>) -> Self {
        Self {
            element: PathElement::new(path, schema),
            is_abstract: false,
            properties: Vec::new(),
            extension: None,
        }
    }

    /// Own properties, optionally only queryable ones.
    ///
    /// Inherited and injected properties are listed by the registry.
    pub fn list_properties(&self, only_queryable: bool) -> Vec<&Property> {
        self.properties
            .iter()
            .filter(|p| !only_queryable || p.element.is_queryable())
            .collect()
    }

    /// Own property by local name.
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.element.matches_local_name(name))
    }

    /// Resolved base type, if any.
    pub fn base(&self) -> Option<TypeHandle> {
        self.extension.as_ref().and_then(|e| e.base.handle())
    }
}

/// A table-backed object or feature type.
///
/// Object and feature types share their shape; the registry keeps them in
/// separate collections and hands out handles tagged with [`TypeKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    /// Unique type id.
    pub id: String,
    /// Table storing instances of the type.
    pub table: String,
    /// Unique numeric discriminator.
    pub object_class_id: Option<i32>,
    /// Whether instances may appear as top-level city objects (feature types only).
    pub top_level: bool,
    /// Common type data.
    pub core: TypeCore,
}

/// Feature types share the object type representation.
pub type FeatureType = ObjectType;

impl ObjectType {
    /// Create a type with id, path, schema, table and objectClassId.
    pub fn new(
        id: impl Into<String>,
        path: impl Into<String>,
        schema: impl Into<Ref<SchemaHandle>>,
        table: impl Into<String>,
        object_class_id: i32,
    ) -> Self {
        Self {
            id: id.into(),
            table: table.into(),
            object_class_id: Some(object_class_id),
            top_level: false,
            core: TypeCore::new(path, schema),
        }
    }

    /// Mark the type abstract.
    pub fn with_abstract(mut self) -> Self {
        self.core.is_abstract = true;
        self
    }

    /// Mark the type as top-level feature.
    pub fn with_top_level(mut self) -> Self {
        self.top_level = true;
        self
    }

    /// Extend a base type.
    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.core.extension = Some(extension);
        self
    }

    /// Add a property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.core.properties.push(property);
        self
    }

    /// Add multiple properties.
    pub fn with_properties(mut self, properties: impl IntoIterator<Item = Property>) -> Self {
        self.core.properties.extend(properties);
        self
    }

    /// Whether the type is abstract.
    pub fn is_abstract(&self) -> bool {
        self.core.is_abstract
    }

    /// The type's path.
    pub fn path(&self) -> &str {
        &self.core.element.path
    }
}

/// A structural type, either global or declared inline in a property.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexType {
    /// Id of a global complex type; inline types have none.
    pub id: Option<String>,
    /// Table of the type, if it declares one.
    pub table: Option<String>,
    /// Common type data.
    pub core: TypeCore,
}

impl ComplexType {
    /// Create a global complex type.
    pub fn global(id: impl Into<String>, path: impl Into<String>, schema: impl Into<Ref<SchemaHandle>>) -> Self {
        Self {
            id: Some(id.into()),
            table: None,
            core: TypeCore::new(path, schema),
        }
    }

    /// Create a complex type for use inside a complex property.
    pub fn inline(path: impl Into<String>, schema: impl Into<Ref<SchemaHandle>>) -> Self {
        Self {
            id: None,
            table: None,
            core: TypeCore::new(path, schema),
        }
    }

    /// Set the table.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Mark the type abstract.
    pub fn with_abstract(mut self) -> Self {
        self.core.is_abstract = true;
        self
    }

    /// Extend a base type.
    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.core.extension = Some(extension);
        self
    }

    /// Add a property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.core.properties.push(property);
        self
    }

    /// Whether the type is abstract.
    pub fn is_abstract(&self) -> bool {
        self.core.is_abstract
    }
}

/// Element discriminator for a type kind.
pub fn element_type(kind: TypeKind) -> PathElementType {
    match kind {
        TypeKind::Complex => PathElementType::ComplexType,
        TypeKind::Object => PathElementType::ObjectType,
        TypeKind::Feature => PathElementType::FeatureType,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::value::SimpleType;

    #[test]
    fn test_object_type_builder() {
        let building = ObjectType::new("Building", "Building", "bldg", "BUILDING", 26)
            .with_top_level()
            .with_extension(Extension::new("AbstractBuilding"))
            .with_property(Property::simple_attribute("@class", "bldg", "CLASS", SimpleType::String))
            .with_property(
                Property::simple_attribute("function", "bldg", "FUNCTION", SimpleType::String)
                    .with_queryable(false),
            );

        assert_eq!(building.id, "Building");
        assert_eq!(building.object_class_id, Some(26));
        assert!(building.top_level);
        assert!(!building.is_abstract());
        assert_eq!(building.core.properties.len(), 2);
        assert_eq!(building.core.list_properties(true).len(), 1);
        assert!(building.core.get_property("class").is_some());
        assert!(building.core.base().is_none());
    }

    #[test]
    fn test_complex_type_kinds() {
        let global = ComplexType::global("AddressType", "Address", "core").with_table("ADDRESS");
        assert_eq!(global.id.as_deref(), Some("AddressType"));
        assert_eq!(global.table.as_deref(), Some("ADDRESS"));

        let inline = ComplexType::inline("Details", "core");
        assert!(inline.id.is_none());
        assert!(inline.table.is_none());
    }
}
