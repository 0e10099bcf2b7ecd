//! Reference traversal for every entity of the metamodel.

use super::attribute::ComplexAttributeType;
use super::injection::PropertyInjection;
use super::property::{Property, PropertyKind};
use super::reference::{RefVisitor, TypeKind};
use super::types::{ComplexType, ObjectType, TypeCore};

impl TypeCore {
    /// Visit the schema, base type and all property references.
    pub fn visit_refs<V: RefVisitor>(&mut self, kind: TypeKind, visitor: &mut V) {
        visitor.visit_schema(&mut self.element.schema);
        if let Some(extension) = &mut self.extension {
            visitor.visit_type(&mut extension.base, kind);
        }
        for property in &mut self.properties {
            property.visit_refs(visitor);
        }
    }
}

impl ObjectType {
    /// Visit every reference reachable from the type.
    pub fn visit_refs<V: RefVisitor>(&mut self, kind: TypeKind, visitor: &mut V) {
        self.core.visit_refs(kind, visitor);
    }
}

impl ComplexType {
    /// Visit every reference reachable from the type.
    pub fn visit_refs<V: RefVisitor>(&mut self, visitor: &mut V) {
        self.core.visit_refs(TypeKind::Complex, visitor);
    }
}

impl ComplexAttributeType {
    /// Visit every reference reachable from the attribute type.
    pub fn visit_refs<V: RefVisitor>(&mut self, visitor: &mut V) {
        if let Some(schema) = &mut self.schema {
            visitor.visit_schema(schema);
        }
        for attribute in &mut self.attributes {
            attribute.visit_refs(visitor);
        }
    }
}

impl Property {
    /// Visit every reference reachable from the property, including inline types.
    pub fn visit_refs<V: RefVisitor>(&mut self, visitor: &mut V) {
        visitor.visit_schema(&mut self.element.schema);
        match &mut self.kind {
            PropertyKind::ComplexAttribute(attribute) => {
                if let Some(type_ref) = &mut attribute.type_ref {
                    visitor.visit_attribute_type(type_ref);
                }
                if let Some(inline) = &mut attribute.inline_type {
                    inline.visit_refs(visitor);
                }
            }
            PropertyKind::ObjectProperty(reference) => {
                visitor.visit_type(&mut reference.target, TypeKind::Object)
            }
            PropertyKind::FeatureProperty(reference) => {
                visitor.visit_type(&mut reference.target, TypeKind::Feature)
            }
            PropertyKind::ComplexProperty(complex) => {
                if let Some(type_ref) = &mut complex.type_ref {
                    visitor.visit_type(type_ref, TypeKind::Complex);
                }
                if let Some(inline) = &mut complex.inline_type {
                    inline.visit_refs(visitor);
                }
            }
            PropertyKind::SimpleAttribute(_)
            | PropertyKind::GeometryProperty(_)
            | PropertyKind::ImplicitGeometryProperty(_) => {}
        }
    }
}

impl PropertyInjection {
    /// Visit base types and every injected property.
    pub fn visit_refs<V: RefVisitor>(&mut self, visitor: &mut V) {
        if let Some(base) = &mut self.default_base {
            visitor.visit_type(base, TypeKind::Feature);
        }
        for injected in &mut self.properties {
            if let Some(base) = &mut injected.base {
                visitor.visit_type(base, TypeKind::Feature);
            }
            injected.property.visit_refs(visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::reference::{AttributeTypeHandle, Ref, SchemaHandle, TypeHandle};
    use crate::mapping::types::Extension;
    use crate::mapping::value::{RelationType, SimpleType};

    #[derive(Default)]
    struct Collect(Vec<String>);

    impl RefVisitor for Collect {
        fn visit_schema(&mut self, reference: &mut Ref<SchemaHandle>) {
            if let Some(id) = reference.unresolved_id() {
                self.0.push(format!("schema:{}", id));
            }
        }

        fn visit_type(&mut self, reference: &mut Ref<TypeHandle>, kind: TypeKind) {
            if let Some(id) = reference.unresolved_id() {
                self.0.push(format!("{}:{}", kind, id));
            }
        }

        fn visit_attribute_type(&mut self, reference: &mut Ref<AttributeTypeHandle>) {
            if let Some(id) = reference.unresolved_id() {
                self.0.push(format!("attribute:{}", id));
            }
        }
    }

    #[test]
    fn test_visits_nested_references() {
        let inline = ComplexType::inline("Details", "core")
            .with_property(Property::complex_attribute("code", "core", "CodeType"));
        let mut building = ObjectType::new("Building", "Building", "bldg", "BUILDING", 26)
            .with_extension(Extension::new("AbstractBuilding"))
            .with_property(Property::object("address", "bldg", "Address", RelationType::Composition))
            .with_property(Property::inline_complex("details", "bldg", inline))
            .with_property(Property::simple_attribute("@class", "bldg", "CLASS", SimpleType::String));

        let mut collect = Collect::default();
        building.visit_refs(TypeKind::Feature, &mut collect);

        assert_eq!(
            collect.0,
            vec![
                "schema:bldg",
                "feature type:AbstractBuilding",
                "schema:bldg",
                "object type:Address",
                "schema:bldg",
                "schema:core",
                "schema:core",
                "attribute:CodeType",
                "schema:bldg",
            ]
        );
    }
}
