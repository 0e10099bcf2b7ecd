//! Conversion of registered entities into document entries.

use super::model::{
    AttributeTypeDoc, ComplexTypeDoc, ExtensionDoc, InjectedPropertyDoc, InjectionDoc, ObjectTypeDoc,
    PropertyDoc, PropertyKindDoc,
};
use crate::mapping::{
    AttributeTypeHandle, ComplexAttributeType, ComplexType, Extension, ObjectType, PathElement, Property,
    PropertyInjection, PropertyKind, Ref, SchemaHandle, TypeHandle,
};
use crate::registry::SchemaMapping;

/// Writes references as the ids they point at, whether resolved or not.
pub(super) struct Dumper<'a> {
    mapping: &'a SchemaMapping,
}

impl<'a> Dumper<'a> {
    pub(super) fn new(mapping: &'a SchemaMapping) -> Self {
        Self { mapping }
    }

    pub(super) fn object_type(&self, object_type: &ObjectType) -> ObjectTypeDoc {
        let core = &object_type.core;
        ObjectTypeDoc {
            id: object_type.id.clone(),
            path: core.element.path.clone(),
            schema: self.schema_id(&core.element.schema),
            table: object_type.table.clone(),
            object_class_id: object_type.object_class_id,
            is_abstract: core.is_abstract,
            top_level: object_type.top_level,
            queryable: core.element.queryable,
            extension: core.extension.as_ref().map(|extension| self.extension(extension)),
            properties: self.properties(&core.properties),
        }
    }

    pub(super) fn complex_type(&self, complex_type: &ComplexType) -> ComplexTypeDoc {
        let core = &complex_type.core;
        ComplexTypeDoc {
            id: complex_type.id.clone(),
            path: core.element.path.clone(),
            schema: self.schema_id(&core.element.schema),
            table: complex_type.table.clone(),
            is_abstract: core.is_abstract,
            queryable: core.element.queryable,
            extension: core.extension.as_ref().map(|extension| self.extension(extension)),
            properties: self.properties(&core.properties),
        }
    }

    pub(super) fn attribute_type(&self, attribute_type: &ComplexAttributeType) -> AttributeTypeDoc {
        AttributeTypeDoc {
            id: attribute_type.id.clone(),
            schema: attribute_type.schema.as_ref().map(|schema| self.schema_id(schema)),
            table: attribute_type.table.clone(),
            attributes: self.properties(&attribute_type.attributes),
        }
    }

    pub(super) fn injection(&self, injection: &PropertyInjection) -> InjectionDoc {
        InjectionDoc {
            table: injection.table.clone(),
            join: injection.join.clone(),
            default_base: injection.default_base.as_ref().map(|base| self.type_id(base)),
            properties: injection
                .properties
                .iter()
                .map(|injected| InjectedPropertyDoc {
                    base: injected.base.as_ref().map(|base| self.type_id(base)),
                    context: injected.context,
                    property: self.property(&injected.property),
                })
                .collect(),
        }
    }

    fn extension(&self, extension: &Extension) -> ExtensionDoc {
        ExtensionDoc {
            base: self.type_id(&extension.base),
            join: extension.join.clone(),
        }
    }

    fn properties(&self, properties: &[Property]) -> Vec<PropertyDoc> {
        properties.iter().map(|property| self.property(property)).collect()
    }

    fn property(&self, property: &Property) -> PropertyDoc {
        let kind = match &property.kind {
            PropertyKind::SimpleAttribute(simple) => PropertyKindDoc::SimpleAttribute {
                column: simple.column.clone(),
                simple_type: simple.simple_type,
            },
            PropertyKind::ComplexAttribute(attribute) => PropertyKindDoc::ComplexAttribute {
                type_ref: attribute.type_ref.as_ref().map(|type_ref| self.attribute_type_id(type_ref)),
                inline_type: attribute
                    .inline_type
                    .as_deref()
                    .map(|inline| Box::new(self.attribute_type(inline))),
            },
            PropertyKind::ObjectProperty(reference) => PropertyKindDoc::ObjectProperty {
                target: self.type_id(&reference.target),
                relation_type: reference.relation_type,
            },
            PropertyKind::FeatureProperty(reference) => PropertyKindDoc::FeatureProperty {
                target: self.type_id(&reference.target),
                relation_type: reference.relation_type,
            },
            PropertyKind::ComplexProperty(complex) => PropertyKindDoc::ComplexProperty {
                type_ref: complex.type_ref.as_ref().map(|type_ref| self.type_id(type_ref)),
                inline_type: complex
                    .inline_type
                    .as_deref()
                    .map(|inline| Box::new(self.complex_type(inline))),
                relation_type: (!complex.is_inline()).then(|| complex.relation_type()),
            },
            PropertyKind::GeometryProperty(geometry) => PropertyKindDoc::GeometryProperty {
                geometry_type: geometry.geometry_type,
                ref_column: geometry.ref_column.clone(),
                inline_column: geometry.inline_column.clone(),
                srs_dimension: geometry.is_set_srs_dimension().then(|| geometry.srs_dimension()),
                lod: geometry.lod(),
            },
            PropertyKind::ImplicitGeometryProperty(implicit) => {
                PropertyKindDoc::ImplicitGeometryProperty { lod: implicit.lod() }
            }
        };

        let PathElement { path, schema, queryable } = &property.element;
        PropertyDoc {
            path: path.clone(),
            schema: self.schema_id(schema),
            queryable: *queryable,
            min_occurs: property.min_occurs,
            max_occurs: property.max_occurs,
            join: property.join.clone(),
            kind,
        }
    }

    fn schema_id(&self, reference: &Ref<SchemaHandle>) -> String {
        match reference {
            Ref::Unresolved(id) => id.clone(),
            Ref::Resolved(handle) => self
                .mapping
                .schema(*handle)
                .map(|schema| schema.id.clone())
                .unwrap_or_default(),
        }
    }

    fn type_id(&self, reference: &Ref<TypeHandle>) -> String {
        match reference {
            Ref::Unresolved(id) => id.clone(),
            Ref::Resolved(handle) => self.mapping.type_id(*handle).unwrap_or_default().to_string(),
        }
    }

    fn attribute_type_id(&self, reference: &Ref<AttributeTypeHandle>) -> String {
        match reference {
            Ref::Unresolved(id) => id.clone(),
            Ref::Resolved(handle) => self
                .mapping
                .attribute_type(*handle)
                .and_then(|attribute_type| attribute_type.id.clone())
                .unwrap_or_default(),
        }
    }
}
