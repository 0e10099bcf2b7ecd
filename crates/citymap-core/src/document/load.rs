//! Conversion of document entries into metamodel entities.
//!
//! References stay unresolved; range-checked values (level of detail, srs
//! dimension) are rejected here.

use super::model::{
    AttributeTypeDoc, ComplexTypeDoc, ExtensionDoc, InjectedPropertyDoc, InjectionDoc, ObjectTypeDoc,
    PropertyDoc, PropertyKindDoc,
};
use crate::error::MappingError;
use crate::mapping::{
    ComplexAttribute, ComplexAttributeType, ComplexProperty, ComplexType, Extension, GeometryProperty,
    ImplicitGeometryProperty, InjectedProperty, ObjectType, PathElement, Property, PropertyInjection,
    PropertyKind, Ref, SimpleAttribute, TypeCore, TypeReference,
};

pub(super) fn object_type(doc: ObjectTypeDoc) -> Result<ObjectType, MappingError> {
    Ok(ObjectType {
        id: doc.id,
        table: doc.table,
        object_class_id: doc.object_class_id,
        top_level: doc.top_level,
        core: type_core(
            doc.path,
            doc.schema,
            doc.queryable,
            doc.is_abstract,
            doc.extension,
            doc.properties,
        )?,
    })
}

pub(super) fn complex_type(doc: ComplexTypeDoc) -> Result<ComplexType, MappingError> {
    Ok(ComplexType {
        id: doc.id,
        table: doc.table,
        core: type_core(
            doc.path,
            doc.schema,
            doc.queryable,
            doc.is_abstract,
            doc.extension,
            doc.properties,
        )?,
    })
}

pub(super) fn attribute_type(doc: AttributeTypeDoc) -> Result<ComplexAttributeType, MappingError> {
    Ok(ComplexAttributeType {
        id: doc.id,
        table: doc.table,
        schema: doc.schema.map(Ref::Unresolved),
        attributes: properties(doc.attributes)?,
    })
}

pub(super) fn injection(doc: InjectionDoc) -> Result<PropertyInjection, MappingError> {
    Ok(PropertyInjection {
        table: doc.table,
        join: doc.join,
        default_base: doc.default_base.map(Ref::Unresolved),
        properties: doc
            .properties
            .into_iter()
            .map(injected_property)
            .collect::<Result<_, _>>()?,
    })
}

fn injected_property(doc: InjectedPropertyDoc) -> Result<InjectedProperty, MappingError> {
    let mut injected = InjectedProperty::new(property(doc.property)?);
    injected.base = doc.base.map(Ref::Unresolved);
    injected.context = doc.context;
    Ok(injected)
}

fn type_core(
    path: String,
    schema: String,
    queryable: Option<bool>,
    is_abstract: bool,
    extension: Option<ExtensionDoc>,
    docs: Vec<PropertyDoc>,
) -> Result<TypeCore, MappingError> {
    let mut element = PathElement::new(path, schema);
    element.queryable = queryable;
    Ok(TypeCore {
        element,
        is_abstract,
        properties: properties(docs)?,
        extension: extension.map(|extension| Extension {
            base: Ref::Unresolved(extension.base),
            join: extension.join,
        }),
    })
}

fn properties(docs: Vec<PropertyDoc>) -> Result<Vec<Property>, MappingError> {
    docs.into_iter().map(property).collect()
}

fn property(doc: PropertyDoc) -> Result<Property, MappingError> {
    let kind = match doc.kind {
        PropertyKindDoc::SimpleAttribute { column, simple_type } => PropertyKind::SimpleAttribute(SimpleAttribute {
            column,
            simple_type,
            name: None,
        }),
        PropertyKindDoc::ComplexAttribute { type_ref, inline_type } => {
            PropertyKind::ComplexAttribute(ComplexAttribute {
                type_ref: type_ref.map(Ref::Unresolved),
                inline_type: inline_type
                    .map(|inline| attribute_type(*inline).map(Box::new))
                    .transpose()?,
            })
        }
        PropertyKindDoc::ObjectProperty { target, relation_type } => PropertyKind::ObjectProperty(TypeReference {
            target: Ref::Unresolved(target),
            relation_type,
        }),
        PropertyKindDoc::FeatureProperty { target, relation_type } => {
            PropertyKind::FeatureProperty(TypeReference {
                target: Ref::Unresolved(target),
                relation_type,
            })
        }
        PropertyKindDoc::ComplexProperty {
            type_ref,
            inline_type,
            relation_type,
        } => {
            let relation_type = relation_type.unwrap_or_default();
            let mut complex = match (type_ref, inline_type) {
                // Both set is kept so that validation reports it.
                (type_ref, Some(inline)) => {
                    let mut complex = ComplexProperty::inline(complex_type(*inline)?);
                    complex.type_ref = type_ref.map(Ref::Unresolved);
                    complex
                }
                (Some(id), None) => ComplexProperty::referenced(id, relation_type),
                (None, None) => return Err(MappingError::missing(format!("complex property '{}'", doc.path), "type")),
            };
            complex.set_relation_type(relation_type);
            PropertyKind::ComplexProperty(complex)
        }
        PropertyKindDoc::GeometryProperty {
            geometry_type,
            ref_column,
            inline_column,
            srs_dimension,
            lod,
        } => {
            let mut geometry = GeometryProperty::new(geometry_type);
            geometry.ref_column = ref_column;
            geometry.inline_column = inline_column;
            if let Some(srs_dimension) = srs_dimension {
                geometry.set_srs_dimension(srs_dimension)?;
            }
            if let Some(lod) = lod {
                geometry.set_lod(lod)?;
            }
            PropertyKind::GeometryProperty(geometry)
        }
        PropertyKindDoc::ImplicitGeometryProperty { lod } => {
            PropertyKind::ImplicitGeometryProperty(ImplicitGeometryProperty::new(lod)?)
        }
    };

    let mut property = Property::new(doc.path, doc.schema, kind);
    property.element.queryable = doc.queryable;
    property.min_occurs = doc.min_occurs;
    property.max_occurs = doc.max_occurs;
    property.join = doc.join;
    Ok(property)
}
