//! Reference resolution and per-entity validation.
//!
//! Every entity is cloned out of its arena, resolved and checked against the
//! registry, and written back. Resolved references are re-checked rather than
//! re-resolved, so running validation again is harmless.

use tracing::debug;

use super::{InjectedSlot, SchemaMapping};
use crate::error::MappingError;
use crate::mapping::{
    validate_join, AttributeTypeHandle, ComplexAttributeType, ComplexType, InjectionHandle, JoinParent,
    PathElement, Property, PropertyKind, Ref, RelationType, SchemaHandle, TypeCore, TypeHandle, TypeKind,
    SELF_PATH,
};

impl SchemaMapping {
    pub(super) fn validate_attribute_type(&mut self, index: usize) -> Result<(), MappingError> {
        let mut attribute_type = self.attribute_types[index].clone();
        let label = attribute_type.describe();

        if attribute_type.id.as_deref().map_or(true, str::is_empty) {
            return Err(MappingError::missing(label, "id"));
        }
        match &mut attribute_type.schema {
            Some(schema) => {
                self.resolve_schema(schema, &label)?;
            }
            None => return Err(MappingError::missing(label, "schema")),
        }
        self.validate_attributes(&mut attribute_type, &label)?;

        self.attribute_types[index] = attribute_type;
        Ok(())
    }

    pub(super) fn validate_complex_type(&mut self, index: usize) -> Result<(), MappingError> {
        let handle = TypeHandle::new(TypeKind::Complex, index);
        let mut complex_type = self.complex_types[index].clone();

        let id = match complex_type.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(MappingError::missing("complex type", "id")),
        };
        let label = format!("complex type '{}'", id);
        if complex_type.table.as_deref() == Some("") {
            return Err(MappingError::missing(label, "table"));
        }
        let schema = self.validate_type_core(&mut complex_type.core, TypeKind::Complex, &label, Some(handle))?;

        self.complex_types[index] = complex_type;
        self.schemas[schema.0].register_member(handle);
        Ok(())
    }

    pub(super) fn validate_object_type(&mut self, kind: TypeKind, index: usize) -> Result<(), MappingError> {
        let handle = TypeHandle::new(kind, index);
        let mut object_type = match kind {
            TypeKind::Feature => self.feature_types[index].clone(),
            _ => self.object_types[index].clone(),
        };

        if object_type.id.is_empty() {
            return Err(MappingError::missing(kind.label(), "id"));
        }
        let label = format!("{} '{}'", kind, object_type.id);
        if object_type.table.is_empty() {
            return Err(MappingError::missing(label, "table"));
        }
        match object_type.object_class_id {
            None => return Err(MappingError::missing(label, "objectClassId")),
            Some(object_class_id) if object_class_id < 0 => {
                return Err(MappingError::invariant(
                    label,
                    format!("objectClassId {} must not be negative", object_class_id),
                ))
            }
            Some(_) => {}
        }
        if object_type.top_level && kind != TypeKind::Feature {
            return Err(MappingError::invariant(label, "only feature types can be top-level"));
        }
        let schema = self.validate_type_core(&mut object_type.core, kind, &label, Some(handle))?;

        match kind {
            TypeKind::Feature => self.feature_types[index] = object_type,
            _ => self.object_types[index] = object_type,
        }
        self.schemas[schema.0].register_member(handle);
        Ok(())
    }

    pub(super) fn validate_injection(&mut self, index: usize) -> Result<(), MappingError> {
        let mut injection = self.injections[index].clone();
        let label = injection.describe();

        if injection.table.is_empty() {
            return Err(MappingError::missing("property injection", "table"));
        }
        let join = injection
            .join
            .clone()
            .ok_or_else(|| MappingError::missing(label.clone(), "join"))?;
        if !join.table.eq_ignore_ascii_case(&injection.table) {
            return Err(MappingError::invariant(
                label,
                format!("join table '{}' differs from the injection table", join.table),
            ));
        }
        join.validate(JoinParent::Injection, &label)?;

        let default_base = match &mut injection.default_base {
            Some(base) => Some(self.resolve_type(base, TypeKind::Feature, &label)?),
            None => None,
        };

        let mut attachments = Vec::with_capacity(injection.properties.len());
        for (position, injected) in injection.properties.iter_mut().enumerate() {
            let property_label = injected.property.describe();

            let base = match (&mut injected.base, default_base) {
                (Some(base), default_base) => {
                    let base = self.resolve_type(base, TypeKind::Feature, &property_label)?;
                    if let Some(default_base) = default_base {
                        if !self.is_equal_to_or_sub_type_of(base, default_base) {
                            return Err(MappingError::semantic_gate(
                                property_label,
                                format!(
                                    "base {} is not a subtype of the default base {}",
                                    self.describe_type(base),
                                    self.describe_type(default_base)
                                ),
                            ));
                        }
                    }
                    base
                }
                (None, Some(default_base)) => default_base,
                (None, None) => return Err(MappingError::missing(property_label, "base")),
            };

            if let Some(context) = injected.context {
                let schema = self.resolve_path_element(&mut injected.property.element, &property_label)?;
                let schema = &self.schemas[schema.0];
                if !schema.has_context(context) {
                    return Err(MappingError::semantic_gate(
                        property_label,
                        format!("schema '{}' does not offer a namespace for {}", schema.id, context),
                    ));
                }
            }

            injected.set_base_join(join.clone());
            self.validate_property(&mut injected.property, JoinParent::Injection)?;
            attachments.push((base, position));
        }

        self.injections[index] = injection;
        for (base, property) in attachments {
            self.attach(
                base,
                InjectedSlot {
                    injection: InjectionHandle(index),
                    property,
                },
            );
        }
        debug!(injection = %label, "Validated property injection");
        Ok(())
    }

    /// Validate the path element, extension and properties of a type.
    fn validate_type_core(
        &self,
        core: &mut TypeCore,
        kind: TypeKind,
        label: &str,
        handle: Option<TypeHandle>,
    ) -> Result<SchemaHandle, MappingError> {
        let schema = self.resolve_path_element(&mut core.element, label)?;

        if let Some(extension) = &mut core.extension {
            let base = self.resolve_type(&mut extension.base, kind, label)?;
            if handle == Some(base) {
                return Err(MappingError::invariant(label, "a type cannot extend itself"));
            }
            if let Some(join) = &extension.join {
                join.validate(JoinParent::Type(kind), label)?;
            }
        }

        for property in &mut core.properties {
            self.validate_property(property, JoinParent::Type(kind))?;
        }
        Ok(schema)
    }

    fn validate_inline_complex_type(&self, complex_type: &mut ComplexType) -> Result<(), MappingError> {
        let label = format!("inline complex type '{}'", complex_type.core.element.path);
        if complex_type.id.is_some() {
            return Err(MappingError::invariant(label, "an inline complex type must not declare an id"));
        }
        if complex_type.table.is_some() {
            return Err(MappingError::invariant(label, "an inline complex type must not declare a table"));
        }
        self.validate_type_core(&mut complex_type.core, TypeKind::Complex, &label, None)?;
        Ok(())
    }

    fn validate_inline_attribute_type(&self, attribute_type: &mut ComplexAttributeType) -> Result<(), MappingError> {
        let label = attribute_type.describe();
        if attribute_type.id.is_some() {
            return Err(MappingError::invariant(label, "an inline attribute type must not declare an id"));
        }
        if attribute_type.table.is_some() {
            return Err(MappingError::invariant(label, "an inline attribute type must not declare a table"));
        }
        if let Some(schema) = &mut attribute_type.schema {
            self.resolve_schema(schema, &label)?;
        }
        self.validate_attributes(attribute_type, &label)
    }

    fn validate_attributes(&self, attribute_type: &mut ComplexAttributeType, label: &str) -> Result<(), MappingError> {
        for attribute in &mut attribute_type.attributes {
            if !attribute.is_attribute() {
                return Err(MappingError::invariant(
                    label,
                    format!("{} is not allowed in an attribute type", attribute.describe()),
                ));
            }
            self.validate_property(attribute, JoinParent::AttributeType)?;
        }
        Ok(())
    }

    /// Validate a property owned by `owner`.
    ///
    /// The variant shape is checked first, then cardinality and join, then the
    /// path element.
    fn validate_property(&self, property: &mut Property, owner: JoinParent) -> Result<(), MappingError> {
        let label = property.describe();
        let name = property.name().to_string();

        match &mut property.kind {
            PropertyKind::SimpleAttribute(attribute) => {
                if attribute.column.is_empty() {
                    return Err(MappingError::missing(label, "column"));
                }
            }
            PropertyKind::ComplexAttribute(attribute) => {
                match (attribute.type_ref.as_mut(), attribute.inline_type.as_deref_mut()) {
                    (Some(type_ref), None) => {
                        self.resolve_attribute_type(type_ref, &label)?;
                    }
                    (None, Some(inline)) => {
                        self.validate_inline_attribute_type(inline)?;
                        for leaf in &mut inline.attributes {
                            if leaf.path() != SELF_PATH {
                                continue;
                            }
                            if let PropertyKind::SimpleAttribute(simple) = &mut leaf.kind {
                                simple.name = Some(name.clone());
                            }
                        }
                    }
                    _ => {
                        return Err(MappingError::invariant(
                            label,
                            "exactly one of an attribute type reference or an inline attribute type is required",
                        ))
                    }
                }
            }
            PropertyKind::ObjectProperty(reference) => {
                self.resolve_type(&mut reference.target, TypeKind::Object, &label)?;
            }
            PropertyKind::FeatureProperty(reference) => {
                self.resolve_type(&mut reference.target, TypeKind::Feature, &label)?;
            }
            PropertyKind::ComplexProperty(complex) => {
                match (complex.type_ref.as_mut(), complex.inline_type.as_deref_mut()) {
                    (Some(type_ref), None) => {
                        self.resolve_type(type_ref, TypeKind::Complex, &label)?;
                    }
                    (None, Some(inline)) => self.validate_inline_complex_type(inline)?,
                    _ => {
                        return Err(MappingError::invariant(
                            label,
                            "exactly one of a complex type reference or an inline complex type is required",
                        ))
                    }
                }
                if complex.is_inline() {
                    complex.set_relation_type(RelationType::Composition);
                }
            }
            PropertyKind::GeometryProperty(geometry) => geometry.validate(&label)?,
            PropertyKind::ImplicitGeometryProperty(_) => {}
        }

        if let Some(max_occurs) = property.max_occurs {
            let min_occurs = property.min_occurs();
            if max_occurs < min_occurs {
                return Err(MappingError::Cardinality {
                    element: label,
                    min_occurs,
                    max_occurs,
                });
            }
        }
        if let Some(join) = &property.join {
            validate_join(
                join,
                JoinParent::Property {
                    target: property.target_kind(),
                },
                Some(owner),
                &label,
            )?;
        }

        self.resolve_path_element(&mut property.element, &label)?;
        Ok(())
    }

    fn resolve_path_element(&self, element: &mut PathElement, label: &str) -> Result<SchemaHandle, MappingError> {
        if element.path.is_empty() {
            return Err(MappingError::missing(label, "path"));
        }
        self.resolve_schema(&mut element.schema, label)
    }

    fn resolve_schema(
        &self,
        reference: &mut Ref<SchemaHandle>,
        label: &str,
    ) -> Result<SchemaHandle, MappingError> {
        let id = match reference {
            Ref::Resolved(handle) if handle.0 < self.schemas.len() => return Ok(*handle),
            Ref::Resolved(_) => return Err(dangling(label, "schema")),
            Ref::Unresolved(id) if id.is_empty() => return Err(MappingError::missing(label, "schema")),
            Ref::Unresolved(id) => id.clone(),
        };
        let handle = self
            .schema_ids
            .get(&id)
            .map(|&index| SchemaHandle(index))
            .ok_or_else(|| MappingError::unresolved(label, "schema", id))?;
        *reference = Ref::Resolved(handle);
        Ok(handle)
    }

    fn resolve_type(
        &self,
        reference: &mut Ref<TypeHandle>,
        kind: TypeKind,
        label: &str,
    ) -> Result<TypeHandle, MappingError> {
        let id = match reference {
            Ref::Resolved(handle) => {
                if handle.kind() != kind {
                    return Err(MappingError::invariant(
                        label,
                        format!("expected a {} but found a {}", kind, handle.kind()),
                    ));
                }
                if self.type_core(*handle).is_none() {
                    return Err(dangling(label, kind.label()));
                }
                return Ok(*handle);
            }
            Ref::Unresolved(id) if id.is_empty() => return Err(MappingError::missing(label, "type")),
            Ref::Unresolved(id) => id.clone(),
        };
        let handle = self
            .type_ids(kind)
            .get(&id)
            .map(|&index| TypeHandle::new(kind, index))
            .ok_or_else(|| MappingError::unresolved(label, kind.label(), id))?;
        *reference = Ref::Resolved(handle);
        Ok(handle)
    }

    fn resolve_attribute_type(
        &self,
        reference: &mut Ref<AttributeTypeHandle>,
        label: &str,
    ) -> Result<AttributeTypeHandle, MappingError> {
        let id = match reference {
            Ref::Resolved(handle) if handle.0 < self.attribute_types.len() => return Ok(*handle),
            Ref::Resolved(_) => return Err(dangling(label, "complex attribute type")),
            Ref::Unresolved(id) if id.is_empty() => return Err(MappingError::missing(label, "type")),
            Ref::Unresolved(id) => id.clone(),
        };
        let handle = self
            .attribute_type_ids
            .get(&id)
            .map(|&index| AttributeTypeHandle(index))
            .ok_or_else(|| MappingError::unresolved(label, "complex attribute type", id))?;
        *reference = Ref::Resolved(handle);
        Ok(handle)
    }
}

fn dangling(label: &str, kind: &str) -> MappingError {
    MappingError::invariant(label, format!("reference to an unregistered {}", kind))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::error::ErrorCategory;
    use crate::mapping::{
        CityGMLContext, ComplexAttribute, FeatureType, GeometryProperty, GeometryType, InjectedProperty, Join,
        JoinRole, JoinTable, ObjectType, PropertyInjection, SimpleType,
    };

    fn add_feature(mapping: &mut SchemaMapping, property: Property) -> Result<TypeHandle, MappingError> {
        mapping.add_feature_type(FeatureType::new("Probe", "Probe", "bldg", "PROBE", 900).with_property(property))
    }

    #[test]
    fn test_references_are_resolved() {
        let mapping = fixtures::validated();
        let building = mapping.feature_type_handle("AbstractBuilding").unwrap();
        let core = mapping.type_core(building).unwrap();

        assert!(core.element.schema.is_resolved());
        assert!(core.extension.as_ref().unwrap().base.is_resolved());
        for property in &core.properties {
            assert!(property.element.schema.is_resolved(), "{}", property.describe());
            if let Some(target) = property.target() {
                assert!(target.is_resolved(), "{}", property.describe());
            }
        }
    }

    #[test]
    fn test_self_leaf_takes_attribute_name() {
        let mapping = fixtures::validated();
        let building = mapping.feature_type_handle("AbstractBuilding").unwrap();
        let height = mapping.get_property(building, "measuredHeight", None, false).unwrap();

        let PropertyKind::ComplexAttribute(ComplexAttribute {
            inline_type: Some(inline),
            ..
        }) = &height.kind
        else {
            panic!("expected an inline complex attribute");
        };
        assert_eq!(inline.attributes[0].name(), "measuredHeight");
        assert_eq!(inline.attributes[1].name(), "uom");
    }

    #[test]
    fn test_inline_complex_is_composition() {
        let mapping = fixtures::validated();
        let reference = mapping.complex_type_handle("ExternalReference").unwrap();
        let external_object = mapping.get_property(reference, "externalObject", None, false).unwrap();

        assert_eq!(external_object.relation_type(), Some(RelationType::Composition));
    }

    #[test]
    fn test_missing_column_is_structural() {
        let mut mapping = fixtures::validated();
        let err = add_feature(&mut mapping, Property::simple_attribute("name", "bldg", "", SimpleType::String))
            .unwrap_err();
        assert_eq!(err, MappingError::missing("simple attribute 'name'", "column"));
    }

    #[test]
    fn test_cardinality_is_checked() {
        let mut mapping = fixtures::validated();
        let property = Property::simple_attribute("name", "bldg", "NAME", SimpleType::String)
            .with_min_occurs(2)
            .with_max_occurs(1);

        let err = add_feature(&mut mapping, property).unwrap_err();
        assert_eq!(
            err,
            MappingError::Cardinality {
                element: "simple attribute 'name'".into(),
                min_occurs: 2,
                max_occurs: 1,
            }
        );
    }

    #[test]
    fn test_complex_attribute_needs_exactly_one_type() {
        let mut mapping = fixtures::validated();
        let mut property = Property::complex_attribute("function", "bldg", "CodeType");
        if let PropertyKind::ComplexAttribute(attribute) = &mut property.kind {
            attribute.inline_type = Some(Box::new(ComplexAttributeType::inline()));
        }

        let err = add_feature(&mut mapping, property).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Invariant);
    }

    #[test]
    fn test_attribute_type_only_holds_attributes() {
        let mut mapping = fixtures::validated();
        let attribute_type = ComplexAttributeType::global("Broken", "gml").with_attribute(Property::geometry(
            "point",
            "gml",
            GeometryProperty::new(GeometryType::Point).with_inline_column("POINT"),
        ));

        let err = mapping.add_attribute_type(attribute_type).unwrap_err();
        assert!(err.to_string().contains("not allowed in an attribute type"));
    }

    #[test]
    fn test_inline_attribute_type_must_not_have_id() {
        let mut mapping = fixtures::validated();
        let mut inline = ComplexAttributeType::inline()
            .with_attribute(Property::simple_attribute(".", "bldg", "X", SimpleType::String));
        inline.id = Some("Named".into());

        let err = add_feature(&mut mapping, Property::inline_complex_attribute("x", "bldg", inline)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Invariant);
    }

    #[test]
    fn test_inline_complex_type_must_not_have_table() {
        let mut mapping = fixtures::validated();
        let inline = ComplexType::inline("Details", "bldg").with_table("DETAILS");

        let err = add_feature(&mut mapping, Property::inline_complex("details", "bldg", inline)).unwrap_err();
        assert!(err.to_string().contains("must not declare a table"));
    }

    #[test]
    fn test_wrong_kind_reference_is_unresolved() {
        let mut mapping = fixtures::validated();
        // Address is an object type, not a feature type.
        let property = Property::feature("address", "bldg", "Address", RelationType::Association);

        let err = add_feature(&mut mapping, property).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Referential);
    }

    #[test]
    fn test_join_table_on_attribute_is_rejected() {
        let mut mapping = fixtures::validated();
        let join = JoinTable::new(
            "LINK",
            Join::new("LINK", "ID", "PROBE_ID", JoinRole::Child),
            Join::new("OTHER", "OTHER_ID", "ID", JoinRole::Parent),
        );
        let property = Property::simple_attribute("name", "bldg", "NAME", SimpleType::String).with_join(join);

        let err = add_feature(&mut mapping, property).unwrap_err();
        assert!(matches!(err, MappingError::JoinContext { .. }));
    }

    #[test]
    fn test_missing_object_class_id() {
        let mut mapping = fixtures::validated();
        let mut object_type = ObjectType::new("Probe", "Probe", "core", "PROBE", 900);
        object_type.object_class_id = None;

        let err = mapping.add_object_type(object_type).unwrap_err();
        assert_eq!(err, MappingError::missing("object type 'Probe'", "objectClassId"));
    }

    #[test]
    fn test_object_types_cannot_be_top_level() {
        let mut mapping = fixtures::validated();
        let object_type = ObjectType::new("Probe", "Probe", "core", "PROBE", 900).with_top_level();

        assert!(mapping.add_object_type(object_type).is_err());
    }

    #[test]
    fn test_injection_join_must_target_injection_table() {
        let mut mapping = fixtures::validated();
        let injection = PropertyInjection::new("MY_ADE", Join::new("OTHER", "ID", "ID", JoinRole::Child))
            .with_default_base("Building")
            .with_property(InjectedProperty::new(Property::simple_attribute(
                "x",
                "bldg",
                "X",
                SimpleType::String,
            )));

        let err = mapping.add_injection(injection).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Invariant);
    }

    #[test]
    fn test_injection_requires_a_base() {
        let mut mapping = fixtures::validated();
        let injection = PropertyInjection::new("MY_ADE", Join::new("MY_ADE", "ID", "ID", JoinRole::Child))
            .with_property(InjectedProperty::new(Property::simple_attribute(
                "x",
                "bldg",
                "X",
                SimpleType::String,
            )));

        let err = mapping.add_injection(injection).unwrap_err();
        assert_eq!(err, MappingError::missing("simple attribute 'x'", "base"));
    }

    #[test]
    fn test_injection_context_gate() {
        let mut mapping = fixtures::validated();
        // gml only offers a CityGML 2.0 namespace.
        let injection = PropertyInjection::new("MY_ADE", Join::new("MY_ADE", "ID", "ID", JoinRole::Child))
            .with_default_base("Building")
            .with_property(
                InjectedProperty::new(Property::simple_attribute("x", "gml", "X", SimpleType::String))
                    .with_context(CityGMLContext::CityGML1),
            );

        let err = mapping.add_injection(injection).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::SemanticGate);
        assert!(mapping.injection_handles().next().is_none());
    }

    #[test]
    fn test_injected_property_gets_base_join() {
        let mapping = fixtures::merged();
        let injection = mapping.injection_handles().next().unwrap();
        let injection = mapping.injection(injection).unwrap();

        for injected in &injection.properties {
            assert_eq!(injected.base_join(), injection.join.as_ref());
        }
    }
}
