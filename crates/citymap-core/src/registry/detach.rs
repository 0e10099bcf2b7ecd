//! Turning resolved references back into identifiers.
//!
//! Entities copied between mappings, or compared for identity, must not carry
//! handles into a foreign arena or values derived during validation. Detached
//! copies hold identifiers only and compare equal to freshly loaded entities.

use super::{SchemaMapping, Watermark};
use crate::error::MappingError;
use crate::mapping::{
    AttributeTypeHandle, ComplexAttributeType, ComplexType, ObjectType, Property, PropertyInjection, PropertyKind,
    Ref, RefVisitor, SchemaHandle, TypeHandle, TypeKind, SELF_PATH,
};

/// Replaces handles of `mapping` with the ids they point at.
struct Detacher<'a> {
    mapping: &'a SchemaMapping,
}

impl RefVisitor for Detacher<'_> {
    fn visit_schema(&mut self, reference: &mut Ref<SchemaHandle>) {
        let id = reference
            .handle()
            .and_then(|handle| self.mapping.schema(handle))
            .map(|schema| schema.id.clone());
        if let Some(id) = id {
            *reference = Ref::Unresolved(id);
        }
    }

    fn visit_type(&mut self, reference: &mut Ref<TypeHandle>, kind: TypeKind) {
        // Handles of the wrong kind or past the arena stay resolved and are
        // reported by validation.
        let id = reference
            .handle()
            .filter(|handle| handle.kind() == kind)
            .and_then(|handle| self.mapping.type_id(handle))
            .map(str::to_string);
        if let Some(id) = id {
            *reference = Ref::Unresolved(id);
        }
    }

    fn visit_attribute_type(&mut self, reference: &mut Ref<AttributeTypeHandle>) {
        let id = reference
            .handle()
            .and_then(|handle| self.mapping.attribute_type(handle))
            .and_then(|attribute_type| attribute_type.id.clone());
        if let Some(id) = id {
            *reference = Ref::Unresolved(id);
        }
    }
}

/// Collects references that are still identifiers.
#[derive(Default)]
struct Unresolved {
    found: Vec<(&'static str, String)>,
}

impl RefVisitor for Unresolved {
    fn visit_schema(&mut self, reference: &mut Ref<SchemaHandle>) {
        if let Some(id) = reference.unresolved_id() {
            self.found.push(("schema", id.to_string()));
        }
    }

    fn visit_type(&mut self, reference: &mut Ref<TypeHandle>, kind: TypeKind) {
        if let Some(id) = reference.unresolved_id() {
            self.found.push((kind.label(), id.to_string()));
        }
    }

    fn visit_attribute_type(&mut self, reference: &mut Ref<AttributeTypeHandle>) {
        if let Some(id) = reference.unresolved_id() {
            self.found.push(("complex attribute type", id.to_string()));
        }
    }
}

impl SchemaMapping {
    /// References that do not point at a registered entity yet.
    ///
    /// Empty for every validated mapping.
    pub fn unresolved_references(&self) -> Vec<String> {
        self.collect_unresolved(Watermark::default())
            .into_iter()
            .map(|(owner, kind, id)| format!("{}: {} '{}'", owner, kind, id))
            .collect()
    }

    pub(super) fn check_resolved_from(&self, mark: Watermark) -> Result<(), MappingError> {
        match self.collect_unresolved(mark).into_iter().next() {
            Some((owner, kind, id)) => Err(MappingError::unresolved(owner, kind, id)),
            None => Ok(()),
        }
    }

    fn collect_unresolved(&self, mark: Watermark) -> Vec<(String, &'static str, String)> {
        let mut result = Vec::new();
        let mut record = |owner: String, visitor: Unresolved| {
            result.extend(visitor.found.into_iter().map(|(kind, id)| (owner.clone(), kind, id)));
        };

        for attribute_type in &self.attribute_types[mark.attribute_types..] {
            let mut visitor = Unresolved::default();
            attribute_type.clone().visit_refs(&mut visitor);
            record(attribute_type.describe(), visitor);
        }
        for complex_type in &self.complex_types[mark.complex_types..] {
            let mut visitor = Unresolved::default();
            complex_type.clone().visit_refs(&mut visitor);
            record(
                format!("complex type '{}'", complex_type.id.as_deref().unwrap_or_default()),
                visitor,
            );
        }
        for (kind, arena, start) in [
            (TypeKind::Object, &self.object_types, mark.object_types),
            (TypeKind::Feature, &self.feature_types, mark.feature_types),
        ] {
            for object_type in &arena[start..] {
                let mut visitor = Unresolved::default();
                object_type.clone().visit_refs(kind, &mut visitor);
                record(format!("{} '{}'", kind, object_type.id), visitor);
            }
        }
        for injection in &self.injections[mark.injections..] {
            let mut visitor = Unresolved::default();
            injection.clone().visit_refs(&mut visitor);
            record(injection.describe(), visitor);
        }
        result
    }

    pub(super) fn detach_attribute_type(&self, attribute_type: &mut ComplexAttributeType) {
        attribute_type.visit_refs(&mut Detacher { mapping: self });
        for attribute in &mut attribute_type.attributes {
            reset_derived(attribute);
        }
    }

    pub(super) fn detach_complex_type(&self, complex_type: &mut ComplexType) {
        complex_type.visit_refs(&mut Detacher { mapping: self });
        for property in &mut complex_type.core.properties {
            reset_derived(property);
        }
    }

    pub(super) fn detach_object_type(&self, kind: TypeKind, object_type: &mut ObjectType) {
        object_type.visit_refs(kind, &mut Detacher { mapping: self });
        for property in &mut object_type.core.properties {
            reset_derived(property);
        }
    }

    pub(super) fn detach_injection(&self, injection: &mut PropertyInjection) {
        injection.visit_refs(&mut Detacher { mapping: self });
        for injected in &mut injection.properties {
            injected.clear_base_join();
            reset_derived(&mut injected.property);
        }
    }

    pub(crate) fn detached_attribute_type(&self, index: usize) -> ComplexAttributeType {
        let mut attribute_type = self.attribute_types[index].clone();
        self.detach_attribute_type(&mut attribute_type);
        attribute_type
    }

    pub(crate) fn detached_complex_type(&self, index: usize) -> ComplexType {
        let mut complex_type = self.complex_types[index].clone();
        self.detach_complex_type(&mut complex_type);
        complex_type
    }

    pub(crate) fn detached_object_type(&self, kind: TypeKind, index: usize) -> ObjectType {
        let mut object_type = match kind {
            TypeKind::Feature => self.feature_types[index].clone(),
            _ => self.object_types[index].clone(),
        };
        self.detach_object_type(kind, &mut object_type);
        object_type
    }

    pub(crate) fn detached_injection(&self, index: usize) -> PropertyInjection {
        let mut injection = self.injections[index].clone();
        self.detach_injection(&mut injection);
        injection
    }
}

/// Undo values assigned during validation.
fn reset_derived(property: &mut Property) {
    match &mut property.kind {
        PropertyKind::ComplexAttribute(attribute) => {
            if let Some(inline) = attribute.inline_type.as_deref_mut() {
                for leaf in &mut inline.attributes {
                    if leaf.path() == SELF_PATH {
                        if let PropertyKind::SimpleAttribute(simple) = &mut leaf.kind {
                            simple.name = None;
                        }
                    }
                    reset_derived(leaf);
                }
            }
        }
        PropertyKind::ComplexProperty(complex) => {
            if let Some(inline) = complex.inline_type.as_deref_mut() {
                for nested in &mut inline.core.properties {
                    reset_derived(nested);
                }
            }
        }
        _ => {}
    }
}
