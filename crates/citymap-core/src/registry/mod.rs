//! The schema mapping registry.
//!
//! [`SchemaMapping`] owns every entity of a mapping in per-kind arenas and
//! addresses them by handle. Loading is two-phase: a loader inserts entities
//! whose references are still identifiers, then [`SchemaMapping::validate`]
//! resolves and checks everything in one pass. Single entities are added to
//! a live mapping with the `add_*` methods, whole mappings are folded in with
//! [`SchemaMapping::merge`]. Validation, adds and merges either succeed as a
//! whole or leave the mapping untouched.

mod detach;
#[cfg(test)]
pub(crate) mod fixtures;
mod hierarchy;
mod query;
mod resolve;

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::error::MappingError;
use crate::mapping::{
    AttributeTypeHandle, ComplexAttributeType, ComplexType, FeatureType, InjectionHandle, Metadata,
    ObjectType, PropertyInjection, Schema, SchemaHandle, TypeHandle, TypeKind,
};

/// Lifecycle state of a [`SchemaMapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingState {
    /// Nothing registered yet.
    #[default]
    Empty,
    /// Entities inserted but not validated.
    Loaded,
    /// All references resolved and all invariants hold.
    Validated,
    /// Validated after folding in the given number of other mappings.
    Merged(usize),
}

impl MappingState {
    /// Whether the mapping passed validation.
    pub fn is_validated(&self) -> bool {
        matches!(self, MappingState::Validated | MappingState::Merged(_))
    }
}

/// Attachment of an injected property to a base feature type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InjectedSlot {
    /// Declaring injection.
    pub injection: InjectionHandle,
    /// Index of the property within the injection.
    pub property: usize,
}

/// Arena lengths taken before staging, marking the entities still to validate.
#[derive(Debug, Clone, Copy, Default)]
struct Watermark {
    schemas: usize,
    attribute_types: usize,
    complex_types: usize,
    object_types: usize,
    feature_types: usize,
    injections: usize,
}

/// Registry of a complete schema mapping.
///
/// A validated mapping is plain data and can be shared read-only across
/// threads, e.g. behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct SchemaMapping {
    metadata: Option<Metadata>,
    schemas: Vec<Schema>,
    attribute_types: Vec<ComplexAttributeType>,
    complex_types: Vec<ComplexType>,
    object_types: Vec<ObjectType>,
    feature_types: Vec<FeatureType>,
    injections: Vec<PropertyInjection>,
    schema_ids: HashMap<String, usize>,
    attribute_type_ids: HashMap<String, usize>,
    complex_type_ids: HashMap<String, usize>,
    object_type_ids: HashMap<String, usize>,
    feature_type_ids: HashMap<String, usize>,
    namespaces: HashMap<String, SchemaHandle>,
    injected: HashMap<TypeHandle, Vec<InjectedSlot>>,
    state: MappingState,
}

impl SchemaMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.set_metadata(Some(metadata));
        self
    }

    /// Replace the metadata; checked by the next validation.
    pub fn set_metadata(&mut self, metadata: Option<Metadata>) {
        self.metadata = metadata;
        self.mark_loaded();
    }

    /// Lifecycle state.
    pub fn state(&self) -> MappingState {
        self.state
    }

    /// Number of mappings merged into this one.
    pub fn merge_count(&self) -> usize {
        match self.state {
            MappingState::Merged(count) => count,
            _ => 0,
        }
    }

    // Raw loading

    /// Insert a schema without validation.
    pub fn insert_schema(&mut self, schema: Schema) -> SchemaHandle {
        self.mark_loaded();
        self.stage_schema(schema)
    }

    /// Insert a global complex attribute type without validation.
    pub fn insert_attribute_type(&mut self, attribute_type: ComplexAttributeType) -> AttributeTypeHandle {
        self.mark_loaded();
        self.stage_attribute_type(attribute_type)
    }

    /// Insert a global complex type without validation.
    pub fn insert_complex_type(&mut self, complex_type: ComplexType) -> TypeHandle {
        self.mark_loaded();
        self.stage_complex_type(complex_type)
    }

    /// Insert an object type without validation.
    pub fn insert_object_type(&mut self, object_type: ObjectType) -> TypeHandle {
        self.mark_loaded();
        self.stage_object_type(TypeKind::Object, object_type)
    }

    /// Insert a feature type without validation.
    pub fn insert_feature_type(&mut self, feature_type: FeatureType) -> TypeHandle {
        self.mark_loaded();
        self.stage_object_type(TypeKind::Feature, feature_type)
    }

    /// Insert a property injection without validation.
    pub fn insert_injection(&mut self, injection: PropertyInjection) -> InjectionHandle {
        self.mark_loaded();
        self.stage_injection(injection)
    }

    // Validated adds

    /// Add and validate a schema.
    pub fn add_schema(&mut self, schema: Schema) -> Result<SchemaHandle, MappingError> {
        self.add(|mapping| mapping.stage_schema(schema))
    }

    /// Add and validate a global complex attribute type.
    ///
    /// Every entity the attribute type refers to must already be registered.
    pub fn add_attribute_type(
        &mut self,
        attribute_type: ComplexAttributeType,
    ) -> Result<AttributeTypeHandle, MappingError> {
        self.add(|mapping| mapping.stage_attribute_type(attribute_type))
    }

    /// Add and validate a global complex type.
    pub fn add_complex_type(&mut self, complex_type: ComplexType) -> Result<TypeHandle, MappingError> {
        self.add(|mapping| mapping.stage_complex_type(complex_type))
    }

    /// Add and validate an object type.
    pub fn add_object_type(&mut self, object_type: ObjectType) -> Result<TypeHandle, MappingError> {
        self.add(|mapping| mapping.stage_object_type(TypeKind::Object, object_type))
    }

    /// Add and validate a feature type.
    pub fn add_feature_type(&mut self, feature_type: FeatureType) -> Result<TypeHandle, MappingError> {
        self.add(|mapping| mapping.stage_object_type(TypeKind::Feature, feature_type))
    }

    /// Add and validate a property injection, attaching its properties.
    pub fn add_injection(&mut self, injection: PropertyInjection) -> Result<InjectionHandle, MappingError> {
        self.add(|mapping| mapping.stage_injection(injection))
    }

    /// Resolve every reference and check every invariant.
    ///
    /// Re-running validation on a validated mapping is a no-op.
    pub fn validate(&mut self) -> Result<(), MappingError> {
        let mut next = self.clone();
        next.validate_from(Watermark::default())?;
        next.state = match next.state {
            MappingState::Merged(count) => MappingState::Merged(count),
            _ => MappingState::Validated,
        };
        info!(
            schemas = next.schemas.len(),
            complex_types = next.complex_types.len(),
            object_types = next.object_types.len(),
            feature_types = next.feature_types.len(),
            injections = next.injections.len(),
            "Schema mapping validated"
        );
        *self = next;
        Ok(())
    }

    /// Fold another mapping into this one.
    ///
    /// Metadata is dropped. Every entity of `other` is staged with its
    /// references turned back into identifiers, so references may cross
    /// between the two mappings. Entities identical to registered ones are
    /// skipped. A receiving mapping that was never validated is validated
    /// as a whole.
    pub fn merge(&mut self, other: &SchemaMapping) -> Result<(), MappingError> {
        let mut next = self.clone();
        next.metadata = None;
        let mark = if self.state.is_validated() {
            next.watermark()
        } else {
            Watermark::default()
        };

        for schema in &other.schemas {
            next.stage_schema(schema.clone());
        }
        for index in 0..other.attribute_types.len() {
            next.stage_attribute_type(other.detached_attribute_type(index));
        }
        for index in 0..other.complex_types.len() {
            next.stage_complex_type(other.detached_complex_type(index));
        }
        for index in 0..other.object_types.len() {
            next.stage_object_type(TypeKind::Object, other.detached_object_type(TypeKind::Object, index));
        }
        for index in 0..other.feature_types.len() {
            next.stage_object_type(TypeKind::Feature, other.detached_object_type(TypeKind::Feature, index));
        }
        for index in 0..other.injections.len() {
            next.stage_injection(other.detached_injection(index));
        }

        next.validate_from(mark)?;
        let count = self.merge_count() + 1;
        next.state = MappingState::Merged(count);

        info!(
            merge_count = count,
            schemas = next.schemas.len() - mark.schemas,
            complex_types = next.complex_types.len() - mark.complex_types,
            object_types = next.object_types.len() - mark.object_types,
            feature_types = next.feature_types.len() - mark.feature_types,
            injections = next.injections.len() - mark.injections,
            "Schema mapping merged"
        );
        *self = next;
        Ok(())
    }

    fn add<H>(&mut self, stage: impl FnOnce(&mut SchemaMapping) -> H) -> Result<H, MappingError> {
        let mut next = self.clone();
        let mark = next.watermark();
        let handle = stage(&mut next);
        next.validate_from(mark)?;
        if next.state == MappingState::Empty {
            next.state = MappingState::Validated;
        }
        *self = next;
        Ok(handle)
    }

    fn mark_loaded(&mut self) {
        self.state = MappingState::Loaded;
    }

    fn watermark(&self) -> Watermark {
        Watermark {
            schemas: self.schemas.len(),
            attribute_types: self.attribute_types.len(),
            complex_types: self.complex_types.len(),
            object_types: self.object_types.len(),
            feature_types: self.feature_types.len(),
            injections: self.injections.len(),
        }
    }

    // Staging appends entities and indexes them by id. An entity equal to a
    // registered one with the same identity is not appended twice.

    fn stage_schema(&mut self, mut schema: Schema) -> SchemaHandle {
        schema.clear_members();
        if let Some(&index) = self.schema_ids.get(&schema.id) {
            if self.schemas[index] == schema {
                return SchemaHandle(index);
            }
        }
        let index = self.schemas.len();
        self.schema_ids.entry(schema.id.clone()).or_insert(index);
        self.schemas.push(schema);
        SchemaHandle(index)
    }

    fn stage_attribute_type(&mut self, mut attribute_type: ComplexAttributeType) -> AttributeTypeHandle {
        self.detach_attribute_type(&mut attribute_type);
        if let Some(&index) = attribute_type.id.as_ref().and_then(|id| self.attribute_type_ids.get(id)) {
            if self.detached_attribute_type(index) == attribute_type {
                return AttributeTypeHandle(index);
            }
        }
        let index = self.attribute_types.len();
        if let Some(id) = &attribute_type.id {
            self.attribute_type_ids.entry(id.clone()).or_insert(index);
        }
        self.attribute_types.push(attribute_type);
        AttributeTypeHandle(index)
    }

    fn stage_complex_type(&mut self, mut complex_type: ComplexType) -> TypeHandle {
        self.detach_complex_type(&mut complex_type);
        if let Some(&index) = complex_type.id.as_ref().and_then(|id| self.complex_type_ids.get(id)) {
            if self.detached_complex_type(index) == complex_type {
                return TypeHandle::new(TypeKind::Complex, index);
            }
        }
        let index = self.complex_types.len();
        if let Some(id) = &complex_type.id {
            self.complex_type_ids.entry(id.clone()).or_insert(index);
        }
        self.complex_types.push(complex_type);
        TypeHandle::new(TypeKind::Complex, index)
    }

    fn stage_object_type(&mut self, kind: TypeKind, mut object_type: ObjectType) -> TypeHandle {
        self.detach_object_type(kind, &mut object_type);
        if let Some(&index) = self.type_ids(kind).get(&object_type.id) {
            if self.detached_object_type(kind, index) == object_type {
                return TypeHandle::new(kind, index);
            }
        }
        let (arena, ids) = match kind {
            TypeKind::Feature => (&mut self.feature_types, &mut self.feature_type_ids),
            _ => (&mut self.object_types, &mut self.object_type_ids),
        };
        let index = arena.len();
        ids.entry(object_type.id.clone()).or_insert(index);
        arena.push(object_type);
        TypeHandle::new(kind, index)
    }

    fn stage_injection(&mut self, mut injection: PropertyInjection) -> InjectionHandle {
        self.detach_injection(&mut injection);
        if let Some(index) = (0..self.injections.len()).find(|&i| self.detached_injection(i) == injection) {
            return InjectionHandle(index);
        }
        self.injections.push(injection);
        InjectionHandle(self.injections.len() - 1)
    }

    fn type_ids(&self, kind: TypeKind) -> &HashMap<String, usize> {
        match kind {
            TypeKind::Feature => &self.feature_type_ids,
            TypeKind::Object => &self.object_type_ids,
            TypeKind::Complex => &self.complex_type_ids,
        }
    }

    /// Validate everything staged at or after `mark`.
    ///
    /// Collection-wide invariants are re-checked over the full mapping.
    fn validate_from(&mut self, mark: Watermark) -> Result<(), MappingError> {
        if let Some(metadata) = &self.metadata {
            metadata.validate()?;
        }

        for schema in &self.schemas[mark.schemas..] {
            schema.validate()?;
        }
        check_unique_ids("schema", self.schemas.iter().map(|s| Some(s.id.as_str())))?;
        self.index_namespaces()?;

        for index in mark.attribute_types..self.attribute_types.len() {
            self.validate_attribute_type(index)?;
        }
        check_unique_ids(
            "complex attribute type",
            self.attribute_types.iter().map(|t| t.id.as_deref()),
        )?;

        for index in mark.complex_types..self.complex_types.len() {
            self.validate_complex_type(index)?;
        }
        check_unique_ids("complex type", self.complex_types.iter().map(|t| t.id.as_deref()))?;

        for index in mark.object_types..self.object_types.len() {
            self.validate_object_type(TypeKind::Object, index)?;
        }
        check_unique_ids("object type", self.object_types.iter().map(|t| Some(t.id.as_str())))?;
        self.check_unique_object_class_ids()?;

        for index in mark.feature_types..self.feature_types.len() {
            self.validate_object_type(TypeKind::Feature, index)?;
        }
        check_unique_ids("feature type", self.feature_types.iter().map(|t| Some(t.id.as_str())))?;
        self.check_unique_object_class_ids()?;

        self.check_extension_cycles()?;

        for index in mark.injections..self.injections.len() {
            self.validate_injection(index)?;
        }

        self.check_resolved_from(mark)
    }

    fn index_namespaces(&mut self) -> Result<(), MappingError> {
        let mut namespaces: HashMap<String, SchemaHandle> = HashMap::new();
        for (index, schema) in self.schemas.iter().enumerate() {
            for namespace in &schema.namespaces {
                if let Some(other) = namespaces.insert(namespace.uri.clone(), SchemaHandle(index)) {
                    if other.0 != index {
                        return Err(MappingError::invariant(
                            format!("schema '{}'", schema.id),
                            format!(
                                "namespace '{}' is already declared by schema '{}'",
                                namespace.uri, self.schemas[other.0].id
                            ),
                        ));
                    }
                }
            }
        }
        self.namespaces = namespaces;
        Ok(())
    }

    fn check_unique_object_class_ids(&self) -> Result<(), MappingError> {
        let mut seen: HashMap<i32, &str> = HashMap::new();
        for object_type in self.object_types.iter().chain(&self.feature_types) {
            if let Some(object_class_id) = object_type.object_class_id {
                if let Some(first) = seen.insert(object_class_id, &object_type.id) {
                    return Err(MappingError::DuplicateObjectClassId {
                        object_class_id,
                        first: first.to_string(),
                        second: object_type.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_extension_cycles(&self) -> Result<(), MappingError> {
        for handle in self.type_handles() {
            let mut visited = HashSet::from([handle]);
            let mut current = self.base_of(handle);
            while let Some(base) = current {
                if !visited.insert(base) {
                    return Err(MappingError::invariant(
                        self.describe_type(handle),
                        "the extension hierarchy contains a cycle",
                    ));
                }
                current = self.base_of(base);
            }
        }
        Ok(())
    }

    fn attach(&mut self, base: TypeHandle, slot: InjectedSlot) {
        let slots = self.injected.entry(base).or_default();
        if !slots.contains(&slot) {
            slots.push(slot);
            debug!(
                base = %self.describe_type(base),
                injection = slot.injection.0,
                property = slot.property,
                "Attached injected property"
            );
        }
    }
}

fn check_unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = Option<&'a str>>,
) -> Result<(), MappingError> {
    let mut seen = HashSet::new();
    for id in ids.flatten() {
        if !seen.insert(id) {
            return Err(MappingError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::fixtures::{self, BLDG_2};
    use super::*;
    use crate::error::ErrorCategory;
    use crate::mapping::{CityGMLContext, Extension, Namespace, Property, Ref, RelationType, SimpleType};

    #[test]
    fn test_state_transitions() {
        let mut mapping = SchemaMapping::new();
        assert_eq!(mapping.state(), MappingState::Empty);

        let mut mapping_loaded = fixtures::core_mapping();
        assert_eq!(mapping_loaded.state(), MappingState::Loaded);
        mapping_loaded.validate().unwrap();
        assert_eq!(mapping_loaded.state(), MappingState::Validated);
        assert!(mapping_loaded.state().is_validated());

        mapping.validate().unwrap();
        assert_eq!(mapping.state(), MappingState::Validated);
        assert_eq!(mapping.merge_count(), 0);
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut mapping = fixtures::merged();
        let part = mapping.feature_type_handle("BuildingPart").unwrap();
        let properties = mapping.properties(part).len();
        assert_eq!(properties, 1);

        mapping.validate().unwrap();
        mapping.validate().unwrap();

        assert!(mapping.unresolved_references().is_empty());
        assert_eq!(mapping.properties(part).len(), properties);
        assert_eq!(mapping.state(), MappingState::Merged(1));
    }

    #[test]
    fn test_validate_rejects_unknown_schema() {
        let mut mapping = fixtures::core_mapping();
        mapping.insert_feature_type(ObjectType::new("Tunnel", "Tunnel", "tun", "TUNNEL", 85));

        let err = mapping.validate().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Referential);
        assert!(err.to_string().contains("schema 'tun'"));
        assert_eq!(mapping.state(), MappingState::Loaded);
    }

    #[test]
    fn test_failed_validate_leaves_mapping_untouched() {
        let mut mapping = fixtures::core_mapping();
        mapping.insert_object_type(ObjectType::new("Broken", "Broken", "core", "", 900));

        assert!(mapping.validate().is_err());
        assert!(!mapping.unresolved_references().is_empty());
    }

    #[test]
    fn test_add_deduplicates_by_identity() {
        let mut mapping = fixtures::validated();
        let address = mapping.object_type_handle("Address").unwrap();
        let again = mapping.add_object_type(fixtures::address()).unwrap();

        assert_eq!(address, again);
        assert_eq!(mapping.object_type_handles().count(), 1);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut mapping = fixtures::validated();
        let other = ObjectType::new("Address", "Address", "core", "ADDRESS_2", 900);

        let err = mapping.add_object_type(other).unwrap_err();
        assert_eq!(
            err,
            MappingError::DuplicateId {
                kind: "object type",
                id: "Address".into()
            }
        );
        assert_eq!(mapping.object_type_handles().count(), 1);
    }

    #[test]
    fn test_add_rejects_duplicate_object_class_id() {
        let mut mapping = fixtures::validated();
        mapping
            .add_object_type(ObjectType::new("Appearance", "Appearance", "core", "APPEARANCE", 40))
            .unwrap();

        let err = mapping
            .add_object_type(ObjectType::new("Material", "X3DMaterial", "core", "SURFACE_DATA", 40))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "objectClassId 40 is assigned to both 'Appearance' and 'Material'"
        );
        assert!(mapping.object_type_handle("Material").is_none());
    }

    #[test]
    fn test_add_resolves_against_registered_entities() {
        let mut mapping = fixtures::validated();
        let house = FeatureType::new("House", "House", "bldg", "HOUSE", 900)
            .with_extension(Extension::new("Building"))
            .with_property(Property::simple_attribute("rooms", "bldg", "ROOMS", SimpleType::Integer));

        let handle = mapping.add_feature_type(house).unwrap();
        let building = mapping.feature_type_handle("Building").unwrap();

        assert!(mapping.is_sub_type_of(handle, building));
        assert!(mapping.unresolved_references().is_empty());
        let bldg = mapping.schema_by_id("bldg").unwrap();
        assert!(mapping.schema(bldg).unwrap().members().feature_types.contains(&handle));
    }

    #[test]
    fn test_add_rejects_forward_reference() {
        let mut mapping = fixtures::validated();
        let house = FeatureType::new("House", "House", "bldg", "HOUSE", 900)
            .with_property(Property::feature("garage", "bldg", "Garage", RelationType::Aggregation));

        let err = mapping.add_feature_type(house).unwrap_err();
        assert_eq!(err, MappingError::unresolved("feature property 'garage'", "feature type", "Garage"));
    }

    #[test]
    fn test_shared_namespace_is_rejected() {
        let mut mapping = fixtures::validated();
        let clash = Schema::new("bldg2", Namespace::new(BLDG_2, CityGMLContext::CityGML2));

        let err = mapping.add_schema(clash).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Invariant);
    }

    #[test]
    fn test_extension_cycle_is_rejected() {
        let mut mapping = SchemaMapping::new();
        mapping.insert_schema(Schema::new("core", Namespace::new("urn:core", CityGMLContext::CityGML2)));
        mapping.insert_complex_type(
            ComplexType::global("A", "A", "core").with_extension(Extension::new("B")),
        );
        mapping.insert_complex_type(
            ComplexType::global("B", "B", "core").with_extension(Extension::new("A")),
        );

        let err = mapping.validate().unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_self_extension_is_rejected() {
        let mut mapping = SchemaMapping::new();
        mapping.insert_schema(Schema::new("core", Namespace::new("urn:core", CityGMLContext::CityGML2)));
        mapping.insert_complex_type(
            ComplexType::global("A", "A", "core").with_extension(Extension::new("A")),
        );

        assert!(mapping.validate().is_err());
    }

    #[test]
    fn test_invalid_metadata_is_rejected() {
        let mut mapping = fixtures::core_mapping();
        mapping.set_metadata(Some(Metadata::new("citydb", "too_long")));

        let err = mapping.validate().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Invariant);
    }

    #[test]
    fn test_merge_extension_mapping() {
        let mut mapping = fixtures::validated();
        mapping.merge(&fixtures::ade_mapping()).unwrap();

        assert_eq!(mapping.state(), MappingState::Merged(1));
        assert!(mapping.metadata().is_none());
        assert!(mapping.unresolved_references().is_empty());

        let industrial = mapping.feature_type_handle("IndustrialBuilding").unwrap();
        let building = mapping.feature_type_handle("Building").unwrap();
        assert!(mapping.is_sub_type_of(industrial, building));
        assert!(mapping.schema_by_namespace(fixtures::TEST_ADE).is_some());
    }

    #[test]
    fn test_merge_skips_identical_entities() {
        let mut mapping = fixtures::validated();
        let copy = fixtures::validated();
        let feature_types = mapping.feature_type_handles().count();

        mapping.merge(&copy).unwrap();

        assert_eq!(mapping.feature_type_handles().count(), feature_types);
        assert_eq!(mapping.schemas().count(), copy.schemas().count());
        assert_eq!(mapping.injection_handles().count(), copy.injection_handles().count());
        assert_eq!(mapping.merge_count(), 1);
    }

    #[test]
    fn test_failed_merge_leaves_mapping_untouched() {
        let mut mapping = fixtures::validated();
        let mut other = SchemaMapping::new();
        other.insert_feature_type(FeatureType::new("Orphan", "Orphan", "bldg", "ORPHAN", 901)
            .with_extension(Extension::new("Missing")));

        assert!(mapping.merge(&other).is_err());
        assert!(mapping.feature_type_handle("Orphan").is_none());
        assert_eq!(mapping.state(), MappingState::Validated);
        assert!(mapping.metadata().is_some());
    }

    #[test]
    fn test_merge_validates_loaded_receiver() {
        let mut mapping = SchemaMapping::new();
        mapping.insert_schema(Schema::new("bldg", Namespace::new(BLDG_2, CityGMLContext::CityGML2)));
        mapping.insert_feature_type(
            FeatureType::new("Orphan", "Orphan", "bldg", "ORPHAN", 901).with_extension(Extension::new("Missing")),
        );

        let err = mapping.merge(&SchemaMapping::new()).unwrap_err();

        assert_eq!(err, MappingError::unresolved("feature type 'Orphan'", "feature type", "Missing"));
        assert_eq!(mapping.state(), MappingState::Loaded);
        assert!(!mapping.state().is_validated());
        assert_eq!(mapping.unresolved_references().len(), 2);
    }

    #[test]
    fn test_merge_into_loaded_mapping_resolves_everything() {
        let mut mapping = fixtures::core_mapping();
        assert_eq!(mapping.state(), MappingState::Loaded);

        mapping.merge(&fixtures::ade_mapping()).unwrap();

        assert_eq!(mapping.state(), MappingState::Merged(1));
        assert!(mapping.unresolved_references().is_empty());
        let part = mapping.feature_type_handle("BuildingPart").unwrap();
        assert!(mapping.get_property(part, "floorArea", None, true).is_some());
    }

    #[test]
    fn test_validate_rejects_object_class_id_shared_by_object_and_feature_type() {
        let mut mapping = fixtures::core_mapping();
        mapping.insert_object_type(ObjectType::new("Appearance", "Appearance", "core", "APPEARANCE", 700));
        mapping.insert_feature_type(FeatureType::new("Tunnel", "Tunnel", "core", "TUNNEL", 700));

        let err = mapping.validate().unwrap_err();

        assert_eq!(
            err,
            MappingError::DuplicateObjectClassId {
                object_class_id: 700,
                first: "Appearance".into(),
                second: "Tunnel".into(),
            }
        );
        assert_eq!(err.category(), ErrorCategory::Invariant);
        assert_eq!(mapping.state(), MappingState::Loaded);
    }

    #[test]
    fn test_validate_rejects_negative_object_class_id() {
        let mut mapping = fixtures::core_mapping();
        mapping.insert_feature_type(FeatureType::new("Tunnel", "Tunnel", "core", "TUNNEL", -3));

        let err = mapping.validate().unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Invariant);
        assert_eq!(
            err,
            MappingError::invariant("feature type 'Tunnel'", "objectClassId -3 must not be negative")
        );
    }

    #[test]
    fn test_add_rejects_handle_past_the_arena() {
        let mut mapping = fixtures::validated();
        let base = Ref::Resolved(TypeHandle::new(TypeKind::Feature, 99));
        let house = FeatureType::new("House", "House", "bldg", "HOUSE", 900).with_extension(Extension::new(base));

        let err = mapping.add_feature_type(house).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Invariant);
        assert!(err.to_string().contains("unregistered feature type"));
        assert!(mapping.feature_type_handle("House").is_none());
    }

    #[test]
    fn test_add_rejects_handle_of_other_kind() {
        let mut mapping = fixtures::validated();
        let address = mapping.object_type_handle("Address").unwrap();
        let house =
            FeatureType::new("House", "House", "bldg", "HOUSE", 900).with_extension(Extension::new(Ref::Resolved(address)));

        let err = mapping.add_feature_type(house).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Invariant);
        assert!(err.to_string().contains("expected a feature type"));
        assert!(mapping.feature_type_handle("House").is_none());
    }
}
