//! Read-only lookups over a schema mapping.

use super::SchemaMapping;
use crate::mapping::{
    AttributeTypeHandle, CityGMLContext, ComplexAttributeType, ComplexType, InjectionHandle, Metadata,
    ObjectType, PropertyInjection, Schema, SchemaHandle, TypeHandle, TypeKind,
};

impl SchemaMapping {
    /// Metadata of the mapping; absent after a merge.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Registered schemas in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.iter()
    }

    /// Handles of all registered schemas.
    pub fn schema_handles(&self) -> impl Iterator<Item = SchemaHandle> {
        (0..self.schemas.len()).map(SchemaHandle)
    }

    /// Schema behind a handle.
    pub fn schema(&self, handle: SchemaHandle) -> Option<&Schema> {
        self.schemas.get(handle.0)
    }

    /// Schema by id.
    pub fn schema_by_id(&self, id: &str) -> Option<SchemaHandle> {
        self.schema_ids.get(id).map(|&index| SchemaHandle(index))
    }

    /// Schema declaring a namespace URI. Available after validation.
    pub fn schema_by_namespace(&self, uri: &str) -> Option<SchemaHandle> {
        self.namespaces.get(uri).copied()
    }

    /// Global complex attribute type behind a handle.
    pub fn attribute_type(&self, handle: AttributeTypeHandle) -> Option<&ComplexAttributeType> {
        self.attribute_types.get(handle.0)
    }

    /// Global complex attribute type by id.
    pub fn attribute_type_handle(&self, id: &str) -> Option<AttributeTypeHandle> {
        self.attribute_type_ids.get(id).map(|&index| AttributeTypeHandle(index))
    }

    /// Handles of all global complex attribute types.
    pub fn attribute_type_handles(&self) -> impl Iterator<Item = AttributeTypeHandle> {
        (0..self.attribute_types.len()).map(AttributeTypeHandle)
    }

    /// Global complex type behind a handle.
    pub fn complex_type(&self, handle: TypeHandle) -> Option<&ComplexType> {
        match handle.kind() {
            TypeKind::Complex => self.complex_types.get(handle.index()),
            _ => None,
        }
    }

    /// Object or feature type behind a handle.
    pub fn object_type(&self, handle: TypeHandle) -> Option<&ObjectType> {
        match handle.kind() {
            TypeKind::Object => self.object_types.get(handle.index()),
            TypeKind::Feature => self.feature_types.get(handle.index()),
            TypeKind::Complex => None,
        }
    }

    /// Property injection behind a handle.
    pub fn injection(&self, handle: InjectionHandle) -> Option<&PropertyInjection> {
        self.injections.get(handle.0)
    }

    /// Id of a registered type.
    pub fn type_id(&self, handle: TypeHandle) -> Option<&str> {
        match handle.kind() {
            TypeKind::Complex => self.complex_type(handle).and_then(|t| t.id.as_deref()),
            _ => self.object_type(handle).map(|t| t.id.as_str()),
        }
    }

    /// Global complex type by id.
    pub fn complex_type_handle(&self, id: &str) -> Option<TypeHandle> {
        self.type_handle(TypeKind::Complex, id)
    }

    /// Object type by id.
    pub fn object_type_handle(&self, id: &str) -> Option<TypeHandle> {
        self.type_handle(TypeKind::Object, id)
    }

    /// Feature type by id.
    pub fn feature_type_handle(&self, id: &str) -> Option<TypeHandle> {
        self.type_handle(TypeKind::Feature, id)
    }

    /// Type of the given kind by id.
    pub fn type_handle(&self, kind: TypeKind, id: &str) -> Option<TypeHandle> {
        self.type_ids(kind)
            .get(id)
            .map(|&index| TypeHandle::new(kind, index))
    }

    /// Handles of all global complex types.
    pub fn complex_type_handles(&self) -> impl Iterator<Item = TypeHandle> {
        self.handles_of(TypeKind::Complex)
    }

    /// Handles of all object types.
    pub fn object_type_handles(&self) -> impl Iterator<Item = TypeHandle> {
        self.handles_of(TypeKind::Object)
    }

    /// Handles of all feature types.
    pub fn feature_type_handles(&self) -> impl Iterator<Item = TypeHandle> {
        self.handles_of(TypeKind::Feature)
    }

    /// Handles of all property injections.
    pub fn injection_handles(&self) -> impl Iterator<Item = InjectionHandle> {
        (0..self.injections.len()).map(InjectionHandle)
    }

    /// Type of the given kind by qualified name.
    ///
    /// Without a namespace URI the first type with a matching local name wins.
    pub fn type_by_name(&self, kind: TypeKind, local_name: &str, namespace_uri: Option<&str>) -> Option<TypeHandle> {
        self.handles_of(kind).find(|&handle| {
            self.type_core(handle)
                .map_or(false, |core| self.matches_name(&core.element, local_name, namespace_uri))
        })
    }

    /// Feature type by qualified name.
    pub fn feature_type_by_name(&self, local_name: &str, namespace_uri: Option<&str>) -> Option<TypeHandle> {
        self.type_by_name(TypeKind::Feature, local_name, namespace_uri)
    }

    /// Object type by qualified name.
    pub fn object_type_by_name(&self, local_name: &str, namespace_uri: Option<&str>) -> Option<TypeHandle> {
        self.type_by_name(TypeKind::Object, local_name, namespace_uri)
    }

    /// Global complex type by qualified name.
    pub fn complex_type_by_name(&self, local_name: &str, namespace_uri: Option<&str>) -> Option<TypeHandle> {
        self.type_by_name(TypeKind::Complex, local_name, namespace_uri)
    }

    /// Object or feature type by objectClassId.
    pub fn type_by_object_class_id(&self, object_class_id: i32) -> Option<TypeHandle> {
        self.object_type_handles()
            .chain(self.feature_type_handles())
            .find(|&handle| {
                self.object_type(handle)
                    .map_or(false, |t| t.object_class_id == Some(object_class_id))
            })
    }

    /// Top-level feature types, optionally restricted to a CityGML version.
    pub fn list_top_level_feature_types(&self, context: Option<CityGMLContext>) -> Vec<TypeHandle> {
        self.feature_type_handles()
            .filter(|&handle| self.object_type(handle).map_or(false, |t| t.top_level))
            .filter(|&handle| match context {
                None => true,
                Some(context) => self
                    .type_core(handle)
                    .and_then(|core| core.element.schema.handle())
                    .and_then(|schema| self.schema(schema))
                    .map_or(false, |schema| schema.has_context(context)),
            })
            .collect()
    }

    /// Feature types stored in a table, including their subtypes.
    ///
    /// When no feature type maps to the table directly, the base types of
    /// property injections stored in it are used instead.
    pub fn list_feature_types_by_table(&self, table: &str, skip_abstract: bool) -> Vec<TypeHandle> {
        let mut handles = self.list_by_table(TypeKind::Feature, table);
        if handles.is_empty() {
            for injection in self.injections.iter().filter(|i| i.table.eq_ignore_ascii_case(table)) {
                let bases = injection
                    .default_base
                    .iter()
                    .chain(injection.properties.iter().filter_map(|p| p.base.as_ref()))
                    .filter_map(|base| base.handle());
                for base in bases {
                    self.push_with_sub_types(&mut handles, base);
                }
            }
        }
        if skip_abstract {
            handles.retain(|&handle| !self.is_abstract(handle));
        }
        handles
    }

    /// Object types stored in a table, including their subtypes.
    pub fn list_object_types_by_table(&self, table: &str, skip_abstract: bool) -> Vec<TypeHandle> {
        let mut handles = self.list_by_table(TypeKind::Object, table);
        if skip_abstract {
            handles.retain(|&handle| !self.is_abstract(handle));
        }
        handles
    }

    fn list_by_table(&self, kind: TypeKind, table: &str) -> Vec<TypeHandle> {
        let mut handles = Vec::new();
        for handle in self.handles_of(kind) {
            let matches = self
                .object_type(handle)
                .map_or(false, |t| t.table.eq_ignore_ascii_case(table));
            if matches {
                self.push_with_sub_types(&mut handles, handle);
            }
        }
        handles
    }

    fn push_with_sub_types(&self, handles: &mut Vec<TypeHandle>, handle: TypeHandle) {
        for candidate in std::iter::once(handle).chain(self.list_sub_types(handle, false)) {
            if !handles.contains(&candidate) {
                handles.push(candidate);
            }
        }
    }
}
