//! Type hierarchy queries.
//!
//! Extension chains are walked through resolved base handles. Property
//! listings combine a type's own properties with the properties injected into
//! it, nearest type first.

use super::SchemaMapping;
use crate::mapping::{
    ComplexType, InjectedProperty, InjectionHandle, PathElement, Property, TypeCore, TypeHandle, TypeKind,
};

impl SchemaMapping {
    /// Common data of a registered type.
    pub fn type_core(&self, handle: TypeHandle) -> Option<&TypeCore> {
        match handle.kind() {
            TypeKind::Complex => self.complex_types.get(handle.index()).map(|t| &t.core),
            TypeKind::Object => self.object_types.get(handle.index()).map(|t| &t.core),
            TypeKind::Feature => self.feature_types.get(handle.index()).map(|t| &t.core),
        }
    }

    /// Whether the type is abstract.
    pub fn is_abstract(&self, handle: TypeHandle) -> bool {
        self.type_core(handle).map_or(false, |core| core.is_abstract)
    }

    pub(super) fn base_of(&self, handle: TypeHandle) -> Option<TypeHandle> {
        self.type_core(handle).and_then(TypeCore::base)
    }

    /// Label of a registered type used in messages.
    pub fn describe_type(&self, handle: TypeHandle) -> String {
        format!("{} '{}'", handle.kind(), self.type_id(handle).unwrap_or("?"))
    }

    /// The extension chain of a type, nearest first.
    pub fn list_super_types(&self, handle: TypeHandle, include_self: bool) -> Vec<TypeHandle> {
        let mut chain = Vec::new();
        if include_self {
            chain.push(handle);
        }
        let mut current = self.base_of(handle);
        while let Some(base) = current {
            if base == handle || chain.contains(&base) {
                break;
            }
            chain.push(base);
            current = self.base_of(base);
        }
        chain
    }

    /// Whether `handle` transitively extends `base`.
    pub fn is_sub_type_of(&self, handle: TypeHandle, base: TypeHandle) -> bool {
        handle != base && self.list_super_types(handle, false).contains(&base)
    }

    /// Whether `handle` is `base` or transitively extends it.
    pub fn is_equal_to_or_sub_type_of(&self, handle: TypeHandle, base: TypeHandle) -> bool {
        handle == base || self.is_sub_type_of(handle, base)
    }

    /// Registered types of the same kind extending the type.
    pub fn list_sub_types(&self, handle: TypeHandle, skip_abstract: bool) -> Vec<TypeHandle> {
        self.handles_of(handle.kind())
            .filter(|&candidate| self.is_sub_type_of(candidate, handle))
            .filter(|&candidate| !skip_abstract || !self.is_abstract(candidate))
            .collect()
    }

    /// Own and injected properties of a type, without inherited ones.
    pub fn properties(&self, handle: TypeHandle) -> Vec<&Property> {
        self.list_properties(handle, false, false)
    }

    /// Properties of a type, optionally filtered and including those of its ancestors.
    ///
    /// For each type of the chain, own properties come first, then injected
    /// ones in attachment order.
    pub fn list_properties(&self, handle: TypeHandle, only_queryable: bool, include_inherited: bool) -> Vec<&Property> {
        let chain = if include_inherited {
            self.list_super_types(handle, true)
        } else {
            vec![handle]
        };

        let mut properties = Vec::new();
        for current in chain {
            let own = self.type_core(current).into_iter().flat_map(|core| &core.properties);
            let injected = self.injected_properties(current).into_iter().map(|(_, injected)| &injected.property);
            properties.extend(
                own.chain(injected)
                    .filter(|property| !only_queryable || self.is_queryable(&property.element)),
            );
        }
        properties
    }

    /// Find a property by local name and optional namespace URI.
    pub fn get_property(
        &self,
        handle: TypeHandle,
        name: &str,
        namespace_uri: Option<&str>,
        include_inherited: bool,
    ) -> Option<&Property> {
        self.list_properties(handle, false, include_inherited)
            .into_iter()
            .find(|property| self.matches_name(&property.element, name, namespace_uri))
    }

    /// Properties injected into the type, with their declaring injection.
    pub fn injected_properties(&self, handle: TypeHandle) -> Vec<(InjectionHandle, &InjectedProperty)> {
        self.injected
            .get(&handle)
            .into_iter()
            .flatten()
            .filter_map(|slot| {
                self.injections
                    .get(slot.injection.0)
                    .and_then(|injection| injection.properties.get(slot.property))
                    .map(|injected| (slot.injection, injected))
            })
            .collect()
    }

    /// Whether an element is queryable, falling back to its schema's default.
    pub fn is_queryable(&self, element: &PathElement) -> bool {
        element
            .queryable
            .or_else(|| {
                element
                    .schema
                    .handle()
                    .and_then(|schema| self.schema(schema))
                    .and_then(|schema| schema.queryable)
            })
            .unwrap_or(true)
    }

    /// Whether an element has the given local name and, if given, belongs to a
    /// schema declaring the namespace URI.
    pub fn matches_name(&self, element: &PathElement, local_name: &str, namespace_uri: Option<&str>) -> bool {
        if !element.matches_local_name(local_name) {
            return false;
        }
        match namespace_uri {
            None => true,
            Some(uri) => element
                .schema
                .handle()
                .and_then(|schema| self.schema(schema))
                .map_or(false, |schema| schema.matches_namespace_uri(uri)),
        }
    }

    /// Whether another object or feature type is stored in the same table.
    pub fn has_shared_table(&self, handle: TypeHandle, skip_abstract: bool) -> bool {
        let table = match self.object_type(handle) {
            Some(object_type) => &object_type.table,
            None => return false,
        };
        self.handles_of(TypeKind::Object)
            .chain(self.handles_of(TypeKind::Feature))
            .filter(|&candidate| candidate != handle)
            .filter(|&candidate| !skip_abstract || !self.is_abstract(candidate))
            .filter_map(|candidate| self.object_type(candidate))
            .any(|candidate| candidate.table.eq_ignore_ascii_case(table))
    }

    /// Table declared directly by a type.
    pub fn table(&self, handle: TypeHandle) -> Option<&str> {
        match handle.kind() {
            TypeKind::Complex => self.complex_type(handle).and_then(|t| t.table.as_deref()),
            _ => self.object_type(handle).map(|t| t.table.as_str()),
        }
    }

    /// Table of a type, inherited from the nearest ancestor declaring one.
    pub fn effective_table(&self, handle: TypeHandle) -> Option<&str> {
        self.list_super_types(handle, true)
            .into_iter()
            .find_map(|current| self.table(current))
    }

    /// Table of an inline complex type, inherited through its extension.
    pub fn inline_effective_table<'a>(&'a self, complex_type: &'a ComplexType) -> Option<&'a str> {
        complex_type
            .table
            .as_deref()
            .or_else(|| complex_type.core.base().and_then(|base| self.effective_table(base)))
    }

    /// Nearest type all given types are equal to or derived from.
    pub fn common_super_type(&self, handles: &[TypeHandle]) -> Option<TypeHandle> {
        let (first, rest) = handles.split_first()?;
        let chains: Vec<Vec<TypeHandle>> = rest.iter().map(|&h| self.list_super_types(h, true)).collect();
        self.list_super_types(*first, true)
            .into_iter()
            .find(|candidate| chains.iter().all(|chain| chain.contains(candidate)))
    }

    pub(super) fn handles_of(&self, kind: TypeKind) -> impl Iterator<Item = TypeHandle> {
        let len = match kind {
            TypeKind::Complex => self.complex_types.len(),
            TypeKind::Object => self.object_types.len(),
            TypeKind::Feature => self.feature_types.len(),
        };
        (0..len).map(move |index| TypeHandle::new(kind, index))
    }

    pub(super) fn type_handles(&self) -> impl Iterator<Item = TypeHandle> + '_ {
        self.handles_of(TypeKind::Complex)
            .chain(self.handles_of(TypeKind::Object))
            .chain(self.handles_of(TypeKind::Feature))
    }
}
