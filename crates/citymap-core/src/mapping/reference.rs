//! Arena handles and identifier-based references.
//!
//! Every cross-entity reference in the metamodel is a [`Ref`]. Loaders always
//! produce [`Ref::Unresolved`]; the registry rewrites them into
//! [`Ref::Resolved`] during validation.

use std::fmt;

/// Kind of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    /// Structural type without identity.
    Complex,
    /// Table-backed object type.
    Object,
    /// Table-backed feature type.
    Feature,
}

impl TypeKind {
    /// Label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Complex => "complex type",
            TypeKind::Object => "object type",
            TypeKind::Feature => "feature type",
        }
    }

    /// Whether types of this kind carry an id, table and objectClassId.
    pub fn is_object_kind(&self) -> bool {
        matches!(self, TypeKind::Object | TypeKind::Feature)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Handle of a registered global type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle {
    kind: TypeKind,
    index: usize,
}

impl TypeHandle {
    pub(crate) fn new(kind: TypeKind, index: usize) -> Self {
        Self { kind, index }
    }

    /// Kind of the referenced type.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

/// Handle of a registered application schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaHandle(pub(crate) usize);

/// Handle of a registered global complex attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeTypeHandle(pub(crate) usize);

/// Handle of a registered property injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InjectionHandle(pub(crate) usize);

/// A reference to another registered entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ref<H> {
    /// Identifier recorded by a loader, pending resolution.
    Unresolved(String),
    /// Handle into the registry arena.
    ///
    /// Handles are plain indexes and are only meaningful for the mapping
    /// that issued them. Entities moved to another mapping must carry
    /// identifiers; [`SchemaMapping::merge`](crate::SchemaMapping::merge)
    /// converts them on its own.
    Resolved(H),
}

impl<H: Copy> Ref<H> {
    /// Create an unresolved reference to the given id.
    pub fn unresolved(id: impl Into<String>) -> Self {
        Ref::Unresolved(id.into())
    }

    /// Whether the reference points at a registered entity.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Ref::Resolved(_))
    }

    /// The resolved handle, if any.
    pub fn handle(&self) -> Option<H> {
        match self {
            Ref::Resolved(handle) => Some(*handle),
            Ref::Unresolved(_) => None,
        }
    }

    /// The pending identifier, if unresolved.
    pub fn unresolved_id(&self) -> Option<&str> {
        match self {
            Ref::Unresolved(id) => Some(id),
            Ref::Resolved(_) => None,
        }
    }
}

impl<H> From<&str> for Ref<H> {
    fn from(id: &str) -> Self {
        Ref::Unresolved(id.to_string())
    }
}

impl<H> From<String> for Ref<H> {
    fn from(id: String) -> Self {
        Ref::Unresolved(id)
    }
}

/// Visitor over every reference field reachable from an entity.
///
/// Implemented by the registry to detach references before merging and to
/// check that no placeholder survives validation.
pub trait RefVisitor {
    /// Visit a schema reference.
    fn visit_schema(&mut self, reference: &mut Ref<SchemaHandle>);

    /// Visit a type reference expected to point at a type of `kind`.
    fn visit_type(&mut self, reference: &mut Ref<TypeHandle>, kind: TypeKind);

    /// Visit a complex attribute type reference.
    fn visit_attribute_type(&mut self, reference: &mut Ref<AttributeTypeHandle>);
}
