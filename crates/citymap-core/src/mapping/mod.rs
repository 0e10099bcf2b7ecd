//! Schema mapping metamodel.
//!
//! Plain data describing application schemas, types, properties, joins and
//! property injections. Cross-entity references are [`Ref`] values resolved
//! by the [`SchemaMapping`](crate::registry::SchemaMapping) registry.

mod attribute;
mod element;
mod injection;
mod join;
mod property;
mod reference;
mod schema;
mod types;
mod value;
mod visit;

pub use attribute::ComplexAttributeType;
pub use element::{strip_attribute_marker, PathElement, ATTRIBUTE_MARKER, SELF_PATH};
pub use injection::{InjectedProperty, PropertyInjection};
pub use join::{
    validate_join, AbstractJoin, Join, JoinParent, JoinRole, JoinTable, ReverseJoin,
    TARGET_ID_TOKEN, TARGET_OBJECTCLASS_ID_TOKEN, TARGET_TABLE_TOKEN,
};
pub use property::{
    ComplexAttribute, ComplexProperty, GeometryProperty, ImplicitGeometryProperty, Property,
    PropertyKind, SimpleAttribute, TypeReference, DEFAULT_SRS_DIMENSION, MAX_LOD, MIN_LOD,
};
pub use reference::{
    AttributeTypeHandle, InjectionHandle, Ref, RefVisitor, SchemaHandle, TypeHandle, TypeKind,
};
pub use schema::{Schema, SchemaMembers};
pub use types::{element_type, ComplexType, Extension, FeatureType, ObjectType, TypeCore};
pub use value::{
    CityGMLContext, Condition, GeometryType, Metadata, Namespace, PathElementType, RelationType,
    SimpleType, TreeHierarchy, MAX_DB_PREFIX_LENGTH,
};
