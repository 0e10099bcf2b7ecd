//! Serialized shape of mapping documents.
//!
//! Every cross-reference is the id of the referenced entity. Schemas, joins
//! and value types are written as-is.

use serde::{Deserialize, Serialize};

use crate::mapping::{
    AbstractJoin, CityGMLContext, GeometryType, Join, Metadata, RelationType, Schema, SimpleType,
};

fn is_false(value: &bool) -> bool {
    !*value
}

/// A complete mapping document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDocument {
    /// Mapping metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Application schemas.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<Schema>,
    /// Global complex attribute types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complex_attribute_types: Vec<AttributeTypeDoc>,
    /// Global complex types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complex_types: Vec<ComplexTypeDoc>,
    /// Object types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_types: Vec<ObjectTypeDoc>,
    /// Feature types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_types: Vec<ObjectTypeDoc>,
    /// Property injections.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_injections: Vec<InjectionDoc>,
}

/// Base type link of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDoc {
    /// Id of the base type.
    pub base: String,
    /// Join to the base table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<Join>,
}

/// An object or feature type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTypeDoc {
    pub id: String,
    pub path: String,
    pub schema: String,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_class_id: Option<i32>,
    #[serde(rename = "abstract", default, skip_serializing_if = "is_false")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub top_level: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queryable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<ExtensionDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDoc>,
}

/// A global or inline complex type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexTypeDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub path: String,
    pub schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "is_false")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queryable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<ExtensionDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDoc>,
}

/// A global or inline complex attribute type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeTypeDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default)]
    pub attributes: Vec<PropertyDoc>,
}

/// A property of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDoc {
    pub path: String,
    pub schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queryable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_occurs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<AbstractJoin>,
    #[serde(flatten)]
    pub kind: PropertyKindDoc,
}

/// Storage binding of a property, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PropertyKindDoc {
    SimpleAttribute {
        column: String,
        #[serde(rename = "type")]
        simple_type: SimpleType,
    },
    #[serde(rename_all = "camelCase")]
    ComplexAttribute {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        type_ref: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inline_type: Option<Box<AttributeTypeDoc>>,
    },
    #[serde(rename_all = "camelCase")]
    ObjectProperty {
        target: String,
        #[serde(default)]
        relation_type: RelationType,
    },
    #[serde(rename_all = "camelCase")]
    FeatureProperty {
        target: String,
        #[serde(default)]
        relation_type: RelationType,
    },
    #[serde(rename_all = "camelCase")]
    ComplexProperty {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        type_ref: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inline_type: Option<Box<ComplexTypeDoc>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        relation_type: Option<RelationType>,
    },
    #[serde(rename_all = "camelCase")]
    GeometryProperty {
        #[serde(rename = "type")]
        geometry_type: GeometryType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ref_column: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inline_column: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        srs_dimension: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lod: Option<u8>,
    },
    ImplicitGeometryProperty {
        lod: u8,
    },
}

/// A property injection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionDoc {
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<Join>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_base: Option<String>,
    #[serde(default)]
    pub properties: Vec<InjectedPropertyDoc>,
}

/// A property declared by an injection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectedPropertyDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<CityGMLContext>,
    #[serde(flatten)]
    pub property: PropertyDoc,
}
