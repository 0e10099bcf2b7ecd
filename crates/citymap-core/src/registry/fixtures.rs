//! Mappings shared by the registry tests.

use super::SchemaMapping;
use crate::mapping::{
    CityGMLContext, ComplexAttributeType, ComplexType, Extension, FeatureType, GeometryProperty,
    GeometryType, InjectedProperty, Join, JoinRole, JoinTable, Metadata, Namespace, ObjectType,
    Property, PropertyInjection, RelationType, Schema, SimpleType,
};

pub(crate) const CORE_2: &str = "http://www.opengis.net/citygml/2.0";
pub(crate) const CORE_1: &str = "http://www.opengis.net/citygml/1.0";
pub(crate) const BLDG_2: &str = "http://www.opengis.net/citygml/building/2.0";
pub(crate) const BLDG_1: &str = "http://www.opengis.net/citygml/building/1.0";
pub(crate) const GML: &str = "http://www.opengis.net/gml";
pub(crate) const TEST_ADE: &str = "http://www.citygml.org/ade/TestADE/1.0";

pub(crate) fn address() -> ObjectType {
    ObjectType::new("Address", "Address", "core", "ADDRESS", 58)
        .with_property(Property::simple_attribute("street", "core", "STREET", SimpleType::String))
        .with_property(Property::geometry(
            "multiPoint",
            "core",
            GeometryProperty::new(GeometryType::MultiPoint).with_inline_column("MULTI_POINT"),
        ))
}

/// Core and building module, inserted but not validated.
pub(crate) fn core_mapping() -> SchemaMapping {
    let mut mapping = SchemaMapping::new().with_metadata(Metadata::new("citydb", "cdb").with_version("4.0"));

    mapping.insert_schema(
        Schema::new("core", Namespace::new(CORE_2, CityGMLContext::CityGML2))
            .with_namespace(Namespace::new(CORE_1, CityGMLContext::CityGML1))
            .with_xml_prefix("core"),
    );
    mapping.insert_schema(
        Schema::new("bldg", Namespace::new(BLDG_2, CityGMLContext::CityGML2))
            .with_namespace(Namespace::new(BLDG_1, CityGMLContext::CityGML1))
            .with_xml_prefix("bldg"),
    );
    mapping.insert_schema(Schema::new("gml", Namespace::new(GML, CityGMLContext::CityGML2)));

    mapping.insert_attribute_type(
        ComplexAttributeType::global("CodeType", "gml")
            .with_attribute(Property::simple_attribute(".", "gml", "CODE", SimpleType::String))
            .with_attribute(Property::simple_attribute("@codeSpace", "gml", "CODESPACE", SimpleType::String)),
    );

    mapping.insert_complex_type(
        ComplexType::global("ExternalReference", "ExternalReference", "core")
            .with_table("EXTERNAL_REFERENCE")
            .with_property(Property::simple_attribute(
                "informationSystem",
                "core",
                "INFOSYS",
                SimpleType::String,
            ))
            .with_property(Property::inline_complex(
                "externalObject",
                "core",
                ComplexType::inline("ExternalObjectReference", "core")
                    .with_property(Property::simple_attribute("name", "core", "NAME", SimpleType::String))
                    .with_property(Property::simple_attribute("uri", "core", "URI", SimpleType::String)),
            )),
    );

    mapping.insert_object_type(address());

    mapping.insert_feature_type(
        FeatureType::new("AbstractCityObject", "_CityObject", "core", "CITYOBJECT", 1)
            .with_abstract()
            .with_property(Property::simple_attribute("creationDate", "core", "CREATION_DATE", SimpleType::Date))
            .with_property(
                Property::complex("externalReference", "core", "ExternalReference", RelationType::Composition)
                    .with_join(Join::new("EXTERNAL_REFERENCE", "ID", "CITYOBJECT_ID", JoinRole::Child)),
            ),
    );

    mapping.insert_feature_type(
        FeatureType::new("AbstractBuilding", "_AbstractBuilding", "bldg", "BUILDING", 24)
            .with_abstract()
            .with_extension(
                Extension::new("AbstractCityObject").with_join(Join::new("CITYOBJECT", "ID", "ID", JoinRole::Parent)),
            )
            .with_property(Property::complex_attribute("class", "bldg", "CodeType"))
            .with_property(Property::inline_complex_attribute(
                "measuredHeight",
                "bldg",
                ComplexAttributeType::inline()
                    .with_attribute(Property::simple_attribute(".", "bldg", "MEASURED_HEIGHT", SimpleType::Double))
                    .with_attribute(Property::simple_attribute(
                        "@uom",
                        "bldg",
                        "MEASURED_HEIGHT_UNIT",
                        SimpleType::String,
                    )),
            ))
            .with_property(Property::geometry(
                "lod2Solid",
                "bldg",
                GeometryProperty::new(GeometryType::Solid).with_ref_column("LOD2_SOLID_ID"),
            ))
            .with_property(
                Property::feature("consistsOfBuildingPart", "bldg", "BuildingPart", RelationType::Composition)
                    .with_join(Join::new("BUILDING", "ID", "BUILDING_PARENT_ID", JoinRole::Child)),
            )
            .with_property(
                Property::object("address", "bldg", "Address", RelationType::Composition).with_join(JoinTable::new(
                    "ADDRESS_TO_BUILDING",
                    Join::new("ADDRESS_TO_BUILDING", "ID", "BUILDING_ID", JoinRole::Child),
                    Join::new("ADDRESS", "ADDRESS_ID", "ID", JoinRole::Parent),
                )),
            ),
    );

    mapping.insert_feature_type(
        FeatureType::new("Building", "Building", "bldg", "BUILDING", 26)
            .with_top_level()
            .with_extension(Extension::new("AbstractBuilding")),
    );

    mapping.insert_feature_type(
        FeatureType::new("BuildingPart", "BuildingPart", "bldg", "BUILDING", 25)
            .with_extension(Extension::new("AbstractBuilding")),
    );

    mapping
}

/// The core mapping after validation.
pub(crate) fn validated() -> SchemaMapping {
    let mut mapping = core_mapping();
    mapping.validate().unwrap();
    mapping
}

/// An extension mapping referring into the core mapping.
pub(crate) fn ade_mapping() -> SchemaMapping {
    let mut mapping = SchemaMapping::new();

    mapping.insert_schema(
        Schema::new("test", Namespace::new(TEST_ADE, CityGMLContext::CityGML2)).with_xml_prefix("test"),
    );

    mapping.insert_feature_type(
        FeatureType::new(
            "IndustrialBuilding",
            "IndustrialBuilding",
            "test",
            "TEST_INDUSTRIALBUILDING",
            10000,
        )
        .with_top_level()
        .with_extension(Extension::new("Building").with_join(Join::new("BUILDING", "ID", "ID", JoinRole::Parent)))
        .with_property(Property::simple_attribute("remark", "test", "REMARK", SimpleType::String)),
    );

    mapping.insert_injection(
        PropertyInjection::new("TEST_BUILDING", Join::new("TEST_BUILDING", "ID", "ID", JoinRole::Child))
            .with_default_base("AbstractBuilding")
            .with_property(
                InjectedProperty::new(Property::simple_attribute(
                    "ownerName",
                    "test",
                    "OWNERNAME",
                    SimpleType::String,
                ))
                .with_context(CityGMLContext::CityGML2),
            )
            .with_property(
                InjectedProperty::new(Property::simple_attribute(
                    "floorArea",
                    "test",
                    "FLOOR_AREA",
                    SimpleType::Double,
                ))
                .with_base("BuildingPart"),
            ),
    );

    mapping
}

/// The core mapping with the extension mapping merged in.
pub(crate) fn merged() -> SchemaMapping {
    let mut mapping = validated();
    mapping.merge(&ade_mapping()).unwrap();
    mapping
}
