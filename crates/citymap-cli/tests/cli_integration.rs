//! Integration tests for the citymap commands.

use std::path::{Path, PathBuf};

use citymap_cli::{run, Error, OutputFormat, Task, ToolConfig};
use citymap_core::mapping::{
    CityGMLContext, Extension, FeatureType, InjectedProperty, Join, JoinRole, Metadata, Namespace,
    Property, PropertyInjection, Schema, SimpleType,
};
use citymap_core::{MappingDocument, SchemaMapping};

struct TestContext {
    _dir: tempfile::TempDir,
    base: PathBuf,
    ade: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("citydb.json");
        let ade = dir.path().join("ade.json");
        MappingDocument::from_mapping(&base_mapping()).write_to_path(&base).unwrap();
        MappingDocument::from_mapping(&ade_mapping()).write_to_path(&ade).unwrap();

        Self { _dir: dir, base, ade }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.base.with_file_name(name)
    }

    fn config(&self, task: Task) -> ToolConfig {
        ToolConfig::new([&self.base, &self.ade]).with_task(task)
    }
}

fn base_mapping() -> SchemaMapping {
    let mut mapping = SchemaMapping::new().with_metadata(Metadata::new("citydb", "cdb"));
    mapping.insert_schema(
        Schema::new(
            "bldg",
            Namespace::new("http://www.opengis.net/citygml/building/2.0", CityGMLContext::CityGML2),
        )
        .with_xml_prefix("bldg"),
    );
    mapping.insert_feature_type(
        FeatureType::new("AbstractBuilding", "_AbstractBuilding", "bldg", "BUILDING", 24)
            .with_abstract()
            .with_property(Property::simple_attribute("@class", "bldg", "CLASS", SimpleType::String)),
    );
    mapping.insert_feature_type(
        FeatureType::new("Building", "Building", "bldg", "BUILDING", 26)
            .with_top_level()
            .with_extension(Extension::new("AbstractBuilding")),
    );
    mapping.validate().unwrap();
    mapping
}

fn ade_mapping() -> SchemaMapping {
    let mut mapping = SchemaMapping::new();
    mapping.insert_schema(
        Schema::new("ade", Namespace::new("http://www.example.org/ade/1.0", CityGMLContext::CityGML2))
            .with_xml_prefix("ade"),
    );
    mapping.insert_injection(
        PropertyInjection::new("ADE_BUILDING", Join::new("ADE_BUILDING", "ID", "ID", JoinRole::Child))
            .with_default_base("AbstractBuilding")
            .with_property(InjectedProperty::new(Property::simple_attribute(
                "energyClass",
                "ade",
                "ENERGY_CLASS",
                SimpleType::String,
            ))),
    );
    mapping
}

fn write(path: &Path, json: &str) {
    std::fs::write(path, json).unwrap();
}

#[test]
fn test_validate_reports_counts() {
    let ctx = TestContext::new();
    let output = run(&ctx.config(Task::Validate).with_format(OutputFormat::Json)).unwrap();

    let summary: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(summary["merged"], 1);
    assert_eq!(summary["schemas"], 2);
    assert_eq!(summary["feature_types"], 2);
    assert_eq!(summary["property_injections"], 1);
    // Merging drops the metadata of the base mapping.
    assert!(summary["name"].is_null());
}

#[test]
fn test_validate_single_document_as_text() {
    let ctx = TestContext::new();
    let output = run(&ToolConfig::new([&ctx.base])).unwrap();

    assert!(output.starts_with("Mapping 'citydb' is valid\n"));
}

#[test]
fn test_inspect_shows_injected_property() {
    let ctx = TestContext::new();
    let output = run(&ctx
        .config(Task::Inspect {
            type_id: "Building".into(),
        })
        .with_format(OutputFormat::Json))
    .unwrap();

    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["table"], "BUILDING");
    assert_eq!(report["shared_table"], true);
    assert_eq!(report["super_types"], serde_json::json!(["AbstractBuilding"]));

    let properties = report["properties"].as_array().unwrap();
    assert_eq!(properties.len(), 2);
    assert_eq!(properties[0]["name"], "class");
    assert_eq!(properties[0]["declared_by"], "AbstractBuilding");
    assert_eq!(properties[1]["name"], "energyClass");
    assert_eq!(properties[1]["declared_by"], "ADE_BUILDING");
    assert_eq!(properties[1]["injected"], true);
}

#[test]
fn test_inspect_unknown_type() {
    let ctx = TestContext::new();
    let err = run(&ctx.config(Task::Inspect {
        type_id: "Bridge".into(),
    }))
    .unwrap_err();

    assert!(matches!(err, Error::UnknownType(id) if id == "Bridge"));
}

#[test]
fn test_tables_falls_back_to_injection_bases() {
    let ctx = TestContext::new();
    let output = run(&ctx
        .config(Task::Tables {
            table: "ade_building".into(),
            skip_abstract: true,
        })
        .with_format(OutputFormat::Json))
    .unwrap();

    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["feature_types"], serde_json::json!(["Building"]));
    assert_eq!(report["object_types"], serde_json::json!([]));
}

#[test]
fn test_merge_writes_loadable_document() {
    let ctx = TestContext::new();
    let output = ctx.path("merged.json");
    run(&ctx.config(Task::Merge { output: output.clone() })).unwrap();

    let merged = MappingDocument::from_path(&output).unwrap().into_mapping().unwrap();
    let building = merged.feature_type_handle("Building").unwrap();
    assert!(merged.get_property(building, "energyClass", None, true).is_some());
}

#[test]
fn test_invalid_extension_names_document() {
    let ctx = TestContext::new();
    let broken = ctx.path("broken.json");
    write(
        &broken,
        r#"{
            "propertyInjections": [{
                "table": "X",
                "join": { "table": "X", "from": "ID", "to": "ID", "toRole": "child" },
                "defaultBase": "Tunnel",
                "properties": []
            }]
        }"#,
    );

    let err = run(&ToolConfig::new([&ctx.base, &broken])).unwrap_err();

    assert!(matches!(&err, Error::Mapping { path, .. } if path == &broken));
    assert!(err.to_string().contains("Tunnel"));
}

#[test]
fn test_missing_document() {
    let ctx = TestContext::new();
    let err = run(&ToolConfig::new([ctx.path("missing.json")])).unwrap_err();

    assert!(matches!(err, Error::Document { .. }));
    assert!(matches!(run(&ToolConfig::default()), Err(Error::NoInput)));
}
