//! Subcommand implementations.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use citymap_core::mapping::TypeHandle;
use citymap_core::{MappingDocument, SchemaMapping};

use crate::config::{Task, ToolConfig};
use crate::error::Error;
use crate::formatter::create_formatter;

/// Entity counts of a loaded mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingSummary {
    pub name: Option<String>,
    pub merged: usize,
    pub schemas: usize,
    pub complex_attribute_types: usize,
    pub complex_types: usize,
    pub object_types: usize,
    pub feature_types: usize,
    pub property_injections: usize,
}

/// Description of a single type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeReport {
    pub id: String,
    pub kind: String,
    pub path: String,
    pub schema: String,
    pub table: Option<String>,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub super_types: Vec<String>,
    pub sub_types: Vec<String>,
    pub shared_table: bool,
    pub properties: Vec<PropertyRow>,
}

/// A property as seen from a type, with the element declaring it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyRow {
    pub name: String,
    pub kind: String,
    pub declared_by: String,
    pub injected: bool,
    pub queryable: bool,
}

/// Types stored in a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub feature_types: Vec<String>,
    pub object_types: Vec<String>,
}

/// Load the base document and merge the remaining documents into it.
pub fn load(inputs: &[PathBuf]) -> Result<SchemaMapping, Error> {
    let (base, extensions) = inputs.split_first().ok_or(Error::NoInput)?;

    let mut mapping = MappingDocument::from_path(base)
        .map_err(|e| Error::document(base, e))?
        .into_mapping()
        .map_err(|e| Error::mapping(base, e))?;
    info!(path = %base.display(), "Mapping loaded");

    for path in extensions {
        MappingDocument::from_path(path)
            .map_err(|e| Error::document(path, e))?
            .merge_into(&mut mapping)
            .map_err(|e| Error::mapping(path, e))?;
        info!(path = %path.display(), "Mapping merged");
    }
    Ok(mapping)
}

/// Run the configured task and return its rendered output.
pub fn run(config: &ToolConfig) -> Result<String, Error> {
    let mapping = load(&config.inputs)?;
    let formatter = create_formatter(config.format);

    match &config.task {
        Task::Validate => Ok(formatter.format_summary(&summarize(&mapping))),
        Task::Merge { output } => {
            MappingDocument::from_mapping(&mapping)
                .write_to_path(output)
                .map_err(|e| Error::document(output, e))?;
            Ok(formatter.format_message(&format!(
                "Merged {} document(s) into {}",
                config.inputs.len(),
                output.display()
            )))
        }
        Task::Inspect { type_id } => Ok(formatter.format_type(&inspect(&mapping, type_id)?)),
        Task::Tables { table, skip_abstract } => {
            Ok(formatter.format_tables(&tables(&mapping, table, *skip_abstract)))
        }
    }
}

/// Count the entities of a mapping.
pub fn summarize(mapping: &SchemaMapping) -> MappingSummary {
    MappingSummary {
        name: mapping.metadata().map(|metadata| metadata.name.clone()),
        merged: mapping.merge_count(),
        schemas: mapping.schemas().count(),
        complex_attribute_types: mapping.attribute_type_handles().count(),
        complex_types: mapping.complex_type_handles().count(),
        object_types: mapping.object_type_handles().count(),
        feature_types: mapping.feature_type_handles().count(),
        property_injections: mapping.injection_handles().count(),
    }
}

/// Describe the feature, object or complex type with the given id.
pub fn inspect(mapping: &SchemaMapping, type_id: &str) -> Result<TypeReport, Error> {
    let handle = mapping
        .feature_type_handle(type_id)
        .or_else(|| mapping.object_type_handle(type_id))
        .or_else(|| mapping.complex_type_handle(type_id))
        .ok_or_else(|| Error::UnknownType(type_id.to_string()))?;
    let core = mapping
        .type_core(handle)
        .ok_or_else(|| Error::UnknownType(type_id.to_string()))?;

    let mut properties = Vec::new();
    for current in mapping.list_super_types(handle, true) {
        let owner = mapping.type_id(current).unwrap_or_default().to_string();
        for property in mapping.type_core(current).into_iter().flat_map(|core| &core.properties) {
            properties.push(PropertyRow {
                name: property.name().to_string(),
                kind: property.element_type().to_string(),
                declared_by: owner.clone(),
                injected: false,
                queryable: mapping.is_queryable(&property.element),
            });
        }
        for (injection, injected) in mapping.injected_properties(current) {
            let declared_by = mapping
                .injection(injection)
                .map(|injection| injection.table.clone())
                .unwrap_or_default();
            properties.push(PropertyRow {
                name: injected.property.name().to_string(),
                kind: injected.property.element_type().to_string(),
                declared_by,
                injected: true,
                queryable: mapping.is_queryable(&injected.property.element),
            });
        }
    }

    let schema = core
        .element
        .schema
        .handle()
        .and_then(|schema| mapping.schema(schema))
        .map(|schema| schema.id.clone())
        .unwrap_or_default();

    Ok(TypeReport {
        id: type_id.to_string(),
        kind: handle.kind().to_string(),
        path: core.element.path.clone(),
        schema,
        table: mapping.effective_table(handle).map(str::to_string),
        is_abstract: core.is_abstract,
        super_types: ids(mapping, mapping.list_super_types(handle, false)),
        sub_types: ids(mapping, mapping.list_sub_types(handle, false)),
        shared_table: mapping.has_shared_table(handle, false),
        properties,
    })
}

/// List the feature and object types stored in a table.
pub fn tables(mapping: &SchemaMapping, table: &str, skip_abstract: bool) -> TableReport {
    TableReport {
        table: table.to_string(),
        feature_types: ids(mapping, mapping.list_feature_types_by_table(table, skip_abstract)),
        object_types: ids(mapping, mapping.list_object_types_by_table(table, skip_abstract)),
    }
}

fn ids(mapping: &SchemaMapping, handles: impl IntoIterator<Item = TypeHandle>) -> Vec<String> {
    handles
        .into_iter()
        .filter_map(|handle| mapping.type_id(handle))
        .map(str::to_string)
        .collect()
}
