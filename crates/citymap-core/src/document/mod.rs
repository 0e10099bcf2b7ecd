//! JSON mapping documents.
//!
//! A [`MappingDocument`] is the serialized form of a [`SchemaMapping`]:
//! every entity appears once in its top-level collection and references are
//! written as ids. Reading a document builds an unvalidated mapping which is
//! then validated as a whole or merged into an existing one.
//!
//! ```ignore
//! let mapping = MappingDocument::from_path("citydb.json")?.into_mapping()?;
//! let building = mapping.feature_type_handle("Building");
//! ```

mod dump;
mod load;
mod model;

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, MappingError};
use crate::mapping::TypeKind;
use crate::registry::SchemaMapping;

pub use model::{
    AttributeTypeDoc, ComplexTypeDoc, ExtensionDoc, InjectedPropertyDoc, InjectionDoc, MappingDocument,
    ObjectTypeDoc, PropertyDoc, PropertyKindDoc,
};

impl MappingDocument {
    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a document file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading mapping document");
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document as indented JSON.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?)?;
        info!(path = %path.display(), "Mapping document written");
        Ok(())
    }

    /// Build the mapping without resolving references.
    ///
    /// The result is in the `Loaded` state.
    pub fn into_unvalidated(self) -> Result<SchemaMapping, MappingError> {
        let mut mapping = SchemaMapping::new();
        mapping.set_metadata(self.metadata);

        for schema in self.schemas {
            mapping.insert_schema(schema);
        }
        for doc in self.complex_attribute_types {
            mapping.insert_attribute_type(load::attribute_type(doc)?);
        }
        for doc in self.complex_types {
            mapping.insert_complex_type(load::complex_type(doc)?);
        }
        for doc in self.object_types {
            mapping.insert_object_type(load::object_type(doc)?);
        }
        for doc in self.feature_types {
            mapping.insert_feature_type(load::object_type(doc)?);
        }
        for doc in self.property_injections {
            mapping.insert_injection(load::injection(doc)?);
        }
        Ok(mapping)
    }

    /// Build and validate the mapping.
    pub fn into_mapping(self) -> Result<SchemaMapping, MappingError> {
        let mut mapping = self.into_unvalidated()?;
        mapping.validate()?;
        Ok(mapping)
    }

    /// Merge the document's entities into a mapping.
    ///
    /// References may point into `mapping`, which is validated as a whole if
    /// it was only loaded. On failure `mapping` is unchanged.
    pub fn merge_into(self, mapping: &mut SchemaMapping) -> Result<(), MappingError> {
        let other = self.into_unvalidated()?;
        mapping.merge(&other)
    }

    /// Capture a mapping as a document.
    ///
    /// Derived values are not written, so loading the document again yields
    /// an equivalent mapping.
    pub fn from_mapping(mapping: &SchemaMapping) -> Self {
        let dumper = dump::Dumper::new(mapping);
        let types = |kind: TypeKind| -> Vec<ObjectTypeDoc> {
            let handles: Vec<_> = match kind {
                TypeKind::Object => mapping.object_type_handles().collect(),
                _ => mapping.feature_type_handles().collect(),
            };
            handles
                .into_iter()
                .filter_map(|handle| mapping.object_type(handle))
                .map(|object_type| dumper.object_type(object_type))
                .collect()
        };

        MappingDocument {
            metadata: mapping.metadata().cloned(),
            schemas: mapping.schemas().cloned().collect(),
            complex_attribute_types: mapping
                .attribute_type_handles()
                .filter_map(|handle| mapping.attribute_type(handle))
                .map(|attribute_type| dumper.attribute_type(attribute_type))
                .collect(),
            complex_types: mapping
                .complex_type_handles()
                .filter_map(|handle| mapping.complex_type(handle))
                .map(|complex_type| dumper.complex_type(complex_type))
                .collect(),
            object_types: types(TypeKind::Object),
            feature_types: types(TypeKind::Feature),
            property_injections: mapping
                .injection_handles()
                .filter_map(|handle| mapping.injection(handle))
                .map(|injection| dumper.injection(injection))
                .collect(),
        }
    }
}
