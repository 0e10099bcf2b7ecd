//! citymap core: CityGML-to-relational schema mappings.
//!
//! This crate provides:
//! - The mapping metamodel: schemas, types, properties, joins and property injections
//! - The [`SchemaMapping`] registry that resolves identifier references,
//!   enforces the mapping invariants and merges extension mappings
//! - A JSON document codec for loading and dumping mappings

pub mod document;
pub mod error;
pub mod mapping;
pub mod registry;

pub use document::MappingDocument;
pub use error::{Error, ErrorCategory, MappingError};
pub use registry::{InjectedSlot, MappingState, SchemaMapping};
