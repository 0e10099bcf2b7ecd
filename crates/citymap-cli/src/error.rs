//! Tool error types.

use std::path::PathBuf;

use thiserror::Error;

/// citymap tool errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A document could not be read, parsed or written.
    #[error("{}: {source}", path.display())]
    Document {
        /// Path of the document.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: citymap_core::Error,
    },

    /// A document failed validation or could not be merged.
    #[error("{}: {source}", path.display())]
    Mapping {
        /// Path of the document.
        path: PathBuf,
        /// Validation failure.
        #[source]
        source: citymap_core::MappingError,
    },

    /// No mapping document was given.
    #[error("no mapping document given")]
    NoInput,

    /// The requested type is not part of the mapping.
    #[error("unknown type '{0}'")]
    UnknownType(String),
}

impl Error {
    /// Wrap a document error with its path.
    pub fn document(path: impl Into<PathBuf>, source: citymap_core::Error) -> Self {
        Error::Document {
            path: path.into(),
            source,
        }
    }

    /// Wrap a validation error with its path.
    pub fn mapping(path: impl Into<PathBuf>, source: citymap_core::MappingError) -> Self {
        Error::Mapping {
            path: path.into(),
            source,
        }
    }
}
