//! Core error types.

use thiserror::Error;

/// Broad class of a mapping validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A required attribute is missing.
    Structural,
    /// An identifier could not be resolved against the registry.
    Referential,
    /// A uniqueness, cardinality, range or context rule is violated.
    Invariant,
    /// A version gate or subtype requirement of a property injection failed.
    SemanticGate,
}

/// Errors raised while resolving and validating a schema mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A required attribute is not set.
    #[error("{element}: missing required attribute '{attribute}'")]
    MissingAttribute {
        /// The element lacking the attribute.
        element: String,
        /// Name of the attribute.
        attribute: &'static str,
    },

    /// A reference names an entity that is not registered.
    #[error("{element}: failed to resolve {kind} '{id}'")]
    UnresolvedReference {
        /// The element holding the reference.
        element: String,
        /// Kind of the referenced entity.
        kind: &'static str,
        /// The unresolved identifier.
        id: String,
    },

    /// Two entities of the same collection share an id.
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId {
        /// Collection kind.
        kind: &'static str,
        /// The duplicated id.
        id: String,
    },

    /// Two object or feature types share an objectClassId.
    #[error("objectClassId {object_class_id} is assigned to both '{first}' and '{second}'")]
    DuplicateObjectClassId {
        /// The duplicated objectClassId.
        object_class_id: i32,
        /// Id of the first type.
        first: String,
        /// Id of the second type.
        second: String,
    },

    /// maxOccurs is lower than minOccurs.
    #[error("{element}: maxOccurs {max_occurs} is less than minOccurs {min_occurs}")]
    Cardinality {
        /// The offending property.
        element: String,
        /// Lower bound.
        min_occurs: u32,
        /// Upper bound.
        max_occurs: u32,
    },

    /// A numeric argument is outside its allowed range.
    #[error("{argument} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Name of the argument.
        argument: &'static str,
        /// Rejected value.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },

    /// A join appears in a context where it cannot be interpreted.
    #[error("{element}: invalid join context: {message}")]
    JoinContext {
        /// The element owning the join.
        element: String,
        /// What is wrong with the context.
        message: String,
    },

    /// Any other structural rule of the metamodel is violated.
    #[error("{element}: {message}")]
    Invariant {
        /// The offending element.
        element: String,
        /// Description of the violation.
        message: String,
    },

    /// A property injection does not fit its base type or version.
    #[error("{element}: {message}")]
    SemanticGate {
        /// The injected property.
        element: String,
        /// Description of the violation.
        message: String,
    },
}

impl MappingError {
    /// Create a missing attribute error.
    pub fn missing(element: impl Into<String>, attribute: &'static str) -> Self {
        MappingError::MissingAttribute {
            element: element.into(),
            attribute,
        }
    }

    /// Create an unresolved reference error.
    pub fn unresolved(element: impl Into<String>, kind: &'static str, id: impl Into<String>) -> Self {
        MappingError::UnresolvedReference {
            element: element.into(),
            kind,
            id: id.into(),
        }
    }

    /// Create an invariant violation error.
    pub fn invariant(element: impl Into<String>, message: impl Into<String>) -> Self {
        MappingError::Invariant {
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create a join context error.
    pub fn join_context(element: impl Into<String>, message: impl Into<String>) -> Self {
        MappingError::JoinContext {
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create a semantic gate error.
    pub fn semantic_gate(element: impl Into<String>, message: impl Into<String>) -> Self {
        MappingError::SemanticGate {
            element: element.into(),
            message: message.into(),
        }
    }

    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            MappingError::MissingAttribute { .. } => ErrorCategory::Structural,
            MappingError::UnresolvedReference { .. } => ErrorCategory::Referential,
            MappingError::DuplicateId { .. }
            | MappingError::DuplicateObjectClassId { .. }
            | MappingError::Cardinality { .. }
            | MappingError::OutOfRange { .. }
            | MappingError::JoinContext { .. }
            | MappingError::Invariant { .. } => ErrorCategory::Invariant,
            MappingError::SemanticGate { .. } => ErrorCategory::SemanticGate,
        }
    }
}

/// Errors raised while reading or writing mapping documents.
#[derive(Debug, Error)]
pub enum Error {
    /// The mapping failed validation.
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// The document is not valid JSON or does not match the document format.
    #[error("document error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the document failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            MappingError::missing("feature type 'Building'", "table").category(),
            ErrorCategory::Structural
        );
        assert_eq!(
            MappingError::unresolved("property 'lod2Solid'", "feature type", "Solid").category(),
            ErrorCategory::Referential
        );
        assert_eq!(
            MappingError::DuplicateId {
                kind: "feature type",
                id: "Building".into()
            }
            .category(),
            ErrorCategory::Invariant
        );
        assert_eq!(
            MappingError::semantic_gate("property 'x'", "wrong base").category(),
            ErrorCategory::SemanticGate
        );
    }

    #[test]
    fn test_duplicate_object_class_id_message() {
        let err = MappingError::DuplicateObjectClassId {
            object_class_id: 40,
            first: "A".into(),
            second: "B".into(),
        };
        assert_eq!(
            err.to_string(),
            "objectClassId 40 is assigned to both 'A' and 'B'"
        );
    }
}
