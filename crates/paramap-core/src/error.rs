//! Error types for paramap core

use thiserror::Error;

use crate::metadata::{FieldId, TableId};

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("unknown table {0}")]
    UnknownTable(TableId),

    #[error("unknown field {0}")]
    UnknownField(FieldId),

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("structured query has no source table or source query")]
    MissingSource,

    #[error("structured query declares both a source table and a source query")]
    AmbiguousSource,

    #[error("join `{alias}` has no source table or source query")]
    UnresolvedJoin { alias: String },

    #[error("join alias must not be empty")]
    EmptyJoinAlias,

    #[error("duplicate join alias `{0}`")]
    DuplicateJoinAlias(String),

    #[error("template tag `{tag}` is not bound to a field: {reason}")]
    InvalidDimensionTag { tag: String, reason: String },

    #[error("invalid field reference: {0}")]
    InvalidFieldRef(String),

    #[error("nested source queries exceed the maximum depth of {0}")]
    SourceTooDeep(usize),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MappingError>;

impl MappingError {
    /// Short stable label, used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            MappingError::InvalidMetadata(_) => "invalid_metadata",
            MappingError::UnknownTable(_) => "unknown_table",
            MappingError::UnknownField(_) => "unknown_field",
            MappingError::MissingSource | MappingError::AmbiguousSource => "invalid_source",
            MappingError::UnresolvedJoin { .. }
            | MappingError::EmptyJoinAlias
            | MappingError::DuplicateJoinAlias(_) => "invalid_join",
            MappingError::InvalidDimensionTag { .. } => "invalid_template_tag",
            MappingError::InvalidFieldRef(_) => "invalid_field_ref",
            MappingError::SourceTooDeep(_) => "source_too_deep",
            MappingError::SerializationError(_) => "serialization",
        }
    }
}
