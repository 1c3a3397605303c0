//! Core types and parameter mapping resolution for paramap

pub mod error;
pub mod field_ref;
pub mod metadata;
pub mod options;
pub mod parameter;
pub mod query;
pub mod resolver;
pub mod types;

pub use error::*;
pub use field_ref::{DimensionRef, FieldKey, FieldRef, MappingTarget, TemplateTagRef, Via};
pub use metadata::{Field, FieldId, Metadata, MetadataProvider, Table, TableId};
pub use options::MappingOption;
pub use parameter::{ParameterDescriptor, ParameterType};
pub use query::{NativeQuery, QueryDefinition, Source, StructuredQuery};
pub use resolver::{resolve, MappingResolver, ResolverOptions};
pub use types::{ColumnType, DefaultClassifier, Icon, TypeClass, TypeClassifier};
