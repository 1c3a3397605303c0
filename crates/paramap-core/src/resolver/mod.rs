//! Parameter mapping resolution.
//!
//! Given a parameter's value type and a query definition, produce the ordered
//! list of fields or template tags the parameter could be bound to. The
//! computation is pure: it only reads the metadata and query it is handed.

mod columns;
mod helpers;
mod native;
mod structured;

use tracing::{debug, instrument};

use crate::error::Result;
use crate::metadata::MetadataProvider;
use crate::options::MappingOption;
use crate::parameter::ParameterDescriptor;
use crate::query::QueryDefinition;
use crate::types::{DefaultClassifier, TypeClassifier};

pub use columns::{output_columns, ResultColumn};
pub use helpers::strip_id;

use native::resolve_native;
use structured::StructuredResolver;

pub const DEFAULT_MAX_SOURCE_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Deepest chain of nested source queries accepted.
    pub max_source_depth: usize,
    /// Offer fields behind the source table's foreign keys.
    pub include_implicit_joins: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_source_depth: DEFAULT_MAX_SOURCE_DEPTH,
            include_implicit_joins: true,
        }
    }
}

/// Resolver with a pluggable type classification.
#[derive(Debug, Clone, Default)]
pub struct MappingResolver<C = DefaultClassifier> {
    classifier: C,
    options: ResolverOptions,
}

impl MappingResolver<DefaultClassifier> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: TypeClassifier> MappingResolver<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self {
            classifier,
            options: ResolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Unsupported parameter types yield an empty list. Malformed queries
    /// (unknown tables or fields, bad join aliases) are errors.
    #[instrument(skip_all, fields(parameter_type = %parameter.parameter_type, query = query.kind()))]
    pub fn resolve<M>(
        &self,
        metadata: &M,
        parameter: &ParameterDescriptor,
        query: &QueryDefinition,
    ) -> Result<Vec<MappingOption>>
    where
        M: MetadataProvider + ?Sized,
    {
        let Some(class) = self.classifier.classify(&parameter.parameter_type) else {
            debug!("unsupported parameter type, nothing to map");
            return Ok(Vec::new());
        };

        match query {
            QueryDefinition::Structured { query, .. } => StructuredResolver {
                metadata,
                classifier: &self.classifier,
                class,
                options: &self.options,
            }
            .resolve(query),
            QueryDefinition::Native { native, .. } => {
                resolve_native(metadata, &self.classifier, class, native)
            }
        }
    }
}

/// Resolve with the default classification and options.
pub fn resolve<M>(
    metadata: &M,
    parameter: &ParameterDescriptor,
    query: &QueryDefinition,
) -> Result<Vec<MappingOption>>
where
    M: MetadataProvider + ?Sized,
{
    MappingResolver::new().resolve(metadata, parameter, query)
}
