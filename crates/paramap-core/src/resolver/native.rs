use tracing::{debug, trace};

use crate::error::{MappingError, Result};
use crate::field_ref::MappingTarget;
use crate::metadata::{require_field, Field, MetadataProvider};
use crate::options::MappingOption;
use crate::query::{NativeQuery, TagKind, TemplateTag};
use crate::types::{Icon, TypeClass, TypeClassifier};

/// Template tags in declaration order. Native queries have no table grouping,
/// so options carry no section and are never foreign.
pub(super) fn resolve_native<M, C>(
    metadata: &M,
    classifier: &C,
    class: TypeClass,
    native: &NativeQuery,
) -> Result<Vec<MappingOption>>
where
    M: MetadataProvider + ?Sized,
    C: TypeClassifier,
{
    let mut options = Vec::new();

    for tag in native.template_tags.values() {
        if let Some(variable) = tag.kind.variable_type() {
            if classifier.accepts_variable(class, variable) {
                options.push(MappingOption {
                    section_name: None,
                    name: tag.name.clone(),
                    icon: Icon::for_variable(variable),
                    target: MappingTarget::variable(&tag.name),
                    is_foreign: false,
                });
            } else {
                trace!(tag = %tag.name, class = %class, "variable excluded");
            }
            continue;
        }

        match &tag.kind {
            TagKind::Dimension { .. } => {
                let field = dimension_field(metadata, tag)?;
                if field.is_offered() && classifier.accepts_column(class, &field.column_type) {
                    options.push(MappingOption {
                        section_name: None,
                        name: field.display_name.clone(),
                        icon: Icon::for_column(&field.column_type),
                        target: MappingTarget::dimension_tag(&tag.name),
                        is_foreign: false,
                    });
                } else {
                    trace!(tag = %tag.name, field = %field.id, class = %class, "dimension excluded");
                }
            }
            _ => trace!(tag = %tag.name, "tag can't take a parameter"),
        }
    }

    debug!(options = options.len(), "resolved native query");
    Ok(options)
}

fn dimension_field<'a, M>(metadata: &'a M, tag: &TemplateTag) -> Result<&'a Field>
where
    M: MetadataProvider + ?Sized,
{
    let TagKind::Dimension { dimension, .. } = &tag.kind else {
        return Err(MappingError::InvalidDimensionTag {
            tag: tag.name.clone(),
            reason: "not a dimension tag".into(),
        });
    };
    let id = dimension
        .field_id()
        .ok_or_else(|| MappingError::InvalidDimensionTag {
            tag: tag.name.clone(),
            reason: format!("{dimension} has no field id"),
        })?;
    require_field(metadata, id)
}
