use tracing::{debug, trace};

use crate::error::Result;
use crate::field_ref::{FieldRef, MappingTarget};
use crate::metadata::{foreign_keys, require_table, table_fields, Field, MetadataProvider, Table};
use crate::options::MappingOption;
use crate::query::{Join, Source, StructuredQuery};
use crate::types::{ColumnType, TypeClass, TypeClassifier};

use super::columns::{output_columns, ResultColumn};
use super::helpers::{check_join_aliases, column_option, foreign_key_section, table_section};
use super::ResolverOptions;

/// Walks a structured query in three phases: its own source, its explicit
/// joins, then the implicit joins behind the source table's foreign keys.
pub(super) struct StructuredResolver<'a, M: ?Sized, C> {
    pub metadata: &'a M,
    pub classifier: &'a C,
    pub class: TypeClass,
    pub options: &'a ResolverOptions,
}

impl<'a, M, C> StructuredResolver<'a, M, C>
where
    M: MetadataProvider + ?Sized,
    C: TypeClassifier,
{
    pub fn resolve(&self, query: &StructuredQuery) -> Result<Vec<MappingOption>> {
        check_join_aliases(&query.joins)?;

        let own = self.source_options(query)?;
        let joined = self.join_options(query)?;
        let implicit = if self.options.include_implicit_joins {
            self.implicit_join_options(query)?
        } else {
            Vec::new()
        };

        debug!(
            own = own.len(),
            joined = joined.len(),
            implicit = implicit.len(),
            "resolved structured query"
        );

        Ok(own.into_iter().chain(joined).chain(implicit).collect())
    }

    /// Phase 1: fields of the primary table, or columns of the nested source query.
    pub fn source_options(&self, query: &StructuredQuery) -> Result<Vec<MappingOption>> {
        match &query.source {
            Source::Table(id) => {
                let table = require_table(self.metadata, *id)?;
                let section = table_section(table);
                Ok(self
                    .matching_fields(table)?
                    .into_iter()
                    .map(|field| {
                        column_option(
                            section.clone(),
                            &field.display_name,
                            &field.column_type,
                            MappingTarget::field(FieldRef::id(field.id)),
                            false,
                        )
                    })
                    .collect())
            }
            Source::Query(inner) => Ok(self
                .matching_columns(inner)?
                .into_iter()
                .map(|column| {
                    column_option(
                        String::new(),
                        &column.display_name,
                        &column.column_type,
                        MappingTarget::field(column.field_ref()),
                        false,
                    )
                })
                .collect()),
        }
    }

    /// Phase 2: one group per explicit join, in join order, named by alias.
    pub fn join_options(&self, query: &StructuredQuery) -> Result<Vec<MappingOption>> {
        let mut options = Vec::new();
        for join in &query.joins {
            options.extend(self.single_join_options(join)?);
        }
        Ok(options)
    }

    fn single_join_options(&self, join: &Join) -> Result<Vec<MappingOption>> {
        let option = |name: &str, column_type: &ColumnType, field: FieldRef| {
            column_option(
                join.alias.clone(),
                name,
                column_type,
                MappingTarget::field(field.through_join(&join.alias)),
                true,
            )
        };

        match &join.source {
            Source::Table(id) => {
                let table = require_table(self.metadata, *id)?;
                Ok(self
                    .matching_fields(table)?
                    .into_iter()
                    .map(|field| option(&field.display_name, &field.column_type, FieldRef::id(field.id)))
                    .collect())
            }
            Source::Query(inner) => Ok(self
                .matching_columns(inner)?
                .iter()
                .map(|column| option(&column.display_name, &column.column_type, column.field_ref()))
                .collect()),
        }
    }

    /// Phase 3: fields behind each foreign key of the primary table, in the
    /// table's field order. Nested source queries have no foreign keys to follow.
    pub fn implicit_join_options(&self, query: &StructuredQuery) -> Result<Vec<MappingOption>> {
        let Source::Table(id) = &query.source else {
            return Ok(Vec::new());
        };
        let table = require_table(self.metadata, *id)?;

        let mut options = Vec::new();
        for fk in foreign_keys(self.metadata, table)? {
            let section = foreign_key_section(fk.field);
            for field in self.matching_fields(fk.target_table)? {
                options.push(column_option(
                    section.clone(),
                    &field.display_name,
                    &field.column_type,
                    MappingTarget::field(FieldRef::id(field.id).through_foreign_key(fk.field.id)),
                    true,
                ));
            }
        }
        Ok(options)
    }

    fn matching_fields(&self, table: &Table) -> Result<Vec<&'a Field>> {
        Ok(table_fields(self.metadata, table)?
            .into_iter()
            .filter(|field| {
                let accepted = field.is_offered()
                    && self.classifier.accepts_column(self.class, &field.column_type);
                if !accepted {
                    trace!(field = %field.id, class = %self.class, "field excluded");
                }
                accepted
            })
            .collect())
    }

    fn matching_columns(&self, query: &StructuredQuery) -> Result<Vec<ResultColumn>> {
        let columns = output_columns(self.metadata, query, 1, self.options.max_source_depth)?;
        Ok(columns
            .into_iter()
            .filter(|column| self.classifier.accepts_column(self.class, &column.column_type))
            .collect())
    }
}
