//! Output columns of a structured query used as another query's source.

use std::collections::HashMap;

use crate::error::{MappingError, Result};
use crate::field_ref::{FieldKey, FieldRef};
use crate::metadata::{require_field, require_table, table_fields, MetadataProvider};
use crate::query::{Aggregation, Source, StructuredQuery};
use crate::types::{ColumnType, BIG_INTEGER, FLOAT};

use super::helpers::check_join_aliases;

/// A column of a nested query's result. It has no catalogue id, only a name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultColumn {
    pub name: String,
    pub display_name: String,
    pub column_type: ColumnType,
}

impl ResultColumn {
    pub fn field_ref(&self) -> FieldRef {
        FieldRef::named(&self.name, &self.column_type.base_type)
    }
}

/// Columns `query` produces, with `depth` counting how deeply it is nested.
/// Columns of the query's joins follow its source columns, named
/// `<alias>__<column>`.
pub fn output_columns<M>(
    metadata: &M,
    query: &StructuredQuery,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<ResultColumn>>
where
    M: MetadataProvider + ?Sized,
{
    if depth > max_depth {
        return Err(MappingError::SourceTooDeep(max_depth));
    }
    check_join_aliases(&query.joins)?;

    let mut source_columns = columns_of(metadata, &query.source, depth, max_depth)?;
    for join in &query.joins {
        let joined = columns_of(metadata, &join.source, depth, max_depth)?;
        source_columns.extend(joined.into_iter().map(|column| ResultColumn {
            name: format!("{}__{}", join.alias, column.name),
            display_name: format!("{} → {}", join.alias, column.display_name),
            column_type: column.column_type,
        }));
    }

    if !query.is_summarized() {
        return Ok(source_columns);
    }

    let mut names = UniqueNames::default();
    let mut columns = Vec::with_capacity(query.breakout.len() + query.aggregation.len());

    for field in &query.breakout {
        let mut column = column_for_ref(metadata, field, &source_columns)?;
        column.name = names.claim(&column.name);
        columns.push(column);
    }

    for aggregation in &query.aggregation {
        let argument = aggregation
            .argument()
            .map(|field| column_for_ref(metadata, field, &source_columns))
            .transpose()?;
        let mut column = aggregation_column(aggregation, argument);
        column.name = names.claim(&column.name);
        columns.push(column);
    }

    Ok(columns)
}

fn columns_of<M>(
    metadata: &M,
    source: &Source,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<ResultColumn>>
where
    M: MetadataProvider + ?Sized,
{
    match source {
        Source::Table(id) => {
            let table = require_table(metadata, *id)?;
            Ok(table_fields(metadata, table)?
                .into_iter()
                .filter(|field| field.is_offered())
                .map(|field| ResultColumn {
                    name: field.name.clone(),
                    display_name: field.display_name.clone(),
                    column_type: field.column_type.clone(),
                })
                .collect())
        }
        Source::Query(inner) => output_columns(metadata, inner, depth + 1, max_depth),
    }
}

fn column_for_ref<M>(
    metadata: &M,
    field: &FieldRef,
    source_columns: &[ResultColumn],
) -> Result<ResultColumn>
where
    M: MetadataProvider + ?Sized,
{
    match &field.key {
        FieldKey::Id(id) => {
            let field = require_field(metadata, *id)?;
            Ok(ResultColumn {
                name: field.name.clone(),
                display_name: field.display_name.clone(),
                column_type: field.column_type.clone(),
            })
        }
        FieldKey::Name { name, base_type } => Ok(source_columns
            .iter()
            .find(|column| &column.name == name)
            .cloned()
            .unwrap_or_else(|| ResultColumn {
                name: name.clone(),
                display_name: name.clone(),
                column_type: ColumnType::new(base_type),
            })),
    }
}

fn aggregation_column(aggregation: &Aggregation, argument: Option<ResultColumn>) -> ResultColumn {
    let of = |prefix: &str| match &argument {
        Some(column) => format!("{prefix} of {}", column.display_name),
        None => prefix.to_string(),
    };
    let argument_type = || {
        argument
            .as_ref()
            .map(|column| column.column_type.clone())
            .unwrap_or_else(|| ColumnType::new(FLOAT))
    };

    let (display_name, column_type) = match aggregation {
        Aggregation::Count => ("Count".to_string(), ColumnType::new(BIG_INTEGER)),
        Aggregation::CountOf(_) => (of("Count"), ColumnType::new(BIG_INTEGER)),
        Aggregation::Distinct(_) => (of("Distinct values"), ColumnType::new(BIG_INTEGER)),
        Aggregation::Sum(_) => (of("Sum"), ColumnType::new(argument_type().base_type)),
        Aggregation::Avg(_) => (of("Average"), ColumnType::new(FLOAT)),
        Aggregation::Min(_) => (of("Min"), argument_type()),
        Aggregation::Max(_) => (of("Max"), argument_type()),
    };

    ResultColumn {
        name: aggregation.column_name().to_string(),
        display_name,
        column_type,
    }
}

/// Hands out `name`, `name_2`, `name_3`, ... for repeated column names.
#[derive(Default)]
struct UniqueNames {
    seen: HashMap<String, usize>,
}

impl UniqueNames {
    fn claim(&mut self, name: &str) -> String {
        let count = self.seen.entry(name.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            name.to_string()
        } else {
            format!("{name}_{count}")
        }
    }
}
