use std::collections::HashSet;

use crate::error::{MappingError, Result};
use crate::field_ref::MappingTarget;
use crate::metadata::{Field, Table};
use crate::options::MappingOption;
use crate::query::Join;
use crate::types::{ColumnType, Icon};

/// Section for a query's own table: its display name in singular form.
pub fn table_section(table: &Table) -> String {
    let name = table.display_name.trim();
    if name.is_empty() {
        return String::new();
    }
    pluralizer::pluralize(name, 1, false)
}

/// Section for fields reached through `fk`: the key's label without its `ID`
/// suffix, so two keys into the same table stay distinguishable.
pub fn foreign_key_section(fk: &Field) -> String {
    strip_id(&fk.display_name)
}

/// `"Product ID"` → `"Product"`. A bare `"ID"` is left alone.
pub fn strip_id(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.to_ascii_lowercase().ends_with("id") {
        let stem = &trimmed[..trimmed.len() - 2];
        if stem.ends_with(char::is_whitespace) {
            return stem.trim_end().to_string();
        }
    }
    trimmed.to_string()
}

pub fn column_option(
    section_name: String,
    name: &str,
    column_type: &ColumnType,
    target: MappingTarget,
    is_foreign: bool,
) -> MappingOption {
    MappingOption {
        section_name: Some(section_name),
        name: name.to_string(),
        icon: Icon::for_column(column_type),
        target,
        is_foreign,
    }
}

/// Join aliases name sections and field references, so they must be unique.
pub fn check_join_aliases(joins: &[Join]) -> Result<()> {
    let mut seen = HashSet::with_capacity(joins.len());
    for join in joins {
        if join.alias.trim().is_empty() {
            return Err(MappingError::EmptyJoinAlias);
        }
        if !seen.insert(join.alias.as_str()) {
            return Err(MappingError::DuplicateJoinAlias(join.alias.clone()));
        }
    }
    Ok(())
}
