use serde::Serialize;
use std::fmt;

use crate::field_ref::MappingTarget;
use crate::types::Icon;

/// One candidate binding for a parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingOption {
    /// Grouping label. Absent for native queries, empty for nested-query columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    pub name: String,
    pub icon: Icon,
    pub target: MappingTarget,
    /// Reached through an implicit foreign key or an explicit join.
    pub is_foreign: bool,
}

impl fmt::Display for MappingOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.section_name.as_deref() {
            Some(section) if !section.is_empty() => write!(f, "{section} → {}", self.name)?,
            _ => write!(f, "{}", self.name)?,
        }
        if self.is_foreign {
            write!(f, " [foreign]")?;
        }
        Ok(())
    }
}
