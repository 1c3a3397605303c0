//! Read-only schema metadata: tables, fields and their foreign keys.
//!
//! The resolver never owns metadata; it borrows it through [`MetadataProvider`]
//! for the duration of a single call. [`Metadata`] is the in-memory catalog
//! most callers load from JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MappingError, Result};
use crate::types::ColumnType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u64);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a field may surface in the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisibilityType {
    #[default]
    Normal,
    DetailsOnly,
    Hidden,
    Sensitive,
    Retired,
}

impl VisibilityType {
    /// Hidden, sensitive and retired fields are never offered as mapping targets.
    pub fn is_offered(self) -> bool {
        matches!(self, VisibilityType::Normal | VisibilityType::DetailsOnly)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    /// Owning table. Filled in from the enclosing table when loading nested JSON.
    #[serde(default)]
    pub table_id: Option<TableId>,
    /// Physical column name, e.g. `CREATED_AT`.
    pub name: String,
    /// Human label, e.g. `Created At`.
    pub display_name: String,
    #[serde(flatten)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub fk_target_field_id: Option<FieldId>,
    #[serde(default)]
    pub visibility_type: VisibilityType,
}

impl Field {
    pub fn is_foreign_key(&self) -> bool {
        self.column_type.is_foreign_key() && self.fk_target_field_id.is_some()
    }

    pub fn is_offered(&self) -> bool {
        self.visibility_type.is_offered()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub display_name: String,
    pub schema: Option<String>,
    /// Field ids in declared order.
    pub fields: Vec<FieldId>,
}

/// Lookup interface the resolver walks. Implementations must be immutable
/// while a resolution is running.
pub trait MetadataProvider {
    fn table(&self, id: TableId) -> Option<&Table>;
    fn field(&self, id: FieldId) -> Option<&Field>;
}

/// A foreign key on some table together with the table it points at.
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey<'a> {
    pub field: &'a Field,
    pub target_table: &'a Table,
}

pub fn require_table<M>(metadata: &M, id: TableId) -> Result<&Table>
where
    M: MetadataProvider + ?Sized,
{
    metadata.table(id).ok_or(MappingError::UnknownTable(id))
}

pub fn require_field<M>(metadata: &M, id: FieldId) -> Result<&Field>
where
    M: MetadataProvider + ?Sized,
{
    metadata.field(id).ok_or(MappingError::UnknownField(id))
}

/// Fields of `table` in declared order. A dangling field id is an error.
pub fn table_fields<'a, M>(metadata: &'a M, table: &Table) -> Result<Vec<&'a Field>>
where
    M: MetadataProvider + ?Sized,
{
    table
        .fields
        .iter()
        .map(|id| require_field(metadata, *id))
        .collect()
}

/// Foreign keys declared on `table`, in the table's field order.
///
/// Keys whose target field or table is not loaded are skipped: partial
/// metadata is normal, the related table simply isn't available.
pub fn foreign_keys<'a, M>(metadata: &'a M, table: &Table) -> Result<Vec<ForeignKey<'a>>>
where
    M: MetadataProvider + ?Sized,
{
    let mut keys = Vec::new();
    for field in table_fields(metadata, table)? {
        if !field.is_foreign_key() || !field.is_offered() {
            continue;
        }
        let target = field
            .fk_target_field_id
            .and_then(|id| metadata.field(id))
            .and_then(|target| target.table_id)
            .and_then(|id| metadata.table(id));
        match target {
            Some(target_table) => keys.push(ForeignKey { field, target_table }),
            None => tracing::debug!(
                field = %field.id,
                "foreign key target is not loaded, skipping"
            ),
        }
    }
    Ok(keys)
}

/// In-memory catalog keyed by id, preserving load order.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    tables: IndexMap<TableId, Table>,
    fields: IndexMap<FieldId, Field>,
}

impl MetadataProvider for Metadata {
    fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(&id)
    }
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table and its fields. Field order is the order given.
    pub fn add_table(&mut self, spec: TableSpec) -> Result<&Table> {
        if self.tables.contains_key(&spec.id) {
            return Err(MappingError::InvalidMetadata(format!(
                "duplicate table id {}",
                spec.id
            )));
        }

        let mut field_ids = Vec::with_capacity(spec.fields.len());
        for mut field in spec.fields {
            if self.fields.contains_key(&field.id) {
                return Err(MappingError::InvalidMetadata(format!(
                    "duplicate field id {}",
                    field.id
                )));
            }
            match field.table_id {
                Some(owner) if owner != spec.id => {
                    return Err(MappingError::InvalidMetadata(format!(
                        "field {} claims table {} but is listed under table {}",
                        field.id, owner, spec.id
                    )));
                }
                _ => field.table_id = Some(spec.id),
            }
            field_ids.push(field.id);
            self.fields.insert(field.id, field);
        }

        let table = Table {
            id: spec.id,
            name: spec.name,
            display_name: spec.display_name,
            schema: spec.schema,
            fields: field_ids,
        };
        Ok(self.tables.entry(table.id).or_insert(table))
    }

    /// Register a field listed outside its table. It is appended to the
    /// owning table's field order.
    pub fn add_field(&mut self, field: Field) -> Result<&Field> {
        let Some(owner) = field.table_id else {
            return Err(MappingError::InvalidMetadata(format!(
                "field {} has no table_id",
                field.id
            )));
        };
        if self.fields.contains_key(&field.id) {
            return Err(MappingError::InvalidMetadata(format!(
                "duplicate field id {}",
                field.id
            )));
        }
        let table = self
            .tables
            .get_mut(&owner)
            .ok_or(MappingError::UnknownTable(owner))?;
        table.fields.push(field.id);
        Ok(self.fields.entry(field.id).or_insert(field))
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A table as it appears in metadata JSON, fields inlined.
#[derive(Debug, Clone, Deserialize)]
pub struct TableSpec {
    pub id: TableId,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Tables may inline their fields, list them in the top-level `fields`
/// array with a `table_id`, or mix both.
#[derive(Deserialize)]
struct MetadataSpec {
    #[serde(default)]
    tables: Vec<TableSpec>,
    #[serde(default)]
    fields: Vec<Field>,
}

impl TryFrom<MetadataSpec> for Metadata {
    type Error = MappingError;

    fn try_from(spec: MetadataSpec) -> Result<Self> {
        let mut metadata = Metadata::new();
        for table in spec.tables {
            metadata.add_table(table)?;
        }
        for field in spec.fields {
            metadata.add_field(field)?;
        }
        Ok(metadata)
    }
}

impl<'de> Deserialize<'de> for Metadata {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let spec = MetadataSpec::deserialize(deserializer)?;
        Metadata::try_from(spec).map_err(serde::de::Error::custom)
    }
}
