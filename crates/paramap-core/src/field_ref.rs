//! Field references and mapping targets.
//!
//! On the wire these keep the positional array shape the consumers of mapping
//! options already understand:
//!
//! ```text
//! ["field", 30, null]
//! ["field", 22, {"source-field": 32}]
//! ["field", 1, {"join-alias": "Joined Table"}]
//! ["field", "CREATED_AT", {"base-type": "type/DateTime"}]
//! ["template-tag", "created"]
//! ```

use serde::de::Error as _;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{MappingError, Result};
use crate::metadata::FieldId;

/// What a reference points at: a catalogued field, or a named column of a
/// nested query which has no catalogue id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKey {
    Id(FieldId),
    Name { name: String, base_type: String },
}

/// How the referenced column is reached from the query's own source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Via {
    #[default]
    Direct,
    /// Implicit join through a foreign key on the source table.
    SourceField(FieldId),
    /// Explicit join, named by its alias.
    JoinAlias(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub key: FieldKey,
    pub via: Via,
}

impl FieldRef {
    pub fn id(id: FieldId) -> Self {
        Self {
            key: FieldKey::Id(id),
            via: Via::Direct,
        }
    }

    pub fn named(name: impl Into<String>, base_type: impl Into<String>) -> Self {
        Self {
            key: FieldKey::Name {
                name: name.into(),
                base_type: base_type.into(),
            },
            via: Via::Direct,
        }
    }

    pub fn through_foreign_key(self, source_field: FieldId) -> Self {
        Self {
            via: Via::SourceField(source_field),
            ..self
        }
    }

    pub fn through_join(self, alias: impl Into<String>) -> Self {
        Self {
            via: Via::JoinAlias(alias.into()),
            ..self
        }
    }

    pub fn field_id(&self) -> Option<FieldId> {
        match self.key {
            FieldKey::Id(id) => Some(id),
            FieldKey::Name { .. } => None,
        }
    }

    fn from_parts(key: serde_json::Value, options: FieldOptions) -> Result<Self> {
        let key = match key {
            serde_json::Value::Number(n) => n
                .as_u64()
                .map(|id| FieldKey::Id(FieldId(id)))
                .ok_or_else(|| MappingError::InvalidFieldRef(format!("bad field id {n}")))?,
            serde_json::Value::String(name) => {
                let base_type = options.base_type.clone().ok_or_else(|| {
                    MappingError::InvalidFieldRef(format!(
                        "field `{name}` referenced by name needs a base-type"
                    ))
                })?;
                FieldKey::Name { name, base_type }
            }
            other => {
                return Err(MappingError::InvalidFieldRef(format!(
                    "expected a field id or name, got {other}"
                )))
            }
        };

        let via = match (options.source_field, options.join_alias) {
            (None, None) => Via::Direct,
            (Some(source), None) => Via::SourceField(source),
            (None, Some(alias)) => Via::JoinAlias(alias),
            (Some(_), Some(_)) => {
                return Err(MappingError::InvalidFieldRef(
                    "a field can't carry both source-field and join-alias".into(),
                ))
            }
        };

        Ok(Self { key, via })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct FieldOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_field: Option<FieldId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    join_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_type: Option<String>,
}

impl FieldOptions {
    fn of(field: &FieldRef) -> Option<Self> {
        let mut options = FieldOptions::default();
        match &field.via {
            Via::Direct => {}
            Via::SourceField(id) => options.source_field = Some(*id),
            Via::JoinAlias(alias) => options.join_alias = Some(alias.clone()),
        }
        if let FieldKey::Name { base_type, .. } = &field.key {
            options.base_type = Some(base_type.clone());
        }
        let empty = options.source_field.is_none()
            && options.join_alias.is_none()
            && options.base_type.is_none();
        (!empty).then_some(options)
    }
}

impl Serialize for FieldRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element("field")?;
        match &self.key {
            FieldKey::Id(id) => tuple.serialize_element(id)?,
            FieldKey::Name { name, .. } => tuple.serialize_element(name)?,
        }
        tuple.serialize_element(&FieldOptions::of(self))?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for FieldRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (tag, key, options): (String, serde_json::Value, Option<FieldOptions>) =
            Deserialize::deserialize(deserializer)?;
        if tag != "field" {
            return Err(D::Error::custom(format!(
                "expected a `field` reference, got `{tag}`"
            )));
        }
        FieldRef::from_parts(key, options.unwrap_or_default()).map_err(D::Error::custom)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            FieldKey::Id(id) => write!(f, "field {id}")?,
            FieldKey::Name { name, .. } => write!(f, "field `{name}`")?,
        }
        match &self.via {
            Via::Direct => Ok(()),
            Via::SourceField(source) => write!(f, " via {source}"),
            Via::JoinAlias(alias) => write!(f, " in join `{alias}`"),
        }
    }
}

/// `["template-tag", name]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTagRef(pub String);

impl Serialize for TemplateTagRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ("template-tag", &self.0).serialize(serializer)
    }
}

/// What a dimension target binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DimensionRef {
    Field(FieldRef),
    TemplateTag(TemplateTagRef),
}

/// How a parameter is bound at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingTarget {
    Dimension(DimensionRef),
    Variable(TemplateTagRef),
}

impl MappingTarget {
    pub fn field(field: FieldRef) -> Self {
        MappingTarget::Dimension(DimensionRef::Field(field))
    }

    pub fn dimension_tag(tag: impl Into<String>) -> Self {
        MappingTarget::Dimension(DimensionRef::TemplateTag(TemplateTagRef(tag.into())))
    }

    pub fn variable(tag: impl Into<String>) -> Self {
        MappingTarget::Variable(TemplateTagRef(tag.into()))
    }
}

impl Serialize for MappingTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MappingTarget::Dimension(dimension) => ("dimension", dimension).serialize(serializer),
            MappingTarget::Variable(tag) => ("variable", tag).serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shapes() {
        assert_eq!(
            serde_json::to_value(FieldRef::id(FieldId(30))).unwrap(),
            json!(["field", 30, null])
        );
        assert_eq!(
            serde_json::to_value(FieldRef::id(FieldId(22)).through_foreign_key(FieldId(32))).unwrap(),
            json!(["field", 22, {"source-field": 32}])
        );
        assert_eq!(
            serde_json::to_value(FieldRef::id(FieldId(1)).through_join("Joined Table")).unwrap(),
            json!(["field", 1, {"join-alias": "Joined Table"}])
        );
        assert_eq!(
            serde_json::to_value(FieldRef::named("CREATED_AT", "type/DateTime")).unwrap(),
            json!(["field", "CREATED_AT", {"base-type": "type/DateTime"}])
        );
    }

    #[test]
    fn test_targets() {
        assert_eq!(
            serde_json::to_value(MappingTarget::variable("created")).unwrap(),
            json!(["variable", ["template-tag", "created"]])
        );
        assert_eq!(
            serde_json::to_value(MappingTarget::dimension_tag("created")).unwrap(),
            json!(["dimension", ["template-tag", "created"]])
        );
        assert_eq!(
            serde_json::to_value(MappingTarget::field(FieldRef::id(FieldId(30)))).unwrap(),
            json!(["dimension", ["field", 30, null]])
        );
    }

    #[test]
    fn test_parse_field_refs() {
        let joined: FieldRef =
            serde_json::from_value(json!(["field", 1, {"join-alias": "J"}])).unwrap();
        assert_eq!(joined, FieldRef::id(FieldId(1)).through_join("J"));

        let named: FieldRef =
            serde_json::from_value(json!(["field", "TOTAL", {"base-type": "type/Float"}])).unwrap();
        assert_eq!(named, FieldRef::named("TOTAL", "type/Float"));
        assert_eq!(named.field_id(), None);
    }

    #[test]
    fn test_reject_malformed_field_refs() {
        let no_base_type = serde_json::from_value::<FieldRef>(json!(["field", "TOTAL", null]));
        assert!(no_base_type.is_err());

        let both = serde_json::from_value::<FieldRef>(
            json!(["field", 1, {"join-alias": "J", "source-field": 2}]),
        );
        assert!(both.is_err());

        let wrong_tag = serde_json::from_value::<FieldRef>(json!(["expression", "x", null]));
        assert!(wrong_tag.is_err());
    }
}
