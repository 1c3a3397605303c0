//! Query definitions as produced by a query builder.
//!
//! A definition is either a structured query (a tree of sources and joins) or
//! a native query (raw text plus template tags). Structural problems such as
//! a query without a source are rejected while deserializing.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::MappingError;
use crate::field_ref::FieldRef;
use crate::metadata::TableId;
use crate::types::VariableType;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QueryDefinition {
    #[serde(rename = "query")]
    Structured {
        #[serde(default)]
        database: Option<u64>,
        query: StructuredQuery,
    },
    Native {
        #[serde(default)]
        database: Option<u64>,
        native: NativeQuery,
    },
}

impl QueryDefinition {
    pub fn structured(query: StructuredQuery) -> Self {
        QueryDefinition::Structured {
            database: None,
            query,
        }
    }

    pub fn native(native: NativeQuery) -> Self {
        QueryDefinition::Native {
            database: None,
            native,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            QueryDefinition::Structured { .. } => "structured",
            QueryDefinition::Native { .. } => "native",
        }
    }
}

/// Where rows of a structured query (or of a join) come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(TableId),
    Query(Box<StructuredQuery>),
}

impl Source {
    fn from_parts(
        table: Option<TableId>,
        query: Option<Box<StructuredQuery>>,
    ) -> Result<Option<Self>, MappingError> {
        match (table, query) {
            (Some(table), None) => Ok(Some(Source::Table(table))),
            (None, Some(query)) => Ok(Some(Source::Query(query))),
            (None, None) => Ok(None),
            (Some(_), Some(_)) => Err(MappingError::AmbiguousSource),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub alias: String,
    pub source: Source,
}

impl Join {
    pub fn table(alias: impl Into<String>, table: TableId) -> Self {
        Self {
            alias: alias.into(),
            source: Source::Table(table),
        }
    }
}

/// Aggregations that change the output columns of a query used as a source.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    Count,
    /// Non-null values of a field.
    CountOf(FieldRef),
    Distinct(FieldRef),
    Sum(FieldRef),
    Avg(FieldRef),
    Min(FieldRef),
    Max(FieldRef),
}

impl Aggregation {
    /// Column name the aggregation produces before deduplication.
    pub fn column_name(&self) -> &'static str {
        match self {
            Aggregation::Count | Aggregation::CountOf(_) | Aggregation::Distinct(_) => "count",
            Aggregation::Sum(_) => "sum",
            Aggregation::Avg(_) => "avg",
            Aggregation::Min(_) => "min",
            Aggregation::Max(_) => "max",
        }
    }

    pub fn argument(&self) -> Option<&FieldRef> {
        match self {
            Aggregation::Count => None,
            Aggregation::CountOf(f)
            | Aggregation::Distinct(f)
            | Aggregation::Sum(f)
            | Aggregation::Avg(f)
            | Aggregation::Min(f)
            | Aggregation::Max(f) => Some(f),
        }
    }
}

impl<'de> Deserialize<'de> for Aggregation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut clause: Vec<serde_json::Value> = Deserialize::deserialize(deserializer)?;
        if clause.is_empty() {
            return Err(D::Error::custom("empty aggregation clause"));
        }
        let operator = clause.remove(0);
        let operator = operator
            .as_str()
            .ok_or_else(|| D::Error::custom("aggregation operator must be a string"))?;

        let argument = |clause: Vec<serde_json::Value>| -> Result<FieldRef, D::Error> {
            let arg = clause.into_iter().next().ok_or_else(|| {
                D::Error::custom(format!("aggregation `{operator}` needs a field"))
            })?;
            serde_json::from_value(arg).map_err(D::Error::custom)
        };

        Ok(match operator {
            "count" if clause.is_empty() => Aggregation::Count,
            "count" => Aggregation::CountOf(argument(clause)?),
            "distinct" => Aggregation::Distinct(argument(clause)?),
            "sum" => Aggregation::Sum(argument(clause)?),
            "avg" => Aggregation::Avg(argument(clause)?),
            "min" => Aggregation::Min(argument(clause)?),
            "max" => Aggregation::Max(argument(clause)?),
            other => {
                return Err(D::Error::custom(format!(
                    "unsupported aggregation `{other}`"
                )))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuredQuery {
    pub source: Source,
    pub joins: Vec<Join>,
    pub breakout: Vec<FieldRef>,
    pub aggregation: Vec<Aggregation>,
}

impl StructuredQuery {
    pub fn from_table(table: TableId) -> Self {
        Self::from_source(Source::Table(table))
    }

    pub fn from_query(query: StructuredQuery) -> Self {
        Self::from_source(Source::Query(Box::new(query)))
    }

    fn from_source(source: Source) -> Self {
        Self {
            source,
            joins: Vec::new(),
            breakout: Vec::new(),
            aggregation: Vec::new(),
        }
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn breakout(mut self, field: FieldRef) -> Self {
        self.breakout.push(field);
        self
    }

    pub fn aggregate(mut self, aggregation: Aggregation) -> Self {
        self.aggregation.push(aggregation);
        self
    }

    /// Whether the query reshapes its source's columns.
    pub fn is_summarized(&self) -> bool {
        !self.breakout.is_empty() || !self.aggregation.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct JoinSpec {
    alias: String,
    #[serde(default)]
    source_table: Option<TableId>,
    #[serde(default)]
    source_query: Option<Box<StructuredQuery>>,
}

impl TryFrom<JoinSpec> for Join {
    type Error = MappingError;

    fn try_from(spec: JoinSpec) -> Result<Self, MappingError> {
        let source = Source::from_parts(spec.source_table, spec.source_query)?
            .ok_or_else(|| MappingError::UnresolvedJoin {
                alias: spec.alias.clone(),
            })?;
        Ok(Join {
            alias: spec.alias,
            source,
        })
    }
}

impl<'de> Deserialize<'de> for Join {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let spec = JoinSpec::deserialize(deserializer)?;
        Join::try_from(spec).map_err(D::Error::custom)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct StructuredQuerySpec {
    #[serde(default)]
    source_table: Option<TableId>,
    #[serde(default)]
    source_query: Option<Box<StructuredQuery>>,
    #[serde(default)]
    joins: Vec<Join>,
    #[serde(default)]
    breakout: Vec<FieldRef>,
    #[serde(default)]
    aggregation: Vec<Aggregation>,
}

impl TryFrom<StructuredQuerySpec> for StructuredQuery {
    type Error = MappingError;

    fn try_from(spec: StructuredQuerySpec) -> Result<Self, MappingError> {
        let source = Source::from_parts(spec.source_table, spec.source_query)?
            .ok_or(MappingError::MissingSource)?;
        Ok(StructuredQuery {
            source,
            joins: spec.joins,
            breakout: spec.breakout,
            aggregation: spec.aggregation,
        })
    }
}

impl<'de> Deserialize<'de> for StructuredQuery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let spec = StructuredQuerySpec::deserialize(deserializer)?;
        StructuredQuery::try_from(spec).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TagKind {
    Text,
    Number,
    Date,
    Dimension {
        dimension: FieldRef,
        #[serde(default, rename = "widget-type")]
        widget_type: Option<String>,
    },
    Card {
        #[serde(default, rename = "card-id")]
        card_id: Option<u64>,
    },
    Snippet {
        #[serde(default, rename = "snippet-name")]
        snippet_name: Option<String>,
    },
}

impl TagKind {
    /// Plain variables carry their own declared type.
    pub fn variable_type(&self) -> Option<VariableType> {
        match self {
            TagKind::Text => Some(VariableType::Text),
            TagKind::Number => Some(VariableType::Number),
            TagKind::Date => Some(VariableType::Date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TemplateTag {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub kind: TagKind,
}

impl TemplateTag {
    pub fn new(name: impl Into<String>, kind: TagKind) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NativeQuery {
    pub query: String,
    /// Declaration order is the order options are produced in.
    #[serde(default)]
    pub template_tags: IndexMap<String, TemplateTag>,
}

impl NativeQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            template_tags: IndexMap::new(),
        }
    }

    pub fn tag(mut self, tag: TemplateTag) -> Self {
        self.template_tags.insert(tag.name.clone(), tag);
        self
    }
}
