//! Column types, parameter type classes and the compatibility check between them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parameter::ParameterType;

pub const TEMPORAL: &str = "type/Temporal";
pub const DATE_TIME: &str = "type/DateTime";
pub const DATE: &str = "type/Date";
pub const TIME: &str = "type/Time";
pub const TEXT: &str = "type/Text";
pub const NUMBER: &str = "type/Number";
pub const INTEGER: &str = "type/Integer";
pub const BIG_INTEGER: &str = "type/BigInteger";
pub const FLOAT: &str = "type/Float";
pub const BOOLEAN: &str = "type/Boolean";
pub const CATEGORY: &str = "type/Category";
pub const ADDRESS: &str = "type/Address";
pub const PK: &str = "type/PK";
pub const FK: &str = "type/FK";

/// Immediate ancestor of a type keyword in the type hierarchy.
fn parent(ty: &str) -> Option<&'static str> {
    Some(match ty {
        "type/DateTimeWithTZ"
        | "type/DateTimeWithLocalTZ"
        | "type/DateTimeWithZoneOffset"
        | "type/DateTimeWithZoneID" => DATE_TIME,
        "type/TimeWithTZ" | "type/TimeWithLocalTZ" | "type/TimeWithZoneOffset" => TIME,
        DATE_TIME | DATE | TIME => TEMPORAL,

        "type/CreationTimestamp"
        | "type/UpdatedTimestamp"
        | "type/DeletionTimestamp"
        | "type/JoinTimestamp"
        | "type/CancelationTimestamp" => TEMPORAL,
        "type/CreationDate"
        | "type/UpdatedDate"
        | "type/DeletionDate"
        | "type/JoinDate"
        | "type/CancelationDate"
        | "type/Birthdate" => TEMPORAL,
        "type/CreationTime"
        | "type/UpdatedTime"
        | "type/DeletionTime"
        | "type/JoinTime"
        | "type/CancelationTime" => TEMPORAL,

        BIG_INTEGER => INTEGER,
        "type/Decimal" => FLOAT,
        INTEGER | FLOAT => NUMBER,

        "type/UUID" | "type/PostgresEnum" => TEXT,

        "type/City" | "type/State" | "type/Country" | "type/ZipCode" => ADDRESS,
        ADDRESS => CATEGORY,
        "type/Name" | "type/Title" | "type/Company" | "type/Product" | "type/Source" => CATEGORY,
        _ => return None,
    })
}

/// `true` when `ty` is `ancestor` or descends from it.
pub fn isa(ty: &str, ancestor: &str) -> bool {
    let mut current = Some(ty);
    while let Some(ty) = current {
        if ty == ancestor {
            return true;
        }
        current = parent(ty);
    }
    false
}

/// Effective type of a field or result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    pub base_type: String,
    #[serde(default)]
    pub semantic_type: Option<String>,
}

impl ColumnType {
    pub fn new(base_type: impl Into<String>) -> Self {
        Self {
            base_type: base_type.into(),
            semantic_type: None,
        }
    }

    pub fn with_semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.semantic_type = Some(semantic_type.into());
        self
    }

    /// Matches on either the base type or the semantic type.
    pub fn is_a(&self, ancestor: &str) -> bool {
        isa(&self.base_type, ancestor)
            || self
                .semantic_type
                .as_deref()
                .is_some_and(|ty| isa(ty, ancestor))
    }

    /// Dates and date-times. Time-of-day columns can't take a date value.
    pub fn is_date(&self) -> bool {
        self.is_a(TEMPORAL) && !isa(&self.base_type, TIME)
    }

    pub fn is_primary_key(&self) -> bool {
        self.semantic_type.as_deref() == Some(PK)
    }

    pub fn is_foreign_key(&self) -> bool {
        self.semantic_type.as_deref() == Some(FK)
    }

    pub fn is_location(&self) -> bool {
        self.semantic_type.as_deref().is_some_and(|ty| isa(ty, ADDRESS))
    }

    pub fn is_string(&self) -> bool {
        isa(&self.base_type, TEXT)
    }

    pub fn is_number(&self) -> bool {
        isa(&self.base_type, NUMBER)
    }

    pub fn is_boolean(&self) -> bool {
        isa(&self.base_type, BOOLEAN)
    }
}

/// Declared type of a plain native-query variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    Text,
    Number,
    Date,
}

/// Compatibility class of a parameter's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Date,
    String,
    Category,
    Number,
    Location,
    Id,
    Boolean,
}

impl TypeClass {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "date" => TypeClass::Date,
            "string" => TypeClass::String,
            "category" => TypeClass::Category,
            "number" => TypeClass::Number,
            "location" => TypeClass::Location,
            "id" => TypeClass::Id,
            "boolean" => TypeClass::Boolean,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeClass::Date => "date",
            TypeClass::String => "string",
            TypeClass::Category => "category",
            TypeClass::Number => "number",
            TypeClass::Location => "location",
            TypeClass::Id => "id",
            TypeClass::Boolean => "boolean",
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides which parameter types are supported and which columns or
/// variables each one may bind to.
#[cfg_attr(test, mockall::automock)]
pub trait TypeClassifier {
    /// `None` means the parameter type is unsupported and nothing can be mapped.
    fn classify(&self, parameter_type: &ParameterType) -> Option<TypeClass>;

    fn accepts_column(&self, class: TypeClass, column: &ColumnType) -> bool;

    fn accepts_variable(&self, class: TypeClass, variable: VariableType) -> bool;
}

/// Stock classification over the `type/*` hierarchy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl TypeClassifier for DefaultClassifier {
    fn classify(&self, parameter_type: &ParameterType) -> Option<TypeClass> {
        TypeClass::from_name(parameter_type.class_name())
    }

    fn accepts_column(&self, class: TypeClass, column: &ColumnType) -> bool {
        match class {
            TypeClass::Date => column.is_date(),
            TypeClass::String => column.is_string(),
            TypeClass::Category => column.is_string() || column.is_a(CATEGORY),
            TypeClass::Number => {
                column.is_number() && !column.is_primary_key() && !column.is_foreign_key()
            }
            TypeClass::Location => column.is_location(),
            TypeClass::Id => column.is_primary_key() || column.is_foreign_key(),
            TypeClass::Boolean => column.is_boolean(),
        }
    }

    fn accepts_variable(&self, class: TypeClass, variable: VariableType) -> bool {
        matches!(
            (class, variable),
            (TypeClass::Date, VariableType::Date)
                | (TypeClass::String, VariableType::Text)
                | (TypeClass::Category, VariableType::Text)
                | (TypeClass::Location, VariableType::Text)
                | (TypeClass::Number, VariableType::Number)
                | (TypeClass::Id, VariableType::Number)
                | (TypeClass::Id, VariableType::Text)
        )
    }
}

/// Icon key shown next to a mapping option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Calendar,
    String,
    Int,
    Location,
    Label,
    Connections,
    Io,
    Unknown,
}

impl Icon {
    pub fn for_column(column: &ColumnType) -> Self {
        if column.is_foreign_key() {
            Icon::Connections
        } else if column.is_primary_key() {
            Icon::Label
        } else if column.is_location() {
            Icon::Location
        } else if column.is_a(TEMPORAL) {
            Icon::Calendar
        } else if column.is_a(CATEGORY) || column.is_string() {
            Icon::String
        } else if column.is_number() {
            Icon::Int
        } else if column.is_boolean() {
            Icon::Io
        } else {
            Icon::Unknown
        }
    }

    pub fn for_variable(variable: VariableType) -> Self {
        match variable {
            VariableType::Text => Icon::String,
            VariableType::Number => Icon::Int,
            VariableType::Date => Icon::Calendar,
        }
    }
}
