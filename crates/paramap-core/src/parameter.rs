use serde::{Deserialize, Serialize};
use std::fmt;

/// A parameter value type such as `date/single`, `string/=` or `category`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterType(String);

impl ParameterType {
    pub fn new(ty: impl Into<String>) -> Self {
        Self(ty.into())
    }

    /// The part before the first `/`, e.g. `date` for `date/single`.
    pub fn class_name(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(class, _)| class)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The dashboard parameter a caller wants to wire up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl ParameterDescriptor {
    pub fn new(parameter_type: impl Into<String>) -> Self {
        Self {
            parameter_type: ParameterType::new(parameter_type),
            id: None,
            name: None,
            slug: None,
        }
    }
}
