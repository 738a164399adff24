//! Syntax tree of a placeholder body

use std::fmt;

use serde_json::Value;

/// Dotted path into the data tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPath(pub Vec<String>);

impl DataPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Split a dotted string; empty segments are dropped
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Walk the tree; numeric segments also index arrays
    pub fn resolve<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(data, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// `propPath = literal` test applied to each array element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub property: DataPath,
    pub literal: String,
}

/// `arrayPath;resultProperty;condition`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalLookup {
    pub array: DataPath,
    pub result: DataPath,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Path(DataPath),
    Conditional(ConditionalLookup),
}

/// A parsed `{{ ... }}` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub lookup: Lookup,
    /// Raw formatter spec after `|`
    pub formatter: Option<String>,
}
