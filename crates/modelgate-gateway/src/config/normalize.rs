//! List normalization for allow-list options.
//!
//! Every list-valued option accepts either a YAML sequence or a single
//! comma-separated string. Normalization never fails: anything unusable
//! collapses to an empty list, which denies everything for that dimension.

use serde::{Deserialize, Deserializer};

/// Wildcard token that opens a dimension completely.
pub const WILDCARD: &str = "*";

/// Raw list option as written in config or the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListInput {
    One(String),
    Many(Vec<String>),
}

/// A string or a sequence is taken as is. `null`, numbers, maps and
/// non-string sequence items are dropped rather than rejected.
impl<'de> Deserialize<'de> for ListInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_yaml::Value::deserialize(deserializer)?;
        Ok(match raw {
            serde_yaml::Value::String(s) => ListInput::One(s),
            serde_yaml::Value::Sequence(items) => ListInput::Many(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        serde_yaml::Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => ListInput::default(),
        })
    }
}

impl Default for ListInput {
    fn default() -> Self {
        ListInput::Many(Vec::new())
    }
}

impl From<&str> for ListInput {
    fn from(s: &str) -> Self {
        ListInput::One(s.to_string())
    }
}

impl ListInput {
    pub fn normalize(&self) -> Vec<String> {
        normalize_list(Some(self))
    }
}

/// Trim, split on `,`, drop empties, de-duplicate keeping first occurrence.
pub fn normalize_list(raw: Option<&ListInput>) -> Vec<String> {
    let items: Vec<&str> = match raw {
        None => return Vec::new(),
        Some(ListInput::One(s)) => s.split(',').collect(),
        Some(ListInput::Many(v)) => v.iter().map(String::as_str).collect(),
    };

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if item.is_empty() || out.iter().any(|x| x == item) {
            continue;
        }
        out.push(item.to_string());
    }
    out
}
