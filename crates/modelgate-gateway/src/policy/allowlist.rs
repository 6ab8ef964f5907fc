//! Allow-list compilation and matching.
//!
//! A list holding the wildcard `*` matches every candidate through the `all`
//! flag; the `*` entry itself is kept for introspection but never compared.

use crate::config::normalize::{normalize_list, ListInput, WILDCARD};

/// Compiled allow-list for one dimension (models, methods or IPs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    all: bool,
    items: Vec<String>,
}

impl AllowList {
    /// Compile from raw config. Absent input yields an empty (deny-all) list.
    pub fn compile(raw: Option<&ListInput>) -> Self {
        Self::from_items(normalize_list(raw))
    }

    /// Build from already-normalized items.
    pub fn from_items(items: Vec<String>) -> Self {
        let all = items.iter().any(|i| i == WILDCARD);
        Self { all, items }
    }

    pub fn allow_all() -> Self {
        Self::from_items(vec![WILDCARD.to_string()])
    }

    pub fn allows_all(&self) -> bool {
        self.all
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, candidate: &str) -> bool {
        if self.all {
            return true;
        }
        self.items.iter().any(|i| i != WILDCARD && i == candidate)
    }
}
