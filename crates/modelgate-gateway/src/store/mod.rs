//! Model backends.
//!
//! The gateway only talks to a `ModelRegistry`; this module builds one from
//! the `store` config section.

pub mod memory;

use std::sync::Arc;

use crate::config::schema::{StoreBackend, StoreSection};
use crate::config::WILDCARD;
use crate::dispatch::ModelRegistry;

pub use memory::{MemoryStore, OpKind, StoreError};

/// Build the model client for `store`. `None` means no client is available.
///
/// Tables must be named explicitly; a `*` entry is skipped with a warning.
pub fn build_client(store: &StoreSection) -> Option<Arc<ModelRegistry>> {
    match store.backend {
        StoreBackend::None => None,
        StoreBackend::Memory => {
            let mem = Arc::new(MemoryStore::new());
            for model in store.models.normalize() {
                if model == WILDCARD {
                    tracing::warn!("store.models does not expand `*`; list each model name");
                    continue;
                }
                mem.add_table(&model);
            }
            let mut registry = ModelRegistry::new();
            mem.register_into(&mut registry);
            Some(Arc::new(registry))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListInput;

    #[test]
    fn wildcard_is_not_a_table_name() {
        let store = StoreSection {
            backend: StoreBackend::Memory,
            models: ListInput::from("user, *"),
        };
        let registry = build_client(&store).unwrap();
        assert_eq!(registry.model_names(), vec!["user"]);
        assert!(!registry.has_model(WILDCARD));
    }

    #[test]
    fn none_backend_has_no_client() {
        let store = StoreSection {
            backend: StoreBackend::None,
            models: ListInput::from("user"),
        };
        assert!(build_client(&store).is_none());
    }
}
