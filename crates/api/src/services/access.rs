// Path: crates/api/src/services/access.rs

//! Read-only access to the registered services.

use crate::services::BlockchainService;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A read-only, type-safe service locator.
#[derive(Clone, Default)]
pub struct ServiceDirectory {
    /// Services sorted by id. Hook order on every replica follows this list.
    ordered: Arc<Vec<Arc<dyn BlockchainService>>>,
    by_type: Arc<HashMap<TypeId, Arc<dyn BlockchainService>>>,
}

impl fmt::Debug for ServiceDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDirectory")
            .field("services", &self.ordered.iter().map(|s| s.id()).collect::<Vec<_>>())
            .finish()
    }
}

impl ServiceDirectory {
    /// Creates a directory, sorting services by `id()`.
    pub fn new(mut services: Vec<Arc<dyn BlockchainService>>) -> Self {
        services.sort_by(|a, b| a.id().cmp(b.id()));
        let by_type = services
            .iter()
            .map(|s| (s.as_any().type_id(), s.clone()))
            .collect();
        Self {
            ordered: Arc::new(services),
            by_type: Arc::new(by_type),
        }
    }

    /// Gets a service by its concrete type.
    pub fn get<T: BlockchainService + 'static>(&self) -> Option<Arc<T>> {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|svc| {
                let any: Arc<dyn std::any::Any + Send + Sync> = svc.clone();
                any.downcast::<T>().ok()
            })
    }

    /// Gets a service by its dispatch id.
    pub fn get_by_id(&self, id: &str) -> Option<&Arc<dyn BlockchainService>> {
        self.ordered.iter().find(|s| s.id() == id)
    }

    /// Iterates services in deterministic (id) order.
    pub fn services_in_deterministic_order(
        &self,
    ) -> impl Iterator<Item = &Arc<dyn BlockchainService>> {
        self.ordered.iter()
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// True if no service is registered.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
