//! Action registry: the immutable `(provider, action)` table built once at
//! startup from every provider module's definitions and handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use switchboard_application::{ActionCatalog, ActionDescriptor, UpstreamClient};
use switchboard_domain::{ActionDefinition, ActionId, DomainError, Provider};
use thiserror::Error;
use tracing::debug;

use crate::providers::builtin_descriptors;

/// Startup errors while building the registry
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Duplicate action registration: {0}")]
    DuplicateAction(ActionId),

    #[error("Invalid action definition: {0}")]
    InvalidAction(#[from] DomainError),
}

/// Immutable lookup table of registered actions
///
/// Keys are unique by construction: [`ActionRegistry::build`] rejects the
/// whole table if any pair is registered twice.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<ActionId, ActionDescriptor>,
}

impl ActionRegistry {
    pub fn build(
        descriptors: impl IntoIterator<Item = ActionDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut actions = BTreeMap::new();
        for descriptor in descriptors {
            let id = descriptor.id().clone();
            if actions.contains_key(&id) {
                return Err(RegistryError::DuplicateAction(id));
            }
            actions.insert(id, descriptor);
        }

        debug!(actions = actions.len(), "Action registry built");
        Ok(Self { actions })
    }

    /// Registry with every bundled provider binding
    pub fn builtin(client: Arc<dyn UpstreamClient>) -> Result<Self, RegistryError> {
        Self::build(builtin_descriptors(client)?)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of actions per provider, in provider order
    pub fn provider_counts(&self) -> BTreeMap<Provider, usize> {
        let mut counts = BTreeMap::new();
        for id in self.actions.keys() {
            *counts.entry(id.provider).or_insert(0) += 1;
        }
        counts
    }
}

impl ActionCatalog for ActionRegistry {
    fn lookup(&self, id: &ActionId) -> Option<&ActionDescriptor> {
        let found = self.actions.get(id);
        debug!(action = %id, found = found.is_some(), "Action lookup");
        found
    }

    fn definitions(&self) -> Vec<&ActionDefinition> {
        // BTreeMap iteration is already ordered by (provider, action)
        self.actions.values().map(ActionDescriptor::definition).collect()
    }
}
