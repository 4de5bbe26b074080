//! Action catalog port
//!
//! Read-only lookup of registered actions. The registry that implements
//! it lives in the infrastructure layer and is immutable after startup.

use std::sync::Arc;

use switchboard_domain::{ActionDefinition, ActionId, Provider};

use super::action_handler::ActionHandler;

/// A registered action: its declarative definition plus its handler.
#[derive(Clone)]
pub struct ActionDescriptor {
    definition: ActionDefinition,
    handler: Arc<dyn ActionHandler>,
}

impl ActionDescriptor {
    pub fn new(definition: ActionDefinition, handler: Arc<dyn ActionHandler>) -> Self {
        Self {
            definition,
            handler,
        }
    }

    pub fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    pub fn handler(&self) -> &Arc<dyn ActionHandler> {
        &self.handler
    }

    pub fn id(&self) -> &ActionId {
        &self.definition.id
    }
}

impl std::fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// Port for looking up actions by id.
pub trait ActionCatalog: Send + Sync {
    fn lookup(&self, id: &ActionId) -> Option<&ActionDescriptor>;

    /// All definitions, ordered by provider then action name
    fn definitions(&self) -> Vec<&ActionDefinition>;

    fn has_action(&self, id: &ActionId) -> bool {
        self.lookup(id).is_some()
    }

    fn definitions_for(&self, provider: Provider) -> Vec<&ActionDefinition> {
        self.definitions()
            .into_iter()
            .filter(|d| d.id.provider == provider)
            .collect()
    }
}
