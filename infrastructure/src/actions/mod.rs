//! Action registry
//!
//! The [`ActionRegistry`] is the static `(provider, action)` table that
//! implements the [`ActionCatalog`](switchboard_application::ActionCatalog)
//! port. It is built once at startup and is read-only afterwards.

mod registry;

pub use registry::{ActionRegistry, RegistryError};
