//! Action domain module
//!
//! An **action** is one named operation offered by a [`Provider`]. Callers
//! address it by `(provider, action)` and receive a [`ResultEnvelope`]
//! regardless of how the underlying third-party API is shaped.
//!
//! ```text
//! ┌────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ ActionId       │──▶│ ActionDefinition │──▶│ ResultEnvelope   │
//! │ (lookup key)   │   │ (contracts,      │   │ {success, data?, │
//! │                │   │  credentials)    │   │  error?}         │
//! └────────────────┘   └──────────────────┘   └──────────────────┘
//! ```
//!
//! Inside the system every failure is an [`ActionError`]; the envelope is
//! only built at the invocation boundary.

pub mod entities;
pub mod envelope;
pub mod error;

pub use entities::{ActionDefinition, ActionId, Provider};
pub use envelope::ResultEnvelope;
pub use error::{ActionError, ErrorClass};
