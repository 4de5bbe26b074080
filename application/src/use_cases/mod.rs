//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod aggregate;
pub mod invoke_action;
pub(crate) mod shared;
