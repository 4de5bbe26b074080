//! Contract domain module
//!
//! Input and output contracts are **data**: a tree of [`SchemaNode`]s
//! describing required/optional fields, nested objects, arrays and
//! discriminated unions (`oneOf`). One generic [`ContractValidator`] walks
//! any contract against any JSON value, so no action carries hand-written
//! validation code.

pub mod schema;
pub mod validator;

pub use schema::{SchemaNode, SchemaType};
pub use validator::{ContractValidator, ContractViolation, DefaultContractValidator, ViolationKind};
