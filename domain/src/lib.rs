//! Domain layer for switchboard
//!
//! This crate contains the core types and pure rules of the action
//! invocation framework. It has no dependencies on infrastructure or
//! presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Actions
//!
//! An action is addressed by `(provider, action)` ([`ActionId`]) and
//! described by an [`ActionDefinition`]: input contract, output contract and
//! the credentials it requires. Every invocation ends in a
//! [`ResultEnvelope`] `{success, data?, error?}`.
//!
//! ## Contracts
//!
//! Contracts are data ([`SchemaNode`]) checked by one generic
//! [`ContractValidator`].
//!
//! ## Aggregation
//!
//! - **Pagination**: each branch walks `Start -> HasCursor -> Exhausted`
//! - **Merge**: enumeration order, first-seen-wins dedup, post-merge limit

pub mod action;
pub mod aggregation;
pub mod auth;
pub mod contract;
pub mod core;

// Re-export commonly used types
pub use action::{ActionDefinition, ActionError, ActionId, ErrorClass, Provider, ResultEnvelope};
pub use aggregation::{
    AggregationItem, BranchFailure, BranchOutcome, IdentityKeyed, MergeReport, Page, PageCursor,
    PaginationState, SourceDescriptor, merge_branches, merge_branches_with,
};
pub use auth::{AuthContext, CredentialField, CredentialRequirement};
pub use contract::{
    ContractValidator, ContractViolation, DefaultContractValidator, SchemaNode, SchemaType,
    ViolationKind,
};
pub use core::error::DomainError;
