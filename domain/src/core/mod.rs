//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: errors parsing caller-supplied identifiers

pub mod error;
