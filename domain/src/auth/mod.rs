//! Auth context module
//!
//! The core never obtains or validates credentials. It only threads the
//! caller's [`AuthContext`] through to implementations and refuses to start
//! an invocation when a field the action declares in its
//! [`CredentialRequirement`] is absent.

pub mod context;

pub use context::{AuthContext, CredentialField, CredentialRequirement};
