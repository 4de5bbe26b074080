//! Aggregation domain module
//!
//! Pure building blocks of the fan-out/fan-in pattern: the data a branch
//! produces ([`Page`], [`AggregationItem`]), the per-branch pagination
//! state machine ([`PaginationState`]) and the merge that runs once every
//! branch has settled ([`merge_branches`]). Scheduling lives in the
//! application layer's `AggregationEngine`.

pub mod merge;
pub mod pagination;
pub mod value_objects;

pub use merge::{
    BranchFailure, BranchOutcome, MergeReport, merge_branches, merge_branches_with,
};
pub use pagination::PaginationState;
pub use value_objects::{AggregationItem, IdentityKeyed, Page, PageCursor, SourceDescriptor};
