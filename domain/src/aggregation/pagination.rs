//! Per-query pagination state machine
//!
//! ```text
//! Start ──page(cursor)──▶ HasCursor ──page(cursor)──▶ ... ──page(None)──▶ Exhausted
//!   └────────────────────────page(None)────────────────────────────────────┘
//! ```
//!
//! The only branch is the cursor-present test on each response.

use super::value_objects::PageCursor;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PaginationState {
    /// No request made yet
    #[default]
    Start,
    /// The last response carried a continuation cursor
    HasCursor(PageCursor),
    /// The last response carried no cursor
    Exhausted,
}

impl PaginationState {
    /// Cursor to send with the next request, or `None` for the first one.
    ///
    /// Returns `None` as well once exhausted; callers check
    /// [`is_exhausted`](Self::is_exhausted) first.
    pub fn next_request_cursor(&self) -> Option<&PageCursor> {
        match self {
            PaginationState::HasCursor(cursor) => Some(cursor),
            PaginationState::Start | PaginationState::Exhausted => None,
        }
    }

    /// Apply one page response.
    pub fn advance(self, next_cursor: Option<PageCursor>) -> Self {
        match (self, next_cursor) {
            (PaginationState::Exhausted, _) => PaginationState::Exhausted,
            (_, Some(cursor)) => PaginationState::HasCursor(cursor),
            (_, None) => PaginationState::Exhausted,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, PaginationState::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_page_walk() {
        let state = PaginationState::Start;
        assert_eq!(state.next_request_cursor(), None);

        let state = state.advance(Some(PageCursor::new("p2")));
        assert_eq!(state.next_request_cursor(), Some(&PageCursor::new("p2")));

        let state = state.advance(Some(PageCursor::new("p3")));
        assert_eq!(state.next_request_cursor(), Some(&PageCursor::new("p3")));

        let state = state.advance(None);
        assert!(state.is_exhausted());
    }

    #[test]
    fn test_single_page() {
        assert!(PaginationState::Start.advance(None).is_exhausted());
    }

    #[test]
    fn test_exhausted_is_terminal() {
        let state = PaginationState::Exhausted.advance(Some(PageCursor::new("late")));
        assert!(state.is_exhausted());
    }
}
