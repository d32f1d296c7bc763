//! crates/translation_viewer_core/src/navigation.rs
//!
//! Page/navigation controller: owns the current page and page count of the
//! active source and keeps the page inside the document's bounds.

use crate::domain::{NavigationState, SourceKind};

/// What a navigation call did to the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    /// The active source cannot be paged (none loaded, HTML, or a single page).
    Ignored,
    /// Accepted, but the page was already at the boundary.
    Unchanged,
    Moved { from: u32, to: u32 },
}

#[derive(Debug, Default)]
pub struct NavigationController {
    state: NavigationState,
    kind: Option<SourceKind>,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to a new source (or none) and resets to page 1 of an unknown count.
    pub fn load(&mut self, kind: Option<SourceKind>) {
        self.kind = kind;
        self.state = NavigationState::default();
    }

    /// Records the page count reported by the document adapter, clamping the
    /// current page into range when the count is known. Returns true when the
    /// current page had to move.
    pub fn set_page_count(&mut self, count: u32) -> bool {
        self.state.page_count = count;
        if count == 0 {
            return false;
        }
        let clamped = self.state.current_page.clamp(1, count);
        let moved = clamped != self.state.current_page;
        self.state.current_page = clamped;
        moved
    }

    pub fn previous(&mut self) -> PageMove {
        self.step(|page, _| page.saturating_sub(1).max(1))
    }

    pub fn next(&mut self) -> PageMove {
        self.step(|page, count| {
            let next = page.saturating_add(1);
            if count > 0 {
                next.min(count)
            } else {
                next
            }
        })
    }

    fn step(&mut self, f: impl FnOnce(u32, u32) -> u32) -> PageMove {
        if self.kind != Some(SourceKind::Pdf) || self.state.page_count == 1 {
            return PageMove::Ignored;
        }
        let from = self.state.current_page;
        let to = f(from, self.state.page_count);
        if to == from {
            return PageMove::Unchanged;
        }
        self.state.current_page = to;
        PageMove::Moved { from, to }
    }

    /// Whether the presentation layer should offer page controls at all.
    pub fn can_navigate(&self) -> bool {
        self.kind == Some(SourceKind::Pdf) && self.state.page_count > 1
    }

    pub fn can_go_previous(&self) -> bool {
        self.can_navigate() && self.state.current_page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.can_navigate() && self.state.current_page < self.state.page_count
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    pub fn page_count(&self) -> u32 {
        self.state.page_count
    }
}
