use shared::{
    domain::{Direction, MainView, ViewTag},
    error::HeroError,
};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTransition {
    pub from: ViewTag,
    pub to: ViewTag,
}

/// Current view plus the main-sequence view overlays return to.
#[derive(Debug, Clone)]
pub struct ViewStateMachine {
    current: ViewTag,
    last_main_view: MainView,
}

impl ViewStateMachine {
    pub fn new() -> Self {
        Self {
            current: ViewTag::Video,
            last_main_view: MainView::Video,
        }
    }

    pub fn current(&self) -> &ViewTag {
        &self.current
    }

    pub fn last_main_view(&self) -> MainView {
        self.last_main_view
    }

    /// Gesture edge. Only defined inside the main sequence; the ends and any
    /// overlay are no-ops.
    pub fn apply_intent(&mut self, direction: Direction) -> Option<ViewTransition> {
        let next = self.current.main_view()?.step(direction)?;
        Some(self.enter(next.into()))
    }

    /// Menu selection. Overlays are reachable from anywhere; main-sequence
    /// views are only reachable by gesture or [`Self::back`].
    pub fn change_view(&mut self, view: ViewTag) -> Result<Option<ViewTransition>, HeroError> {
        if !view.is_overlay() {
            return Err(HeroError::NotAnOverlay(view));
        }
        if view == self.current {
            return Ok(None);
        }
        Ok(Some(self.enter(view)))
    }

    pub fn back(&mut self) -> Option<ViewTransition> {
        if !self.current.is_overlay() {
            return None;
        }
        Some(self.enter(self.last_main_view.into()))
    }

    fn enter(&mut self, view: ViewTag) -> ViewTransition {
        if let Some(main) = view.main_view() {
            self.last_main_view = main;
        }
        let from = std::mem::replace(&mut self.current, view);
        info!("view: {} -> {}", from, self.current);
        ViewTransition {
            from,
            to: self.current.clone(),
        }
    }
}

impl Default for ViewStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
