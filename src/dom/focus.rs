//! Focus chain for one window's widget tree.

use super::tree::Dom;
use crate::ui::WidgetId;

/// Ordered list of focusable widgets for tab navigation.
///
/// Rebuilt from the window's root whenever its content changes. Focus cycles
/// through the chain forward or backward.
#[derive(Debug, Default)]
pub struct FocusChain {
    /// Focusable widgets in tab order (depth-first).
    widgets: Vec<WidgetId>,
    current: Option<usize>,
}

impl FocusChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the tree under `root`, keeping focus on the previously
    /// focused widget if it is still present.
    pub fn rebuild(&mut self, dom: &Dom, root: Option<WidgetId>) {
        let old_focused = self.current_widget();
        self.widgets.clear();
        self.current = None;

        let Some(root) = root else {
            return;
        };
        self.widgets = dom.find_in(root, |data| data.focusable && data.enabled);

        if let Some(old) = old_focused {
            self.current = self.widgets.iter().position(|&w| w == old);
        }
    }

    pub fn current_widget(&self) -> Option<WidgetId> {
        self.current.and_then(|idx| self.widgets.get(idx).copied())
    }

    /// Move focus forward. Wraps around.
    pub fn focus_next(&mut self) -> Option<WidgetId> {
        if self.widgets.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(idx) => (idx + 1) % self.widgets.len(),
            None => 0,
        };
        self.current = Some(next);
        self.widgets.get(next).copied()
    }

    /// Move focus backward. Wraps around.
    pub fn focus_previous(&mut self) -> Option<WidgetId> {
        if self.widgets.is_empty() {
            return None;
        }
        let prev = match self.current {
            Some(0) | None => self.widgets.len() - 1,
            Some(idx) => idx - 1,
        };
        self.current = Some(prev);
        self.widgets.get(prev).copied()
    }

    /// Focus a specific widget. Returns `true` if it is in the chain.
    pub fn focus_widget(&mut self, id: WidgetId) -> bool {
        match self.widgets.iter().position(|&w| w == id) {
            Some(pos) => {
                self.current = Some(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}
