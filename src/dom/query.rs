//! Subtree queries.

use super::node::WidgetData;
use super::tree::Dom;
use crate::ui::WidgetId;

impl Dom {
    /// Widgets under `root` (inclusive) matching `predicate`, in tree order.
    pub fn find_in(&self, root: WidgetId, predicate: impl Fn(&WidgetData) -> bool) -> Vec<WidgetId> {
        self.walk_depth_first(root)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(&predicate))
            .collect()
    }
}
