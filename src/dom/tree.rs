//! Tree operations: insert, append, remove, walk.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{LayoutItem, WidgetData};
use crate::ui::WidgetId;

/// Widget arena.
///
/// All widgets live in a single `SlotMap`. Child order lives in each widget's
/// layout; parent links are kept in a secondary map so removal is
/// O(subtree size) and lookup is O(1).
#[derive(Debug, Default)]
pub struct Dom {
    pub(crate) widgets: SlotMap<WidgetId, WidgetData>,
    parent: SecondaryMap<WidgetId, WidgetId>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a detached widget.
    pub fn insert(&mut self, data: WidgetData) -> WidgetId {
        self.widgets.insert(data)
    }

    /// Append `child` to `parent`'s layout, detaching it from any previous
    /// parent. Returns `false` if either widget is missing.
    pub fn append_child(&mut self, parent: WidgetId, child: WidgetId) -> bool {
        self.push_child(parent, child, LayoutItem::Widget(child))
    }

    /// Append `child` to a tab widget as a page titled `label`.
    pub fn add_tab(&mut self, tabs: WidgetId, child: WidgetId, label: &str) -> bool {
        self.push_child(
            tabs,
            child,
            LayoutItem::Tab {
                label: label.to_owned(),
                widget: child,
            },
        )
    }

    fn push_child(&mut self, parent: WidgetId, child: WidgetId, item: LayoutItem) -> bool {
        if parent == child || !self.widgets.contains_key(child) {
            return false;
        }
        if !self.widgets.contains_key(parent) {
            return false;
        }
        self.detach(child);
        self.parent.insert(child, parent);
        if let Some(data) = self.widgets.get_mut(parent) {
            data.layout.push(item);
        }
        true
    }

    pub fn add_spacing(&mut self, container: WidgetId, size: i32) {
        if let Some(data) = self.widgets.get_mut(container) {
            data.layout.push(LayoutItem::Spacing(size));
        }
    }

    pub fn add_stretch(&mut self, container: WidgetId) {
        if let Some(data) = self.widgets.get_mut(container) {
            data.layout.push(LayoutItem::Stretch);
        }
    }

    fn detach(&mut self, id: WidgetId) {
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(parent) = self.widgets.get_mut(parent_id) {
                parent.layout.retain(|item| item.widget() != Some(id));
            }
        }
    }

    /// Remove a widget and all its descendants.
    ///
    /// Returns the removed ids, `id` first; empty if it didn't exist.
    pub fn remove(&mut self, id: WidgetId) -> Vec<WidgetId> {
        if !self.widgets.contains_key(id) {
            return Vec::new();
        }
        self.detach(id);

        let mut removed = Vec::new();
        let mut to_remove = VecDeque::from([id]);
        while let Some(current) = to_remove.pop_front() {
            self.parent.remove(current);
            if let Some(data) = self.widgets.remove(current) {
                to_remove.extend(data.children());
                removed.push(current);
            }
        }
        removed
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.parent.get(id).copied()
    }

    /// Child widgets in layout order. Empty if the widget does not exist.
    pub fn children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.widgets
            .get(id)
            .map(|data| data.children().collect())
            .unwrap_or_default()
    }

    /// Ancestors from the immediate parent up to the tree root.
    pub fn ancestors(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    pub fn get(&self, id: WidgetId) -> Option<&WidgetData> {
        self.widgets.get(id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetData> {
        self.widgets.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            let Some(data) = self.widgets.get(current) else {
                continue;
            };
            result.push(current);
            let kids: Vec<WidgetId> = data.children().collect();
            stack.extend(kids.into_iter().rev());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::WidgetKind;

    /// ```text
    ///        root (column)
    ///       /  [8]  \
    ///      a         b (label)
    ///    (row)
    ///    /   \
    ///   c     d
    /// ```
    fn build_tree() -> (Dom, WidgetId, WidgetId, WidgetId, WidgetId, WidgetId) {
        let mut dom = Dom::new();
        let root = dom.insert(WidgetData::new(WidgetKind::Column));
        let a = dom.insert(WidgetData::new(WidgetKind::Row));
        let b = dom.insert(WidgetData::new(WidgetKind::Label));
        let c = dom.insert(WidgetData::new(WidgetKind::PushButton));
        let d = dom.insert(WidgetData::new(WidgetKind::CheckBox));
        dom.append_child(root, a);
        dom.add_spacing(root, 8);
        dom.append_child(root, b);
        dom.append_child(a, c);
        dom.append_child(a, d);
        (dom, root, a, b, c, d)
    }

    #[test]
    fn append_links_parent_and_layout() {
        let (dom, root, a, b, c, _d) = build_tree();
        assert_eq!(dom.parent(a), Some(root));
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(root), None);
        assert_eq!(dom.children(root), vec![a, b]);
        assert_eq!(
            dom.get(root).unwrap().layout,
            vec![
                LayoutItem::Widget(a),
                LayoutItem::Spacing(8),
                LayoutItem::Widget(b)
            ]
        );
    }

    #[test]
    fn append_reparents() {
        let (mut dom, root, a, b, c, _d) = build_tree();
        dom.append_child(root, c);
        assert_eq!(dom.parent(c), Some(root));
        assert!(!dom.children(a).contains(&c));
        assert_eq!(dom.children(root), vec![a, b, c]);
    }

    #[test]
    fn append_rejects_self_and_missing() {
        let (mut dom, root, ..) = build_tree();
        assert!(!dom.append_child(root, root));
        let stale = dom.insert(WidgetData::new(WidgetKind::Label));
        dom.remove(stale);
        assert!(!dom.append_child(root, stale));
    }

    #[test]
    fn tabs_are_children() {
        let mut dom = Dom::new();
        let tabs = dom.insert(WidgetData::new(WidgetKind::Tabs));
        let page = dom.insert(WidgetData::new(WidgetKind::Column));
        assert!(dom.add_tab(tabs, page, "General"));
        assert_eq!(dom.children(tabs), vec![page]);
        assert_eq!(dom.parent(page), Some(tabs));
    }

    #[test]
    fn ancestors() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.ancestors(c), vec![a, root]);
        assert!(dom.ancestors(root).is_empty());
    }

    #[test]
    fn remove_subtree() {
        let (mut dom, root, a, b, c, d) = build_tree();
        let removed = dom.remove(a);
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0], a);
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert_eq!(dom.children(root), vec![b]);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn remove_nonexistent() {
        let mut dom = Dom::new();
        let id = dom.insert(WidgetData::new(WidgetKind::Label));
        dom.remove(id);
        assert!(dom.remove(id).is_empty());
        assert!(dom.is_empty());
    }

    #[test]
    fn walk_depth_first() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(dom.walk_depth_first(a), vec![a, c, d]);
    }
}
