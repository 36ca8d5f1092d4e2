//! Widget records: WidgetData, LayoutItem.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::ui::{WidgetId, WidgetKind};

/// One entry in a container's layout, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutItem {
    Widget(WidgetId),
    Spacing(i32),
    Stretch,
    Tab { label: String, widget: WidgetId },
}

impl LayoutItem {
    /// The child widget this entry holds, if any.
    pub fn widget(&self) -> Option<WidgetId> {
        match self {
            Self::Widget(widget) | Self::Tab { widget, .. } => Some(*widget),
            Self::Spacing(_) | Self::Stretch => None,
        }
    }
}

/// Data associated with a single widget.
#[derive(Debug, Clone)]
pub struct WidgetData {
    pub kind: WidgetKind,
    pub properties: BTreeMap<String, Value>,
    pub layout: Vec<LayoutItem>,
    /// Whether this widget can receive focus.
    pub focusable: bool,
    pub enabled: bool,
}

impl WidgetData {
    /// Create a widget record. Interactive kinds are focusable by default.
    pub fn new(kind: WidgetKind) -> Self {
        let focusable = matches!(
            kind,
            WidgetKind::LineEdit
                | WidgetKind::PushButton
                | WidgetKind::CheckBox
                | WidgetKind::ComboBox
                | WidgetKind::RadioButton
                | WidgetKind::Slider
                | WidgetKind::Tabs
        );
        Self {
            kind,
            properties: BTreeMap::new(),
            layout: Vec::new(),
            focusable,
            enabled: true,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    /// Child widgets in layout order.
    pub fn children(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.layout.iter().filter_map(LayoutItem::widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use slotmap::SlotMap;

    #[test]
    fn new_defaults() {
        let data = WidgetData::new(WidgetKind::Label);
        assert_eq!(data.kind, WidgetKind::Label);
        assert!(data.properties.is_empty());
        assert!(data.layout.is_empty());
        assert!(!data.focusable);
        assert!(data.enabled);
    }

    #[test]
    fn interactive_kinds_are_focusable() {
        assert!(WidgetData::new(WidgetKind::LineEdit).focusable);
        assert!(WidgetData::new(WidgetKind::PushButton).focusable);
        assert!(!WidgetData::new(WidgetKind::Column).focusable);
        assert!(!WidgetData::new(WidgetKind::ProgressBar).focusable);
    }

    #[test]
    fn builder_properties() {
        let data = WidgetData::new(WidgetKind::Slider)
            .with_property("minimum", 0)
            .focusable(false);
        assert_eq!(data.property("minimum"), Some(&json!(0)));
        assert!(!data.focusable);
    }

    #[test]
    fn children_skip_spacing_and_stretch() {
        let mut ids: SlotMap<WidgetId, ()> = SlotMap::with_key();
        let a = ids.insert(());
        let b = ids.insert(());
        let mut data = WidgetData::new(WidgetKind::Tabs);
        data.layout = vec![
            LayoutItem::Widget(a),
            LayoutItem::Spacing(4),
            LayoutItem::Stretch,
            LayoutItem::Tab {
                label: "Two".into(),
                widget: b,
            },
        ];
        assert_eq!(data.children().collect::<Vec<_>>(), vec![a, b]);
    }
}
