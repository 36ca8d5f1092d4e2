//! The tree constructor.

use serde_json::Value;
use tracing::{debug, warn};

use super::component::construct_component;
use super::connect::{connect_name, connect_reference_value, connect_string_value, Finisher};
use super::event::{connect_event, SignalSource};
use super::top_level::construct_top_level;
use super::{ConstructError, Constructed};
use crate::handler::HandlerRef;
use crate::spec::{
    BoxNode, CheckBoxNode, ComboBoxNode, GroupNode, LineEditNode, Node, ProgressBarNode,
    PushButtonNode, RadioButtonNode, SliderNode, StackNode, TabsNode, TextLabelNode,
};
use crate::ui::{UiRef, UserInterface, WidgetId, WidgetKind};
use crate::window::Window;

const DEFAULT_MINIMUM: i64 = 0;
const DEFAULT_MAXIMUM: i64 = 100;

/// Construct `node` against `handler`.
///
/// Widget nodes produce a widget and append their deferred bindings to
/// `finishers`; the caller runs them once the enclosing tree is complete.
/// Top-level nodes produce a [`Window`] and run their own finishers.
/// Unknown nodes produce `None`.
pub fn construct(
    ui: &UiRef,
    window: Option<&Window>,
    node: &Node,
    handler: Option<&HandlerRef>,
    finishers: &mut Vec<Finisher>,
) -> Result<Option<Constructed>, ConstructError> {
    if node.is_top_level() {
        let app = window.and_then(Window::app);
        return Ok(construct_top_level(ui, app, window, node, handler)?.map(Constructed::Window));
    }
    let mut builder = Builder::new(&**ui, finishers);
    Ok(builder.construct_widget(node, handler)?.map(Constructed::Widget))
}

/// Surround `content` with `margin` on all four sides.
///
/// The content goes in a column padded top and bottom, inside a row padded
/// left and right; the row is returned. No margin, or zero, returns
/// `content` itself.
pub fn construct_margin(ui: &dyn UserInterface, content: WidgetId, margin: Option<i32>) -> WidgetId {
    let Some(margin) = margin.filter(|&m| m != 0) else {
        return content;
    };
    let column = ui.create_widget(WidgetKind::Column);
    ui.add_spacing(column, margin);
    ui.add_child(column, content);
    ui.add_spacing(column, margin);
    let row = ui.create_widget(WidgetKind::Row);
    ui.add_spacing(row, margin);
    ui.add_child(row, column);
    ui.add_spacing(row, margin);
    row
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// State threaded through one construction pass.
pub(crate) struct Builder<'a> {
    pub(crate) ui: &'a dyn UserInterface,
    pub(crate) finishers: &'a mut Vec<Finisher>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(
        ui: &'a dyn UserInterface,
        finishers: &'a mut Vec<Finisher>,
    ) -> Self {
        Self {
            ui,
            finishers,
        }
    }

    pub(crate) fn construct_widget(
        &mut self,
        node: &Node,
        handler: Option<&HandlerRef>,
    ) -> Result<Option<WidgetId>, ConstructError> {
        let widget = match node {
            Node::Column(node) => self.construct_box(WidgetKind::Column, node, handler)?,
            Node::Row(node) => self.construct_box(WidgetKind::Row, node, handler)?,
            Node::Tabs(node) => self.construct_tabs(node, handler)?,
            Node::Stack(node) => self.construct_stack(node, handler)?,
            Node::Group(node) => self.construct_group(node, handler)?,
            Node::TextLabel(node) => self.construct_text_label(node, handler),
            Node::LineEdit(node) => self.construct_line_edit(node, handler)?,
            Node::PushButton(node) => self.construct_push_button(node, handler),
            Node::CheckBox(node) => self.construct_check_box(node, handler)?,
            Node::ComboBox(node) => self.construct_combo_box(node, handler)?,
            Node::RadioButton(node) => self.construct_radio_button(node, handler)?,
            Node::Slider(node) => self.construct_slider(node, handler)?,
            Node::ProgressBar(node) => self.construct_progress_bar(node, handler)?,
            Node::Component(node) => return construct_component(self, node, handler),
            Node::ModelessDialog(_) | Node::Window(_) => {
                warn!(kind = node.kind_name(), "top-level node inside a widget tree; skipped");
                return Ok(None);
            }
            Node::Spacing { .. } | Node::Stretch => {
                debug!(kind = node.kind_name(), "spacing outside a box; skipped");
                return Ok(None);
            }
            Node::Unknown => {
                debug!("unknown node type; skipped");
                return Ok(None);
            }
        };
        Ok(Some(widget))
    }

    fn reference(
        &mut self,
        widget: WidgetId,
        property: &str,
        value: Option<&crate::spec::ReferenceValue>,
        handler: Option<&HandlerRef>,
    ) -> Result<(), ConstructError> {
        connect_reference_value(self.ui, widget, property, value, handler, None, self.finishers)
    }

    fn event(
        &self,
        widget: WidgetId,
        method: Option<&String>,
        handler: Option<&HandlerRef>,
        event: &str,
        arg_names: &[&str],
    ) {
        connect_event(
            self.ui,
            widget,
            SignalSource::Widget(widget),
            method.map(String::as_str),
            handler,
            event,
            arg_names,
        );
    }

    fn set(&self, widget: WidgetId, property: &str, value: impl Into<Value>) {
        self.ui.set_property(widget, property, value.into());
    }

    // ── Containers ───────────────────────────────────────────────────

    fn construct_box(
        &mut self,
        kind: WidgetKind,
        node: &BoxNode,
        handler: Option<&HandlerRef>,
    ) -> Result<WidgetId, ConstructError> {
        let widget = self.ui.create_widget(kind);
        for (index, child) in node.children.iter().enumerate() {
            if index > 0 {
                if let Some(spacing) = node.spacing {
                    self.ui.add_spacing(widget, spacing);
                }
            }
            match child {
                Node::Spacing { size } => self.ui.add_spacing(widget, *size),
                Node::Stretch => self.ui.add_stretch(widget),
                _ => {
                    if let Some(child) = self.construct_widget(child, handler)? {
                        self.ui.add_child(widget, child);
                    }
                }
            }
        }
        connect_name(handler, node.name.as_deref(), widget);
        Ok(construct_margin(self.ui, widget, node.margin))
    }

    fn construct_tabs(
        &mut self,
        node: &TabsNode,
        handler: Option<&HandlerRef>,
    ) -> Result<WidgetId, ConstructError> {
        let widget = self.ui.create_widget(WidgetKind::Tabs);
        for tab in &node.tabs {
            if let Some(page) = self.construct_widget(&tab.content, handler)? {
                self.ui.add_tab(widget, page, &tab.label);
            }
        }
        connect_name(handler, node.name.as_deref(), widget);
        self.reference(widget, "current_index", node.current_index.as_ref(), handler)?;
        self.event(
            widget,
            node.on_current_index_changed.as_ref(),
            handler,
            "on_current_index_changed",
            &["current_index"],
        );
        Ok(widget)
    }

    fn construct_stack(
        &mut self,
        node: &StackNode,
        handler: Option<&HandlerRef>,
    ) -> Result<WidgetId, ConstructError> {
        let widget = self.ui.create_widget(WidgetKind::Stack);
        for child in &node.children {
            if let Some(page) = self.construct_widget(child, handler)? {
                self.ui.add_child(widget, page);
            }
        }
        connect_name(handler, node.name.as_deref(), widget);
        self.reference(widget, "current_index", node.current_index.as_ref(), handler)?;
        self.event(
            widget,
            node.on_current_index_changed.as_ref(),
            handler,
            "on_current_index_changed",
            &["current_index"],
        );
        Ok(widget)
    }

    fn construct_group(
        &mut self,
        node: &GroupNode,
        handler: Option<&HandlerRef>,
    ) -> Result<WidgetId, ConstructError> {
        let widget = self.ui.create_widget(WidgetKind::Group);
        if let Some(content) = self.construct_widget(&node.content, handler)? {
            let content = construct_margin(self.ui, content, node.margin);
            self.ui.add_child(widget, content);
        }
        connect_name(handler, node.name.as_deref(), widget);
        connect_string_value(
            self.ui,
            widget,
            "title",
            node.title.as_ref(),
            handler,
            self.finishers,
        );
        Ok(widget)
    }

    // ── Leaves ───────────────────────────────────────────────────────

    fn construct_text_label(&mut self, node: &TextLabelNode, handler: Option<&HandlerRef>) -> WidgetId {
        let widget = self.ui.create_widget(WidgetKind::Label);
        connect_name(handler, node.name.as_deref(), widget);
        connect_string_value(
            self.ui,
            widget,
            "text",
            node.text.as_ref(),
            handler,
            self.finishers,
        );
        widget
    }

    fn construct_line_edit(
        &mut self,
        node: &LineEditNode,
        handler: Option<&HandlerRef>,
    ) -> Result<WidgetId, ConstructError> {
        let widget = self.ui.create_widget(WidgetKind::LineEdit);
        if let Some(editable) = node.editable {
            self.set(widget, "editable", editable);
        }
        if let Some(placeholder) = &node.placeholder_text {
            self.set(widget, "placeholder_text", placeholder.as_str());
        }
        if let Some(enabled) = node.clear_button_enabled {
            self.set(widget, "clear_button_enabled", enabled);
        }
        connect_name(handler, node.name.as_deref(), widget);
        self.reference(widget, "text", node.text.as_ref(), handler)?;
        self.event(widget, node.on_editing_finished.as_ref(), handler, "on_editing_finished", &["text"]);
        self.event(widget, node.on_escape_pressed.as_ref(), handler, "on_escape_pressed", &[]);
        self.event(widget, node.on_return_pressed.as_ref(), handler, "on_return_pressed", &[]);
        self.event(widget, node.on_key_pressed.as_ref(), handler, "on_key_pressed", &["key"]);
        self.event(widget, node.on_text_edited.as_ref(), handler, "on_text_edited", &["text"]);
        Ok(widget)
    }

    fn construct_push_button(&mut self, node: &PushButtonNode, handler: Option<&HandlerRef>) -> WidgetId {
        let widget = self.ui.create_widget(WidgetKind::PushButton);
        if let Some(text) = &node.text {
            self.set(widget, "text", text.as_str());
        }
        connect_name(handler, node.name.as_deref(), widget);
        self.event(widget, node.on_clicked.as_ref(), handler, "on_clicked", &[]);
        widget
    }

    fn construct_check_box(
        &mut self,
        node: &CheckBoxNode,
        handler: Option<&HandlerRef>,
    ) -> Result<WidgetId, ConstructError> {
        let widget = self.ui.create_widget(WidgetKind::CheckBox);
        if let Some(text) = &node.text {
            self.set(widget, "text", text.as_str());
        }
        if let Some(tristate) = node.tristate {
            self.set(widget, "tristate", tristate);
        }
        connect_name(handler, node.name.as_deref(), widget);
        self.reference(widget, "checked", node.checked.as_ref(), handler)?;
        self.reference(widget, "check_state", node.check_state.as_ref(), handler)?;
        self.event(widget, node.on_checked_changed.as_ref(), handler, "on_checked_changed", &["checked"]);
        self.event(
            widget,
            node.on_check_state_changed.as_ref(),
            handler,
            "on_check_state_changed",
            &["check_state"],
        );
        Ok(widget)
    }

    fn construct_combo_box(
        &mut self,
        node: &ComboBoxNode,
        handler: Option<&HandlerRef>,
    ) -> Result<WidgetId, ConstructError> {
        let widget = self.ui.create_widget(WidgetKind::ComboBox);
        if let Some(items) = &node.items {
            self.set(widget, "items", Value::Array(items.clone()));
        }
        connect_name(handler, node.name.as_deref(), widget);
        self.reference(widget, "current_index", node.current_index.as_ref(), handler)?;
        connect_reference_value(
            self.ui,
            widget,
            "items_ref",
            node.items_ref.as_ref(),
            handler,
            Some("items"),
            self.finishers,
        )?;
        self.event(
            widget,
            node.on_current_index_changed.as_ref(),
            handler,
            "on_current_index_changed",
            &["current_index"],
        );
        Ok(widget)
    }

    fn construct_radio_button(
        &mut self,
        node: &RadioButtonNode,
        handler: Option<&HandlerRef>,
    ) -> Result<WidgetId, ConstructError> {
        let widget = self.ui.create_widget(WidgetKind::RadioButton);
        if let Some(text) = &node.text {
            self.set(widget, "text", text.as_str());
        }
        self.set(widget, "value", node.value.clone().unwrap_or(Value::Null));
        connect_name(handler, node.name.as_deref(), widget);
        self.reference(widget, "group_value", node.group_value.as_ref(), handler)?;
        Ok(widget)
    }

    fn construct_slider(
        &mut self,
        node: &SliderNode,
        handler: Option<&HandlerRef>,
    ) -> Result<WidgetId, ConstructError> {
        let widget = self.ui.create_widget(WidgetKind::Slider);
        self.set(widget, "minimum", node.minimum.unwrap_or(DEFAULT_MINIMUM));
        self.set(widget, "maximum", node.maximum.unwrap_or(DEFAULT_MAXIMUM));
        connect_name(handler, node.name.as_deref(), widget);
        self.reference(widget, "value", node.value.as_ref(), handler)?;
        self.event(widget, node.on_value_changed.as_ref(), handler, "on_value_changed", &["value"]);
        self.event(widget, node.on_slider_pressed.as_ref(), handler, "on_slider_pressed", &[]);
        self.event(widget, node.on_slider_released.as_ref(), handler, "on_slider_released", &[]);
        self.event(widget, node.on_slider_moved.as_ref(), handler, "on_slider_moved", &["value"]);
        Ok(widget)
    }

    fn construct_progress_bar(
        &mut self,
        node: &ProgressBarNode,
        handler: Option<&HandlerRef>,
    ) -> Result<WidgetId, ConstructError> {
        let widget = self.ui.create_widget(WidgetKind::ProgressBar);
        self.set(widget, "minimum", node.minimum.unwrap_or(DEFAULT_MINIMUM));
        self.set(widget, "maximum", node.maximum.unwrap_or(DEFAULT_MAXIMUM));
        connect_name(handler, node.name.as_deref(), widget);
        self.reference(widget, "value", node.value.as_ref(), handler)?;
        Ok(widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarative::run_finishers;
    use crate::handler::{handler_ref, EventArgs, Handler};
    use crate::spec::{BindingExpr, Tab};
    use crate::testing::{snapshot::tree_to_string, HeadlessUi};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    #[derive(Default)]
    struct Form {
        values: BTreeMap<String, Value>,
        widgets: BTreeMap<String, WidgetId>,
        calls: Rc<RefCell<Vec<(String, EventArgs)>>>,
    }

    impl Handler for Form {
        fn property(&self, name: &str) -> Option<Value> {
            self.values.get(name).cloned()
        }

        fn set_property(&mut self, name: &str, value: Value) -> bool {
            self.values.insert(name.to_owned(), value);
            true
        }

        fn set_widget(&mut self, name: &str, widget: WidgetId) {
            self.widgets.insert(name.to_owned(), widget);
        }

        fn has_method(&self, name: &str) -> bool {
            matches!(name, "ok_clicked" | "text_changed")
        }

        fn call_method(&mut self, name: &str, _sender: WidgetId, args: &EventArgs) {
            self.calls.borrow_mut().push((name.to_owned(), args.clone()));
        }
    }

    fn form() -> HandlerRef {
        let mut form = Form::default();
        form.values.insert("selected_tab".into(), json!(1));
        form.values.insert("name".into(), json!("Ada"));
        handler_ref(form)
    }

    fn setup() -> (Rc<HeadlessUi>, UiRef) {
        let headless = Rc::new(HeadlessUi::new());
        let ui: UiRef = headless.clone();
        (headless, ui)
    }

    fn build(ui: &UiRef, node: &Node, handler: Option<&HandlerRef>) -> WidgetId {
        let mut finishers = Vec::new();
        let built = construct(ui, None, node, handler, &mut finishers)
            .unwrap()
            .and_then(|c| c.widget())
            .unwrap();
        run_finishers(&**ui, finishers).unwrap();
        built
    }

    // ── Containers ───────────────────────────────────────────────────

    #[test]
    fn column_spacing_between_children_only() {
        let (headless, ui) = setup();
        let node = BoxNode::new([
            TextLabelNode::new().with_text("a").unwrap().into(),
            Node::spacing(3),
            TextLabelNode::new().with_text("b").unwrap().into(),
            Node::stretch(),
        ])
        .with_spacing(5);
        let root = build(&ui, &Node::Column(node), None);
        insta::assert_snapshot!(tree_to_string(&headless, root), @r###"
        column
          label text="a"
          <spacing 5>
          <spacing 3>
          <spacing 5>
          label text="b"
          <spacing 5>
          <stretch>
        "###);
    }

    #[test]
    fn margin_wraps_in_row_and_column() {
        let (headless, ui) = setup();
        let node = BoxNode::new([
            TextLabelNode::new().with_text("a").unwrap().into(),
            TextLabelNode::new().with_text("b").unwrap().into(),
        ])
        .with_spacing(2)
        .with_margin(8);
        let root = build(&ui, &Node::Column(node), None);
        insta::assert_snapshot!(tree_to_string(&headless, root), @r###"
        row
          <spacing 8>
          column
            <spacing 8>
            column
              label text="a"
              <spacing 2>
              label text="b"
            <spacing 8>
          <spacing 8>
        "###);
    }

    #[test]
    fn zero_margin_does_not_wrap() {
        let (headless, ui) = setup();
        let content = ui.create_widget(WidgetKind::Label);
        assert_eq!(construct_margin(&*headless, content, Some(0)), content);
        assert_eq!(construct_margin(&*headless, content, None), content);
    }

    #[test]
    fn tabs_take_reference_index() {
        let (headless, ui) = setup();
        let handler = form();
        let node = TabsNode::new([
            Tab::new("One", TextLabelNode::new().with_text("1").unwrap()),
            Tab::new("Two", TextLabelNode::new().with_text("2").unwrap()),
        ])
        .with_current_index("selected_tab")
        .unwrap();
        let root = build(&ui, &node.into(), Some(&handler));
        assert_eq!(headless.property(root, "current_index"), Some(json!(1)));
        insta::assert_snapshot!(tree_to_string(&headless, root), @r###"
        tabs current_index=1
          [One] label text="1"
          [Two] label text="2"
        "###);
    }

    #[test]
    fn group_title_binding() {
        let (headless, ui) = setup();
        let handler = form();
        let node = GroupNode::new(TextLabelNode::new().with_text("body").unwrap())
            .with_title(BindingExpr::new("name", None).unwrap())
            .unwrap();
        let root = build(&ui, &node.into(), Some(&handler));
        assert_eq!(headless.property(root, "title"), Some(json!("Ada")));
    }

    // ── Leaves ───────────────────────────────────────────────────────

    #[test]
    fn slider_defaults_range() {
        let (headless, ui) = setup();
        let slider = build(&ui, &SliderNode::new().into(), None);
        assert_eq!(headless.property(slider, "minimum"), Some(json!(0)));
        assert_eq!(headless.property(slider, "maximum"), Some(json!(100)));
        let bar = build(&ui, &ProgressBarNode::new().with_range(5, 10).into(), None);
        assert_eq!(headless.property(bar, "minimum"), Some(json!(5)));
        assert_eq!(headless.property(bar, "maximum"), Some(json!(10)));
    }

    #[test]
    fn radio_value_always_set() {
        let (headless, ui) = setup();
        let radio = build(&ui, &RadioButtonNode::new("A", 1).into(), None);
        assert_eq!(headless.property(radio, "value"), Some(json!(1)));
        let bare: Node = serde_json::from_value(json!({"type": "radio_button"})).unwrap();
        let radio = build(&ui, &bare, None);
        assert_eq!(headless.property(radio, "value"), Some(Value::Null));
    }

    #[test]
    fn line_edit_config_and_events() {
        let (headless, ui) = setup();
        let handler = form();
        let node = LineEditNode::new()
            .with_text("name")
            .unwrap()
            .editable(false)
            .with_placeholder_text("Name")
            .on_text_edited("text_changed");
        let edit = build(&ui, &node.into(), Some(&handler));
        assert_eq!(headless.property(edit, "text"), Some(json!("Ada")));
        assert_eq!(headless.property(edit, "editable"), Some(json!(false)));
        assert_eq!(headless.property(edit, "placeholder_text"), Some(json!("Name")));
        assert!(headless.fire(edit, "on_text_edited", &[json!("Bob")]));
    }

    #[test]
    fn combo_items_and_items_ref() {
        let (headless, ui) = setup();
        let mut form = Form::default();
        form.values.insert("choices".into(), json!(["x", "y"]));
        let handler = handler_ref(form);
        let literal = build(&ui, &ComboBoxNode::new().with_items(["a", "b"]).into(), None);
        assert_eq!(headless.property(literal, "items"), Some(json!(["a", "b"])));
        let bound = build(
            &ui,
            &ComboBoxNode::new().with_items_ref("choices").unwrap().into(),
            Some(&handler),
        );
        assert_eq!(headless.property(bound, "items"), Some(json!(["x", "y"])));
    }

    #[test]
    fn button_click_reaches_handler() {
        let (headless, ui) = setup();
        let form = Form::default();
        let calls = form.calls.clone();
        let handler = handler_ref(form);
        let node = PushButtonNode::new("OK").on_clicked("ok_clicked");
        let button = build(&ui, &node.into(), Some(&handler));
        assert_eq!(headless.property(button, "text"), Some(json!("OK")));
        headless.fire(button, "on_clicked", &[]);
        assert_eq!(calls.borrow()[0].0, "ok_clicked");
    }

    // ── Degenerate nodes ─────────────────────────────────────────────

    #[test]
    fn unknown_and_nested_top_level_produce_nothing() {
        let (headless, ui) = setup();
        let node = Node::column([
            Node::Unknown,
            TextLabelNode::new().into(),
            crate::spec::TopLevelNode::window(TextLabelNode::new()).into_window(),
        ]);
        let root = build(&ui, &node, None);
        assert_eq!(headless.children(root).len(), 1);
        let mut finishers = Vec::new();
        assert!(construct(&ui, None, &Node::Unknown, None, &mut finishers)
            .unwrap()
            .is_none());
    }
}
