//! Specification tree node types.
//!
//! A [`Node`] is an immutable description of one widget (or layout item) and
//! its children. Nodes serialize to the nested mapping form the runtime
//! consumes, discriminated by a `type` field:
//!
//! ```text
//! {"type": "column", "spacing": 8, "children": [
//!     {"type": "text_label", "text": "@binding(title)"},
//!     {"type": "push_button", "text": "OK", "on_clicked": "ok_clicked"}
//! ]}
//! ```
//!
//! Bindable fields are parsed eagerly into [`StringValue`] or
//! [`ReferenceValue`], so a malformed binding expression is rejected when the
//! tree is built rather than when it is constructed. Builder setters for
//! bindable fields parse their text the same way and return a `Result`.

use std::collections::BTreeMap;

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::binding::{BindingError, BindingExpr};

// ---------------------------------------------------------------------------
// Property values
// ---------------------------------------------------------------------------
//
// Text is read as a binding exactly when it carries the `@binding(...)`
// wrapper, whether it arrives through serde or through a builder. A literal
// that carries the wrapper has no surface form and refuses to serialize.

/// A property whose literal value is placed directly on the widget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum StringValue {
    Literal(String),
    Binding(BindingExpr),
}

impl StringValue {
    /// Parse a surface string, recognizing the binding wrapper.
    pub fn parse(input: &str) -> Result<Self, BindingError> {
        Ok(match BindingExpr::parse(input)? {
            Some(binding) => Self::Binding(binding),
            None => Self::Literal(input.to_owned()),
        })
    }
}

impl TryFrom<&str> for StringValue {
    type Error = BindingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for StringValue {
    type Error = BindingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match BindingExpr::parse(&value)? {
            Some(binding) => Ok(Self::Binding(binding)),
            None => Ok(Self::Literal(value)),
        }
    }
}

impl From<BindingExpr> for StringValue {
    fn from(value: BindingExpr) -> Self {
        Self::Binding(value)
    }
}

impl Serialize for StringValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(text) => serialize_plain(text, serializer),
            Self::Binding(binding) => serializer.collect_str(binding),
        }
    }
}

/// A property whose literal value names a handler attribute to read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum ReferenceValue {
    Attribute(String),
    Binding(BindingExpr),
}

impl ReferenceValue {
    /// Parse a surface string, recognizing the binding wrapper.
    pub fn parse(input: &str) -> Result<Self, BindingError> {
        Ok(match BindingExpr::parse(input)? {
            Some(binding) => Self::Binding(binding),
            None => Self::Attribute(input.to_owned()),
        })
    }
}

impl TryFrom<&str> for ReferenceValue {
    type Error = BindingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for ReferenceValue {
    type Error = BindingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match BindingExpr::parse(&value)? {
            Some(binding) => Ok(Self::Binding(binding)),
            None => Ok(Self::Attribute(value)),
        }
    }
}

impl From<BindingExpr> for ReferenceValue {
    fn from(value: BindingExpr) -> Self {
        Self::Binding(value)
    }
}

impl Serialize for ReferenceValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Attribute(name) => serialize_plain(name, serializer),
            Self::Binding(binding) => serializer.collect_str(binding),
        }
    }
}

fn serialize_plain<S: Serializer>(text: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if BindingExpr::is_binding(text) {
        return Err(S::Error::custom(format!(
            "plain value {text:?} would read back as a binding"
        )));
    }
    serializer.serialize_str(text)
}

/// Convert a builder argument, surfacing malformed binding text.
fn property_value<T, V>(value: V) -> Result<T, BindingError>
where
    V: TryInto<T>,
    BindingError: From<V::Error>,
{
    Ok(value.try_into()?)
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// One node of the specification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Column(BoxNode),
    Row(BoxNode),
    Spacing {
        #[serde(default)]
        size: i32,
    },
    Stretch,
    Tabs(TabsNode),
    Stack(StackNode),
    Group(GroupNode),
    TextLabel(TextLabelNode),
    LineEdit(LineEditNode),
    PushButton(PushButtonNode),
    CheckBox(CheckBoxNode),
    ComboBox(ComboBoxNode),
    RadioButton(RadioButtonNode),
    Slider(SliderNode),
    ProgressBar(ProgressBarNode),
    ModelessDialog(TopLevelNode),
    Window(TopLevelNode),
    Component(ComponentNode),
    /// Any `type` this runtime does not recognize. Constructs to nothing.
    #[serde(other)]
    Unknown,
}

impl Node {
    /// A vertical box of `children`.
    pub fn column(children: impl IntoIterator<Item = Node>) -> Self {
        Self::Column(BoxNode::new(children))
    }

    /// A horizontal box of `children`.
    pub fn row(children: impl IntoIterator<Item = Node>) -> Self {
        Self::Row(BoxNode::new(children))
    }

    /// A fixed gap inside a row or column.
    pub fn spacing(size: i32) -> Self {
        Self::Spacing { size }
    }

    /// An expanding filler inside a row or column.
    pub fn stretch() -> Self {
        Self::Stretch
    }

    /// The `type` discriminator as it appears in the serialized form.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Column(_) => "column",
            Self::Row(_) => "row",
            Self::Spacing { .. } => "spacing",
            Self::Stretch => "stretch",
            Self::Tabs(_) => "tabs",
            Self::Stack(_) => "stack",
            Self::Group(_) => "group",
            Self::TextLabel(_) => "text_label",
            Self::LineEdit(_) => "line_edit",
            Self::PushButton(_) => "push_button",
            Self::CheckBox(_) => "check_box",
            Self::ComboBox(_) => "combo_box",
            Self::RadioButton(_) => "radio_button",
            Self::Slider(_) => "slider",
            Self::ProgressBar(_) => "progress_bar",
            Self::ModelessDialog(_) => "modeless_dialog",
            Self::Window(_) => "window",
            Self::Component(_) => "component",
            Self::Unknown => "unknown",
        }
    }

    /// The handler attribute this node's widget is attached under, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Column(n) | Self::Row(n) => n.name.as_deref(),
            Self::Tabs(n) => n.name.as_deref(),
            Self::Stack(n) => n.name.as_deref(),
            Self::Group(n) => n.name.as_deref(),
            Self::TextLabel(n) => n.name.as_deref(),
            Self::LineEdit(n) => n.name.as_deref(),
            Self::PushButton(n) => n.name.as_deref(),
            Self::CheckBox(n) => n.name.as_deref(),
            Self::ComboBox(n) => n.name.as_deref(),
            Self::RadioButton(n) => n.name.as_deref(),
            Self::Slider(n) => n.name.as_deref(),
            Self::ProgressBar(n) => n.name.as_deref(),
            Self::Component(n) => n.name.as_deref(),
            Self::Spacing { .. }
            | Self::Stretch
            | Self::ModelessDialog(_)
            | Self::Window(_)
            | Self::Unknown => None,
        }
    }

    /// Whether this is one of the top-level shell kinds.
    pub fn is_top_level(&self) -> bool {
        matches!(self, Self::ModelessDialog(_) | Self::Window(_))
    }
}

macro_rules! impl_into_node {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(node: $ty) -> Self {
                    Node::$variant(node)
                }
            }
        )*
    };
}

impl_into_node! {
    TabsNode => Tabs,
    StackNode => Stack,
    GroupNode => Group,
    TextLabelNode => TextLabel,
    LineEditNode => LineEdit,
    PushButtonNode => PushButton,
    CheckBoxNode => CheckBox,
    ComboBoxNode => ComboBox,
    RadioButtonNode => RadioButton,
    SliderNode => Slider,
    ProgressBarNode => ProgressBar,
    ComponentNode => Component,
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Shared shape of `column` and `row`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxNode {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl BoxNode {
    pub fn new(children: impl IntoIterator<Item = Node>) -> Self {
        Self {
            children: children.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Gap inserted between successive children.
    pub fn with_spacing(mut self, spacing: i32) -> Self {
        self.spacing = Some(spacing);
        self
    }

    /// Gap inserted on all four sides of the box.
    pub fn with_margin(mut self, margin: i32) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// One page of a `tabs` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub label: String,
    pub content: Box<Node>,
}

impl Tab {
    pub fn new(label: impl Into<String>, content: impl Into<Node>) -> Self {
        Self {
            label: label.into(),
            content: Box::new(content.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabsNode {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<Tab>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_index: Option<ReferenceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_current_index_changed: Option<String>,
}

impl TabsNode {
    pub fn new(tabs: impl IntoIterator<Item = Tab>) -> Self {
        Self {
            tabs: tabs.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_current_index<V>(mut self, current_index: V) -> Result<Self, BindingError>
    where
        V: TryInto<ReferenceValue>,
        BindingError: From<V::Error>,
    {
        self.current_index = Some(property_value(current_index)?);
        Ok(self)
    }

    pub fn on_current_index_changed(mut self, method: impl Into<String>) -> Self {
        self.on_current_index_changed = Some(method.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackNode {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_index: Option<ReferenceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_current_index_changed: Option<String>,
}

impl StackNode {
    pub fn new(children: impl IntoIterator<Item = Node>) -> Self {
        Self {
            children: children.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_current_index<V>(mut self, current_index: V) -> Result<Self, BindingError>
    where
        V: TryInto<ReferenceValue>,
        BindingError: From<V::Error>,
    {
        self.current_index = Some(property_value(current_index)?);
        Ok(self)
    }

    pub fn on_current_index_changed(mut self, method: impl Into<String>) -> Self {
        self.on_current_index_changed = Some(method.into());
        self
    }
}

/// A titled group box around a single content node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    pub content: Box<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<StringValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<i32>,
}

impl GroupNode {
    pub fn new(content: impl Into<Node>) -> Self {
        Self {
            content: Box::new(content.into()),
            name: None,
            title: None,
            margin: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_title<V>(mut self, title: V) -> Result<Self, BindingError>
    where
        V: TryInto<StringValue>,
        BindingError: From<V::Error>,
    {
        self.title = Some(property_value(title)?);
        Ok(self)
    }

    pub fn with_margin(mut self, margin: i32) -> Self {
        self.margin = Some(margin);
        self
    }
}

// ---------------------------------------------------------------------------
// Leaf controls
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLabelNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<StringValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TextLabelNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text<V>(mut self, text: V) -> Result<Self, BindingError>
    where
        V: TryInto<StringValue>,
        BindingError: From<V::Error>,
    {
        self.text = Some(property_value(text)?);
        Ok(self)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineEditNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<ReferenceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_button_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_editing_finished: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_escape_pressed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_return_pressed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_key_pressed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_text_edited: Option<String>,
}

impl LineEditNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text<V>(mut self, text: V) -> Result<Self, BindingError>
    where
        V: TryInto<ReferenceValue>,
        BindingError: From<V::Error>,
    {
        self.text = Some(property_value(text)?);
        Ok(self)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    pub fn with_placeholder_text(mut self, text: impl Into<String>) -> Self {
        self.placeholder_text = Some(text.into());
        self
    }

    pub fn clear_button_enabled(mut self, enabled: bool) -> Self {
        self.clear_button_enabled = Some(enabled);
        self
    }

    pub fn on_editing_finished(mut self, method: impl Into<String>) -> Self {
        self.on_editing_finished = Some(method.into());
        self
    }

    pub fn on_escape_pressed(mut self, method: impl Into<String>) -> Self {
        self.on_escape_pressed = Some(method.into());
        self
    }

    pub fn on_return_pressed(mut self, method: impl Into<String>) -> Self {
        self.on_return_pressed = Some(method.into());
        self
    }

    pub fn on_key_pressed(mut self, method: impl Into<String>) -> Self {
        self.on_key_pressed = Some(method.into());
        self
    }

    pub fn on_text_edited(mut self, method: impl Into<String>) -> Self {
        self.on_text_edited = Some(method.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushButtonNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_clicked: Option<String>,
}

impl PushButtonNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn on_clicked(mut self, method: impl Into<String>) -> Self {
        self.on_clicked = Some(method.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckBoxNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<ReferenceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_state: Option<ReferenceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tristate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_checked_changed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_check_state_changed: Option<String>,
}

impl CheckBoxNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_checked<V>(mut self, checked: V) -> Result<Self, BindingError>
    where
        V: TryInto<ReferenceValue>,
        BindingError: From<V::Error>,
    {
        self.checked = Some(property_value(checked)?);
        Ok(self)
    }

    pub fn with_check_state<V>(mut self, check_state: V) -> Result<Self, BindingError>
    where
        V: TryInto<ReferenceValue>,
        BindingError: From<V::Error>,
    {
        self.check_state = Some(property_value(check_state)?);
        Ok(self)
    }

    pub fn tristate(mut self, tristate: bool) -> Self {
        self.tristate = Some(tristate);
        self
    }

    pub fn on_checked_changed(mut self, method: impl Into<String>) -> Self {
        self.on_checked_changed = Some(method.into());
        self
    }

    pub fn on_check_state_changed(mut self, method: impl Into<String>) -> Self {
        self.on_check_state_changed = Some(method.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboBoxNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_ref: Option<ReferenceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_index: Option<ReferenceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_current_index_changed: Option<String>,
}

impl ComboBoxNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<I, V>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.items = Some(items.into_iter().map(Into::into).collect());
        self
    }

    /// Bind the widget's `items` to a handler attribute.
    pub fn with_items_ref<V>(mut self, items: V) -> Result<Self, BindingError>
    where
        V: TryInto<ReferenceValue>,
        BindingError: From<V::Error>,
    {
        self.items_ref = Some(property_value(items)?);
        Ok(self)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_current_index<V>(mut self, current_index: V) -> Result<Self, BindingError>
    where
        V: TryInto<ReferenceValue>,
        BindingError: From<V::Error>,
    {
        self.current_index = Some(property_value(current_index)?);
        Ok(self)
    }

    pub fn on_current_index_changed(mut self, method: impl Into<String>) -> Self {
        self.on_current_index_changed = Some(method.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadioButtonNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_value: Option<ReferenceValue>,
}

impl RadioButtonNode {
    pub fn new(text: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            text: Some(text.into()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_group_value<V>(mut self, group_value: V) -> Result<Self, BindingError>
    where
        V: TryInto<ReferenceValue>,
        BindingError: From<V::Error>,
    {
        self.group_value = Some(property_value(group_value)?);
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SliderNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ReferenceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_value_changed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_slider_pressed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_slider_released: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_slider_moved: Option<String>,
}

impl SliderNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_value<V>(mut self, value: V) -> Result<Self, BindingError>
    where
        V: TryInto<ReferenceValue>,
        BindingError: From<V::Error>,
    {
        self.value = Some(property_value(value)?);
        Ok(self)
    }

    pub fn with_range(mut self, minimum: i64, maximum: i64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    pub fn on_value_changed(mut self, method: impl Into<String>) -> Self {
        self.on_value_changed = Some(method.into());
        self
    }

    pub fn on_slider_pressed(mut self, method: impl Into<String>) -> Self {
        self.on_slider_pressed = Some(method.into());
        self
    }

    pub fn on_slider_released(mut self, method: impl Into<String>) -> Self {
        self.on_slider_released = Some(method.into());
        self
    }

    pub fn on_slider_moved(mut self, method: impl Into<String>) -> Self {
        self.on_slider_moved = Some(method.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressBarNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ReferenceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
}

impl ProgressBarNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_value<V>(mut self, value: V) -> Result<Self, BindingError>
    where
        V: TryInto<ReferenceValue>,
        BindingError: From<V::Error>,
    {
        self.value = Some(property_value(value)?);
        Ok(self)
    }

    pub fn with_range(mut self, minimum: i64, maximum: i64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }
}

// ---------------------------------------------------------------------------
// Top-level shells
// ---------------------------------------------------------------------------

/// Shared shape of `window` and `modeless_dialog`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLevelNode {
    pub content: Box<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<i32>,
    #[serde(default, skip_serializing_if = "Resources::is_empty")]
    pub resources: Resources,
}

impl TopLevelNode {
    pub fn new(content: impl Into<Node>) -> Self {
        Self {
            content: Box::new(content.into()),
            title: None,
            margin: None,
            resources: Resources::new(),
        }
    }

    /// Wrap as a `window` node.
    pub fn window(content: impl Into<Node>) -> Self {
        Self::new(content)
    }

    /// Wrap as a `modeless_dialog` node.
    pub fn modeless_dialog(content: impl Into<Node>) -> Self {
        Self::new(content)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_margin(mut self, margin: i32) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Register a resource (typically a component definition).
    pub fn with_resource(mut self, identifier: impl Into<String>, resource: impl Into<Resource>) -> Self {
        self.resources.insert(identifier.into(), resource.into());
        self
    }

    /// Finish as a `window` node.
    pub fn into_window(self) -> Node {
        Node::Window(self)
    }

    /// Finish as a `modeless_dialog` node.
    pub fn into_modeless_dialog(self) -> Node {
        Node::ModelessDialog(self)
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Resources registered on a handler, keyed by identifier.
pub type Resources = BTreeMap<String, Resource>;

/// A resource entry. Only component definitions are understood; anything
/// else is kept so it can be reported when referenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    Component(ComponentDefinition),
    #[serde(other)]
    Other,
}

impl From<ComponentDefinition> for Resource {
    fn from(definition: ComponentDefinition) -> Self {
        Resource::Component(definition)
    }
}

/// An event a component's private handler can raise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDeclaration {
    pub event: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl EventDeclaration {
    pub fn new<I, S>(event: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            event: event.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }
}

/// A reusable subtree with its own handler, registered under an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub content: Box<Node>,
    #[serde(default)]
    pub create_handler_method_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventDeclaration>,
}

impl ComponentDefinition {
    pub fn new(content: impl Into<Node>, create_handler_method_name: impl Into<String>) -> Self {
        Self {
            content: Box::new(content.into()),
            create_handler_method_name: create_handler_method_name.into(),
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, event: EventDeclaration) -> Self {
        self.events.push(event);
        self
    }
}

/// An instance of a registered component.
///
/// Keys other than `identifier`, `properties`, and `name` name outer-handler
/// methods for the component's declared events, e.g.
/// `"on_value_changed": "value_changed"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub events: BTreeMap<String, Value>,
}

impl ComponentNode {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            properties: Map::new(),
            name: None,
            events: BTreeMap::new(),
        }
    }

    /// Set a property on the component handler before its content is built.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Route a declared component event to an outer-handler method.
    pub fn on(mut self, event: impl Into<String>, method: impl Into<String>) -> Self {
        self.events.insert(event.into(), Value::String(method.into()));
        self
    }

    /// The outer-handler method wired to `event`, if any.
    pub fn event_method(&self, event: &str) -> Option<&str> {
        self.events.get(event).and_then(Value::as_str)
    }
}
