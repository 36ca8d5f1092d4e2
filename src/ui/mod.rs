//! Toolkit adapter seam.
//!
//! [`UserInterface`] is everything the declarative runtime and the window
//! shell need from a concrete widget toolkit. Widgets, document windows, and
//! menus are referred to by opaque slotmap keys; the toolkit owns the objects.
//! All methods take `&self` because toolkit callbacks re-enter the adapter
//! while it is in use. Implementations keep their state behind interior
//! mutability and must not hold a borrow across a user callback.
//!
//! The toolkit drives the shell in return: it calls
//! [`Window::periodic`](crate::window::Window::periodic) on every tick,
//! [`Window::menu_about_to_show`](crate::window::Window::menu_about_to_show)
//! before a menu opens, [`Window::perform_action`](crate::window::Window::perform_action)
//! when a menu item is chosen, the key handlers, and
//! [`Window::about_to_close`](crate::window::Window::about_to_close) when the
//! window goes away.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use slotmap::new_key_type;

use crate::handler::{HandlerRef, PropertyBinding, SignalCallback};

new_key_type! {
    /// A live widget owned by the toolkit.
    pub struct WidgetId;
    /// A document window owned by the toolkit.
    pub struct WindowId;
    /// A menu or sub-menu owned by the toolkit.
    pub struct MenuId;
}

/// Shared handle to the toolkit adapter.
pub type UiRef = Rc<dyn UserInterface>;

/// The widget kinds the constructor asks the toolkit for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Column,
    Row,
    Tabs,
    Stack,
    Group,
    Label,
    LineEdit,
    PushButton,
    CheckBox,
    ComboBox,
    RadioButton,
    Slider,
    ProgressBar,
}

impl WidgetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Row => "row",
            Self::Tabs => "tabs",
            Self::Stack => "stack",
            Self::Group => "group",
            Self::Label => "label",
            Self::LineEdit => "line_edit",
            Self::PushButton => "push_button",
            Self::CheckBox => "check_box",
            Self::ComboBox => "combo_box",
            Self::RadioButton => "radio_button",
            Self::Slider => "slider",
            Self::ProgressBar => "progress_bar",
        }
    }

    /// Whether the kind lays out children in sequence with spacing/stretch.
    pub fn is_box(self) -> bool {
        matches!(self, Self::Column | Self::Row)
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A menu item bound to an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub title: String,
    pub action_id: String,
    pub key_sequence: Option<String>,
    pub role: Option<String>,
}

/// Display state recomputed for a menu item before its menu opens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuItemState {
    pub title: Option<String>,
    pub enabled: bool,
    pub checked: bool,
}

/// The widget toolkit, as seen by the runtime.
pub trait UserInterface {
    // ── Widgets ──────────────────────────────────────────────────────

    fn create_widget(&self, kind: WidgetKind) -> WidgetId;

    fn destroy_widget(&self, widget: WidgetId);

    /// Append `child` to a box, stack, or group.
    fn add_child(&self, parent: WidgetId, child: WidgetId);

    /// Append `child` to a tab widget as a page titled `label`.
    fn add_tab(&self, tabs: WidgetId, child: WidgetId, label: &str);

    fn add_spacing(&self, container: WidgetId, size: i32);

    fn add_stretch(&self, container: WidgetId);

    fn set_property(&self, widget: WidgetId, property: &str, value: Value);

    fn property(&self, widget: WidgetId, property: &str) -> Option<Value>;

    /// Attach a live binding to a widget property.
    fn bind_property(&self, widget: WidgetId, property: &str, binding: PropertyBinding);

    /// Install the callback for a widget signal such as `on_clicked`,
    /// replacing any previous one.
    fn connect(&self, widget: WidgetId, event: &str, callback: SignalCallback);

    /// Associate a private handler with a widget (component instances).
    fn set_widget_handler(&self, widget: WidgetId, handler: Option<HandlerRef>);

    fn widget_handler(&self, widget: WidgetId) -> Option<HandlerRef>;

    /// Whether the widget exports `command` in its command table.
    fn handles_command(&self, widget: WidgetId, command: &str) -> bool;

    /// Run `command` on the widget. Returns `true` if it was handled.
    fn dispatch_command(&self, widget: WidgetId, command: &str) -> bool;

    // ── Document windows ─────────────────────────────────────────────

    fn create_document_window(&self, parent: Option<WindowId>) -> WindowId;

    fn destroy_document_window(&self, window: WindowId);

    fn attach(&self, window: WindowId, widget: WidgetId);

    fn detach(&self, window: WindowId);

    fn show(&self, window: WindowId);

    /// Ask the toolkit to close the window; it answers with `about_to_close`.
    fn request_close(&self, window: WindowId);

    fn set_title(&self, window: WindowId, title: &str);

    fn title(&self, window: WindowId) -> String;

    fn focus_widget(&self, window: WindowId) -> Option<WidgetId>;

    /// Whether the toolkit runs its own event loop (false under test).
    fn has_event_loop(&self) -> bool;

    // ── Menus ────────────────────────────────────────────────────────

    fn get_menu(&self, window: WindowId, menu_id: &str) -> Option<MenuId>;

    fn add_menu(&self, window: WindowId, title: &str, menu_id: &str) -> MenuId;

    /// Top-level menus of the window, in menu-bar order.
    fn menus(&self, window: WindowId) -> Vec<MenuId>;

    fn menu_id(&self, menu: MenuId) -> Option<String>;

    fn create_sub_menu(&self, window: WindowId, title: &str, menu_id: &str) -> MenuId;

    fn add_sub_menu(&self, menu: MenuId, title: &str, sub_menu: MenuId);

    fn add_menu_item(&self, menu: MenuId, item: MenuItem);

    fn add_separator(&self, menu: MenuId);

    /// Action ids of the items directly in `menu`.
    fn menu_actions(&self, menu: MenuId) -> Vec<String>;

    /// Whether any menu of the window carries an item for `action_id`.
    fn has_menu_action(&self, window: WindowId, action_id: &str) -> bool;

    /// Apply state to every item of the window bound to `action_id`.
    fn apply_menu_state(&self, window: WindowId, action_id: &str, state: &MenuItemState);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_kind_names() {
        assert_eq!(WidgetKind::PushButton.to_string(), "push_button");
        assert_eq!(WidgetKind::Label.as_str(), "label");
    }

    #[test]
    fn box_kinds() {
        assert!(WidgetKind::Column.is_box());
        assert!(WidgetKind::Row.is_box());
        assert!(!WidgetKind::Stack.is_box());
    }

    #[test]
    fn menu_item_state_defaults_disabled() {
        let state = MenuItemState::default();
        assert!(!state.enabled);
        assert!(!state.checked);
        assert_eq!(state.title, None);
    }

    #[test]
    fn ids_are_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<WidgetId>();
        assert_copy::<WindowId>();
        assert_copy::<MenuId>();
    }
}
