//! Pilot: programmatic interaction with a headless window.
//!
//! The `Pilot` opens a declarative window on a [`HeadlessUi`] and provides
//! methods to simulate user input (key presses, clicks, menu picks, edits),
//! run ticks, and inspect the resulting widget tree.

use std::rc::Rc;

use serde_json::Value;

use crate::app::{AppConfig, Application};
use crate::declarative::{open_window, ConstructError};
use crate::event::input::{Key, KeyEvent, Modifiers};
use crate::handler::HandlerRef;
use crate::spec::{Node, TopLevelNode};
use crate::ui::{MenuItemState, WidgetId, WidgetKind, WindowId};
use crate::window::Window;

use super::headless::HeadlessUi;
use super::snapshot::tree_to_string;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless window driver for testing.
///
/// The Pilot builds an [`Application`] over a fresh [`HeadlessUi`], opens the
/// node as a window, then plays the toolkit's part: ticking, delivering keys,
/// opening menus, and answering close requests.
///
/// # Examples
///
/// ```
/// use declui::spec::{PushButtonNode, TopLevelNode};
/// use declui::testing::Pilot;
///
/// let node = TopLevelNode::window(PushButtonNode::new("OK")).into_window();
/// let pilot = Pilot::launch(&node, None).unwrap();
/// assert!(pilot.is_open());
/// pilot.close();
/// assert!(!pilot.is_open());
/// ```
pub struct Pilot {
    ui: Rc<HeadlessUi>,
    app: Rc<Application>,
    window: Window,
}

impl Pilot {
    /// Open `node` with the default configuration.
    ///
    /// Widget nodes are wrapped in a plain window; dialog nodes open as
    /// windows.
    pub fn launch(node: &Node, handler: Option<&HandlerRef>) -> Result<Self, ConstructError> {
        Self::with_config(AppConfig::default(), node, handler)
    }

    /// Open `node` under the given application configuration.
    pub fn with_config(
        config: AppConfig,
        node: &Node,
        handler: Option<&HandlerRef>,
    ) -> Result<Self, ConstructError> {
        let ui = Rc::new(HeadlessUi::new());
        let app = Rc::new(Application::new(ui.clone(), config));
        let top = match node {
            Node::Window(top) | Node::ModelessDialog(top) => top.clone(),
            other => TopLevelNode::window(other.clone()),
        };
        let window = open_window(&app, &top, handler)?;
        Ok(Self { ui, app, window })
    }

    pub fn ui(&self) -> &Rc<HeadlessUi> {
        &self.ui
    }

    pub fn app(&self) -> &Rc<Application> {
        &self.app
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn window_id(&self) -> Option<WindowId> {
        self.window.document_window()
    }

    pub fn is_open(&self) -> bool {
        !self.window.is_closed()
    }

    // ── Ticks ────────────────────────────────────────────────────────

    /// One toolkit tick: window periodic work, binding refresh, then any
    /// pending close request.
    pub fn tick(&self) {
        self.window.periodic();
        self.ui.sync_bindings();
        if let Some(id) = self.window_id() {
            if self.ui.take_close_request(id) {
                self.window.about_to_close();
            }
        }
    }

    /// Run `n` ticks.
    pub fn ticks(&self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Deliver a key press and its release. Returns whether the press
    /// performed an action.
    pub fn press(&self, event: KeyEvent) -> bool {
        let handled = self.window.key_pressed(&event);
        self.window.key_released(&event);
        handled
    }

    /// Press `c` with Ctrl held.
    pub fn press_ctrl(&self, c: char) -> bool {
        self.press(KeyEvent::ctrl(c))
    }

    /// Press a key with no modifiers.
    pub fn press_key(&self, key: Key) -> bool {
        self.press(KeyEvent::new(key, Modifiers::NONE))
    }

    /// Fire `on_clicked` on `widget`.
    pub fn click(&self, widget: WidgetId) -> bool {
        self.ui.fire(widget, "on_clicked", &[])
    }

    /// Fire any widget signal.
    pub fn fire(&self, widget: WidgetId, event: &str, args: &[Value]) -> bool {
        self.ui.fire(widget, event, args)
    }

    /// Change a bound property as the user would.
    pub fn edit(&self, widget: WidgetId, property: &str, value: impl Into<Value>) -> bool {
        self.ui.user_set(widget, property, value.into())
    }

    pub fn focus(&self, widget: WidgetId) -> bool {
        self.window_id()
            .is_some_and(|id| self.ui.set_focus(id, widget))
    }

    // ── Menus ────────────────────────────────────────────────────────

    /// Open the menu with `menu_id`, recomputing its item states.
    pub fn show_menu(&self, menu_id: &str) -> bool {
        match self.window.menu(menu_id) {
            Some(menu) => {
                self.window.menu_about_to_show(menu);
                true
            }
            None => false,
        }
    }

    pub fn menu_item_state(&self, action_id: &str) -> Option<MenuItemState> {
        self.ui.menu_item_state(self.window_id()?, action_id)
    }

    /// Choose the menu item for `action_id`. Disabled or missing items do
    /// nothing.
    pub fn choose(&self, action_id: &str) -> bool {
        match self.menu_item_state(action_id) {
            Some(state) if state.enabled => self.window.perform_action(action_id),
            _ => false,
        }
    }

    // ── Inspection ───────────────────────────────────────────────────

    pub fn root(&self) -> Option<WidgetId> {
        self.ui.window_root(self.window_id()?)
    }

    /// Widgets of `kind` in the window, in tree order.
    pub fn find(&self, kind: WidgetKind) -> Vec<WidgetId> {
        self.root()
            .map(|root| self.ui.find_in(root, kind))
            .unwrap_or_default()
    }

    pub fn property(&self, widget: WidgetId, property: &str) -> Option<Value> {
        crate::ui::UserInterface::property(&*self.ui, widget, property)
    }

    /// The window content as snapshot text.
    pub fn tree(&self) -> String {
        self.root()
            .map(|root| tree_to_string(&self.ui, root))
            .unwrap_or_default()
    }

    /// Close the window as the toolkit would.
    pub fn close(&self) {
        self.window.about_to_close();
    }
}

impl std::fmt::Debug for Pilot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pilot")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{handler_ref, EventArgs, Handler};
    use crate::spec::{PushButtonNode, SliderNode};
    use serde_json::json;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counter {
        clicks: Rc<Cell<u32>>,
        level: i64,
    }

    impl Handler for Counter {
        fn property(&self, name: &str) -> Option<Value> {
            (name == "level").then(|| json!(self.level))
        }

        fn set_property(&mut self, name: &str, value: Value) -> bool {
            match (name, value.as_i64()) {
                ("level", Some(level)) => {
                    self.level = level;
                    true
                }
                _ => false,
            }
        }

        fn has_method(&self, name: &str) -> bool {
            name == "bump"
        }

        fn call_method(&mut self, _name: &str, _sender: WidgetId, _args: &EventArgs) {
            self.clicks.set(self.clicks.get() + 1);
            self.level += 1;
        }
    }

    fn counter() -> (HandlerRef, Rc<Cell<u32>>) {
        let counter = Counter::default();
        let clicks = counter.clicks.clone();
        (handler_ref(counter), clicks)
    }

    #[test]
    fn widget_node_is_wrapped_in_window() {
        let pilot = Pilot::launch(&PushButtonNode::new("OK").into(), None).unwrap();
        assert_eq!(pilot.find(WidgetKind::PushButton).len(), 1);
        assert!(pilot.ui().is_shown(pilot.window_id().unwrap()));
    }

    #[test]
    fn click_reaches_handler_and_tick_refreshes_bindings() {
        let (handler, clicks) = counter();
        let node = Node::column([
            PushButtonNode::new("+").on_clicked("bump").into(),
            SliderNode::new()
                .with_value("@binding(level)")
                .unwrap()
                .into(),
        ]);
        let pilot = Pilot::launch(&node, Some(&handler)).unwrap();
        let button = pilot.find(WidgetKind::PushButton)[0];
        let slider = pilot.find(WidgetKind::Slider)[0];

        assert!(pilot.click(button));
        assert_eq!(clicks.get(), 1);
        assert_eq!(pilot.property(slider, "value"), Some(json!(0)));
        pilot.tick();
        assert_eq!(pilot.property(slider, "value"), Some(json!(1)));

        assert!(pilot.edit(slider, "value", 40));
        assert_eq!(handler.borrow().property("level"), Some(json!(40)));
    }

    #[test]
    fn close_request_is_answered_on_tick() {
        let pilot = Pilot::launch(&PushButtonNode::new("OK").into(), None).unwrap();
        pilot.window().request_close();
        assert!(pilot.is_open());
        pilot.tick();
        assert!(!pilot.is_open());
        assert_eq!(pilot.ui().window_count(), 0);
    }
}
