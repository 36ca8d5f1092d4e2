//! In-memory toolkit.
//!
//! [`HeadlessUi`] implements [`UserInterface`] over a widget arena, a table of
//! document windows, and a table of menus. It also plays the user: firing
//! widget signals, editing bound properties, moving focus, and exporting
//! per-widget command tables.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use slotmap::{SecondaryMap, SlotMap};

use crate::dom::{Dom, FocusChain, LayoutItem, WidgetData};
use crate::handler::{EventArgs, HandlerRef, PropertyBinding, SignalCallback};
use crate::ui::{
    MenuId, MenuItem, MenuItemState, UserInterface, WidgetId, WidgetKind, WindowId,
};

type Command = Rc<dyn Fn() -> bool>;

/// One entry of a headless menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item { item: MenuItem, state: MenuItemState },
    Separator,
    SubMenu { title: String, menu: MenuId },
}

#[derive(Debug, Default)]
struct WindowState {
    parent: Option<WindowId>,
    title: String,
    root: Option<WidgetId>,
    shown: bool,
    close_requested: bool,
    focus: FocusChain,
    menus: Vec<MenuId>,
}

#[derive(Debug)]
struct MenuState {
    window: WindowId,
    menu_id: String,
    title: String,
    entries: Vec<MenuEntry>,
}

#[derive(Default)]
struct State {
    dom: Dom,
    windows: SlotMap<WindowId, WindowState>,
    menus: SlotMap<MenuId, MenuState>,
    bindings: SecondaryMap<WidgetId, BTreeMap<String, PropertyBinding>>,
    signals: SecondaryMap<WidgetId, HashMap<String, SignalCallback>>,
    handlers: SecondaryMap<WidgetId, HandlerRef>,
    commands: SecondaryMap<WidgetId, BTreeMap<String, Command>>,
}

/// A [`UserInterface`] that keeps everything in memory.
///
/// Borrows of the internal state never span a call into user code: signal
/// callbacks, bindings, and commands are cloned or taken out first.
#[derive(Default)]
pub struct HeadlessUi {
    state: RefCell<State>,
    has_event_loop: bool,
}

impl HeadlessUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the toolkit runs its own event loop.
    pub fn with_event_loop(mut self) -> Self {
        self.has_event_loop = true;
        self
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Run `f` against the widget arena.
    pub fn with_dom<R>(&self, f: impl FnOnce(&Dom) -> R) -> R {
        f(&self.state.borrow().dom)
    }

    pub fn widget_count(&self) -> usize {
        self.state.borrow().dom.len()
    }

    pub fn widget_kind(&self, widget: WidgetId) -> Option<WidgetKind> {
        self.state.borrow().dom.get(widget).map(|data| data.kind)
    }

    pub fn children(&self, widget: WidgetId) -> Vec<WidgetId> {
        self.state.borrow().dom.children(widget)
    }

    pub fn layout(&self, widget: WidgetId) -> Vec<LayoutItem> {
        self.state
            .borrow()
            .dom
            .get(widget)
            .map(|data| data.layout.clone())
            .unwrap_or_default()
    }

    /// Widgets of `kind` under `root`, in tree order.
    pub fn find_in(&self, root: WidgetId, kind: WidgetKind) -> Vec<WidgetId> {
        self.state
            .borrow()
            .dom
            .find_in(root, |data| data.kind == kind)
    }

    pub fn has_binding(&self, widget: WidgetId, property: &str) -> bool {
        self.state
            .borrow()
            .bindings
            .get(widget)
            .is_some_and(|bindings| bindings.contains_key(property))
    }

    pub fn window_count(&self) -> usize {
        self.state.borrow().windows.len()
    }

    pub fn window_root(&self, window: WindowId) -> Option<WidgetId> {
        self.state.borrow().windows.get(window).and_then(|w| w.root)
    }

    /// The window whose attached content contains `widget`.
    pub fn window_of(&self, widget: WidgetId) -> Option<WindowId> {
        let state = self.state.borrow();
        if !state.dom.contains(widget) {
            return None;
        }
        let top = state.dom.ancestors(widget).last().copied().unwrap_or(widget);
        state
            .windows
            .iter()
            .find(|(_, w)| w.root == Some(top))
            .map(|(id, _)| id)
    }

    pub fn window_parent(&self, window: WindowId) -> Option<WindowId> {
        self.state.borrow().windows.get(window).and_then(|w| w.parent)
    }

    pub fn is_shown(&self, window: WindowId) -> bool {
        self.state.borrow().windows.get(window).is_some_and(|w| w.shown)
    }

    /// Consume a pending close request for `window`.
    pub fn take_close_request(&self, window: WindowId) -> bool {
        let mut state = self.state.borrow_mut();
        match state.windows.get_mut(window) {
            Some(w) => std::mem::take(&mut w.close_requested),
            None => false,
        }
    }

    pub fn menu_title(&self, menu: MenuId) -> Option<String> {
        self.state.borrow().menus.get(menu).map(|m| m.title.clone())
    }

    pub fn menu_entries(&self, menu: MenuId) -> Vec<MenuEntry> {
        self.state
            .borrow()
            .menus
            .get(menu)
            .map(|m| m.entries.clone())
            .unwrap_or_default()
    }

    /// State of the first item of `window` bound to `action_id`, searching
    /// sub-menus too.
    pub fn menu_item_state(&self, window: WindowId, action_id: &str) -> Option<MenuItemState> {
        let state = self.state.borrow();
        state
            .menus
            .values()
            .filter(|menu| menu.window == window)
            .flat_map(|menu| menu.entries.iter())
            .find_map(|entry| match entry {
                MenuEntry::Item { item, state } if item.action_id == action_id => Some(state.clone()),
                _ => None,
            })
    }

    // ── User simulation ──────────────────────────────────────────────

    /// Fire a widget signal with positional arguments. Returns whether a
    /// callback was connected.
    pub fn fire(&self, widget: WidgetId, event: &str, args: &[Value]) -> bool {
        self.fire_with(widget, event, args, &EventArgs::new())
    }

    /// Fire a widget signal with positional and keyword arguments.
    pub fn fire_with(&self, widget: WidgetId, event: &str, args: &[Value], kwargs: &EventArgs) -> bool {
        // Take the callback out so it can re-enter the toolkit.
        let callback = self
            .state
            .borrow_mut()
            .signals
            .get_mut(widget)
            .and_then(|signals| signals.remove(event));
        let Some(mut callback) = callback else {
            return false;
        };
        callback(args, kwargs);

        let mut state = self.state.borrow_mut();
        if state.dom.contains(widget) {
            if let Some(entry) = state.signals.entry(widget) {
                entry.or_default().entry(event.to_owned()).or_insert(callback);
            }
        }
        true
    }

    /// Change a property as the user would: set it on the widget and push it
    /// through any binding. Returns whether a binding accepted the value.
    pub fn user_set(&self, widget: WidgetId, property: &str, value: Value) -> bool {
        let binding = {
            let mut state = self.state.borrow_mut();
            if let Some(data) = state.dom.get_mut(widget) {
                data.set_property(property, value.clone());
            }
            state
                .bindings
                .get(widget)
                .and_then(|bindings| bindings.get(property))
                .cloned()
        };
        binding.is_some_and(|binding| binding.update(value))
    }

    /// Refresh every bound property from its source.
    pub fn sync_bindings(&self) {
        let bindings: Vec<(WidgetId, String, PropertyBinding)> = {
            let state = self.state.borrow();
            state
                .bindings
                .iter()
                .flat_map(|(widget, bindings)| {
                    bindings
                        .iter()
                        .map(move |(property, binding)| (widget, property.clone(), binding.clone()))
                })
                .collect()
        };
        let values: Vec<(WidgetId, String, Value)> = bindings
            .into_iter()
            .filter_map(|(widget, property, binding)| {
                binding.value().map(|value| (widget, property, value))
            })
            .collect();
        let mut state = self.state.borrow_mut();
        for (widget, property, value) in values {
            if let Some(data) = state.dom.get_mut(widget) {
                data.set_property(property, value);
            }
        }
    }

    /// Export `command` from `widget`'s command table.
    pub fn register_widget_command(
        &self,
        widget: WidgetId,
        command: impl Into<String>,
        f: impl Fn() -> bool + 'static,
    ) {
        let mut state = self.state.borrow_mut();
        if !state.dom.contains(widget) {
            return;
        }
        if let Some(entry) = state.commands.entry(widget) {
            entry.or_default().insert(command.into(), Rc::new(f));
        }
    }

    /// Give `widget` keyboard focus in `window`.
    pub fn set_focus(&self, window: WindowId, widget: WidgetId) -> bool {
        let mut guard = self.state.borrow_mut();
        let State { dom, windows, .. } = &mut *guard;
        match windows.get_mut(window) {
            Some(w) => {
                w.focus.rebuild(dom, w.root);
                w.focus.focus_widget(widget)
            }
            None => false,
        }
    }

    /// Move focus to the next focusable widget in `window`.
    pub fn focus_next(&self, window: WindowId) -> Option<WidgetId> {
        let mut guard = self.state.borrow_mut();
        let State { dom, windows, .. } = &mut *guard;
        let w = windows.get_mut(window)?;
        w.focus.rebuild(dom, w.root);
        w.focus.focus_next()
    }
}

impl fmt::Debug for HeadlessUi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HeadlessUi")
            .field("widgets", &state.dom.len())
            .field("windows", &state.windows.len())
            .field("menus", &state.menus.len())
            .field("has_event_loop", &self.has_event_loop)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// UserInterface
// ---------------------------------------------------------------------------

impl UserInterface for HeadlessUi {
    fn create_widget(&self, kind: WidgetKind) -> WidgetId {
        self.state.borrow_mut().dom.insert(WidgetData::new(kind))
    }

    fn destroy_widget(&self, widget: WidgetId) {
        let removed = self.state.borrow_mut().dom.remove(widget);
        for id in removed {
            // Dropped outside the borrow: handlers and callbacks may re-enter.
            let detached = {
                let mut state = self.state.borrow_mut();
                (
                    state.signals.remove(id),
                    state.bindings.remove(id),
                    state.handlers.remove(id),
                    state.commands.remove(id),
                )
            };
            drop(detached);
        }
    }

    fn add_child(&self, parent: WidgetId, child: WidgetId) {
        self.state.borrow_mut().dom.append_child(parent, child);
    }

    fn add_tab(&self, tabs: WidgetId, child: WidgetId, label: &str) {
        self.state.borrow_mut().dom.add_tab(tabs, child, label);
    }

    fn add_spacing(&self, container: WidgetId, size: i32) {
        self.state.borrow_mut().dom.add_spacing(container, size);
    }

    fn add_stretch(&self, container: WidgetId) {
        self.state.borrow_mut().dom.add_stretch(container);
    }

    fn set_property(&self, widget: WidgetId, property: &str, value: Value) {
        if let Some(data) = self.state.borrow_mut().dom.get_mut(widget) {
            data.set_property(property, value);
        }
    }

    fn property(&self, widget: WidgetId, property: &str) -> Option<Value> {
        self.state
            .borrow()
            .dom
            .get(widget)
            .and_then(|data| data.property(property).cloned())
    }

    fn bind_property(&self, widget: WidgetId, property: &str, binding: PropertyBinding) {
        let initial = binding.value();
        let mut state = self.state.borrow_mut();
        let Some(data) = state.dom.get_mut(widget) else {
            return;
        };
        if let Some(value) = initial {
            data.set_property(property, value);
        }
        if let Some(entry) = state.bindings.entry(widget) {
            entry.or_default().insert(property.to_owned(), binding);
        }
    }

    fn connect(&self, widget: WidgetId, event: &str, callback: SignalCallback) {
        let mut state = self.state.borrow_mut();
        if !state.dom.contains(widget) {
            return;
        }
        if let Some(entry) = state.signals.entry(widget) {
            entry.or_default().insert(event.to_owned(), callback);
        }
    }

    fn set_widget_handler(&self, widget: WidgetId, handler: Option<HandlerRef>) {
        let previous = {
            let mut state = self.state.borrow_mut();
            match handler {
                Some(handler) if state.dom.contains(widget) => state.handlers.insert(widget, handler),
                Some(_) => None,
                None => state.handlers.remove(widget),
            }
        };
        drop(previous);
    }

    fn widget_handler(&self, widget: WidgetId) -> Option<HandlerRef> {
        self.state.borrow().handlers.get(widget).cloned()
    }

    fn handles_command(&self, widget: WidgetId, command: &str) -> bool {
        self.state
            .borrow()
            .commands
            .get(widget)
            .is_some_and(|commands| commands.contains_key(command))
    }

    fn dispatch_command(&self, widget: WidgetId, command: &str) -> bool {
        let found = self
            .state
            .borrow()
            .commands
            .get(widget)
            .and_then(|commands| commands.get(command).cloned());
        match found {
            Some(f) => f(),
            None => false,
        }
    }

    // ── Document windows ─────────────────────────────────────────────

    fn create_document_window(&self, parent: Option<WindowId>) -> WindowId {
        self.state.borrow_mut().windows.insert(WindowState {
            parent,
            ..WindowState::default()
        })
    }

    fn destroy_document_window(&self, window: WindowId) {
        let root = {
            let mut state = self.state.borrow_mut();
            let Some(removed) = state.windows.remove(window) else {
                return;
            };
            state.menus.retain(|_, menu| menu.window != window);
            removed.root
        };
        if let Some(root) = root {
            self.destroy_widget(root);
        }
    }

    fn attach(&self, window: WindowId, widget: WidgetId) {
        let mut guard = self.state.borrow_mut();
        let State { dom, windows, .. } = &mut *guard;
        if let Some(w) = windows.get_mut(window) {
            w.root = Some(widget);
            w.focus.rebuild(dom, w.root);
        }
    }

    fn detach(&self, window: WindowId) {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(window) {
            w.root = None;
            w.focus = FocusChain::new();
        }
    }

    fn show(&self, window: WindowId) {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(window) {
            w.shown = true;
        }
    }

    fn request_close(&self, window: WindowId) {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(window) {
            w.close_requested = true;
        }
    }

    fn set_title(&self, window: WindowId, title: &str) {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(window) {
            w.title = title.to_owned();
        }
    }

    fn title(&self, window: WindowId) -> String {
        self.state
            .borrow()
            .windows
            .get(window)
            .map(|w| w.title.clone())
            .unwrap_or_default()
    }

    fn focus_widget(&self, window: WindowId) -> Option<WidgetId> {
        let state = self.state.borrow();
        state
            .windows
            .get(window)?
            .focus
            .current_widget()
            .filter(|&widget| state.dom.contains(widget))
    }

    fn has_event_loop(&self) -> bool {
        self.has_event_loop
    }

    // ── Menus ────────────────────────────────────────────────────────

    fn get_menu(&self, window: WindowId, menu_id: &str) -> Option<MenuId> {
        let state = self.state.borrow();
        state
            .windows
            .get(window)?
            .menus
            .iter()
            .copied()
            .find(|&menu| state.menus.get(menu).is_some_and(|m| m.menu_id == menu_id))
    }

    fn add_menu(&self, window: WindowId, title: &str, menu_id: &str) -> MenuId {
        let mut state = self.state.borrow_mut();
        let menu = state.menus.insert(MenuState {
            window,
            menu_id: menu_id.to_owned(),
            title: title.to_owned(),
            entries: Vec::new(),
        });
        if let Some(w) = state.windows.get_mut(window) {
            w.menus.push(menu);
        }
        menu
    }

    fn menus(&self, window: WindowId) -> Vec<MenuId> {
        self.state
            .borrow()
            .windows
            .get(window)
            .map(|w| w.menus.clone())
            .unwrap_or_default()
    }

    fn menu_id(&self, menu: MenuId) -> Option<String> {
        self.state.borrow().menus.get(menu).map(|m| m.menu_id.clone())
    }

    fn create_sub_menu(&self, window: WindowId, title: &str, menu_id: &str) -> MenuId {
        self.state.borrow_mut().menus.insert(MenuState {
            window,
            menu_id: menu_id.to_owned(),
            title: title.to_owned(),
            entries: Vec::new(),
        })
    }

    fn add_sub_menu(&self, menu: MenuId, title: &str, sub_menu: MenuId) {
        if let Some(m) = self.state.borrow_mut().menus.get_mut(menu) {
            m.entries.push(MenuEntry::SubMenu {
                title: title.to_owned(),
                menu: sub_menu,
            });
        }
    }

    fn add_menu_item(&self, menu: MenuId, item: MenuItem) {
        if let Some(m) = self.state.borrow_mut().menus.get_mut(menu) {
            let state = MenuItemState {
                title: Some(item.title.clone()),
                enabled: true,
                checked: false,
            };
            m.entries.push(MenuEntry::Item { item, state });
        }
    }

    fn add_separator(&self, menu: MenuId) {
        if let Some(m) = self.state.borrow_mut().menus.get_mut(menu) {
            m.entries.push(MenuEntry::Separator);
        }
    }

    fn menu_actions(&self, menu: MenuId) -> Vec<String> {
        self.state
            .borrow()
            .menus
            .get(menu)
            .map(|m| {
                m.entries
                    .iter()
                    .filter_map(|entry| match entry {
                        MenuEntry::Item { item, .. } => Some(item.action_id.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn has_menu_action(&self, window: WindowId, action_id: &str) -> bool {
        self.menu_item_state(window, action_id).is_some()
    }

    fn apply_menu_state(&self, window: WindowId, action_id: &str, new_state: &MenuItemState) {
        let mut state = self.state.borrow_mut();
        for menu in state.menus.values_mut().filter(|menu| menu.window == window) {
            for entry in &mut menu.entries {
                if let MenuEntry::Item { item, state } = entry {
                    if item.action_id == action_id {
                        if let Some(title) = &new_state.title {
                            state.title = Some(title.clone());
                        }
                        state.enabled = new_state.enabled;
                        state.checked = new_state.checked;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{handler_ref, Handler};
    use serde_json::json;
    use std::cell::Cell;

    #[derive(Default)]
    struct Level {
        value: Value,
    }

    impl Handler for Level {
        fn property(&self, name: &str) -> Option<Value> {
            (name == "value").then(|| self.value.clone())
        }

        fn set_property(&mut self, name: &str, value: Value) -> bool {
            if name != "value" {
                return false;
            }
            self.value = value;
            true
        }
    }

    // ── Widgets ──────────────────────────────────────────────────────

    #[test]
    fn widgets_and_layout() {
        let ui = HeadlessUi::new();
        let column = ui.create_widget(WidgetKind::Column);
        let label = ui.create_widget(WidgetKind::Label);
        ui.add_child(column, label);
        ui.add_stretch(column);
        assert_eq!(ui.children(column), vec![label]);
        assert_eq!(
            ui.layout(column),
            vec![LayoutItem::Widget(label), LayoutItem::Stretch]
        );
        ui.destroy_widget(column);
        assert_eq!(ui.widget_count(), 0);
    }

    #[test]
    fn signal_can_reconnect_itself() {
        let ui = Rc::new(HeadlessUi::new());
        let button = ui.create_widget(WidgetKind::PushButton);
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let inner = ui.clone();
        ui.connect(
            button,
            "on_clicked",
            Box::new(move |_, _| {
                counter.set(counter.get() + 1);
                assert!(!inner.fire(button, "on_clicked", &[]));
            }),
        );
        assert!(ui.fire(button, "on_clicked", &[]));
        assert!(ui.fire(button, "on_clicked", &[]));
        assert_eq!(hits.get(), 2);
    }

    // ── Bindings ─────────────────────────────────────────────────────

    #[test]
    fn binding_sets_initial_value_and_round_trips() {
        let ui = HeadlessUi::new();
        let source = handler_ref(Level { value: json!(3) });
        let slider = ui.create_widget(WidgetKind::Slider);
        ui.bind_property(slider, "value", PropertyBinding::new(source.clone(), "value", None));
        assert_eq!(ui.property(slider, "value"), Some(json!(3)));
        assert!(ui.has_binding(slider, "value"));

        assert!(ui.user_set(slider, "value", json!(9)));
        assert_eq!(source.borrow().property("value"), Some(json!(9)));

        source.borrow_mut().set_property("value", json!(1));
        ui.sync_bindings();
        assert_eq!(ui.property(slider, "value"), Some(json!(1)));
    }

    // ── Commands and focus ───────────────────────────────────────────

    #[test]
    fn widget_commands() {
        let ui = HeadlessUi::new();
        let edit = ui.create_widget(WidgetKind::LineEdit);
        ui.register_widget_command(edit, "copy", || true);
        assert!(ui.handles_command(edit, "copy"));
        assert!(!ui.handles_command(edit, "paste"));
        assert!(ui.dispatch_command(edit, "copy"));
        assert!(!ui.dispatch_command(edit, "paste"));
    }

    #[test]
    fn focus_follows_window_content() {
        let ui = HeadlessUi::new();
        let window = ui.create_document_window(None);
        let column = ui.create_widget(WidgetKind::Column);
        let edit = ui.create_widget(WidgetKind::LineEdit);
        let button = ui.create_widget(WidgetKind::PushButton);
        ui.add_child(column, edit);
        ui.add_child(column, button);
        ui.attach(window, column);
        assert_eq!(ui.focus_widget(window), None);
        assert!(ui.set_focus(window, button));
        assert_eq!(ui.focus_widget(window), Some(button));
        assert_eq!(ui.focus_next(window), Some(edit));
    }

    // ── Windows and menus ────────────────────────────────────────────

    #[test]
    fn destroying_window_releases_content_and_menus() {
        let ui = HeadlessUi::new();
        let window = ui.create_document_window(None);
        let root = ui.create_widget(WidgetKind::Column);
        ui.attach(window, root);
        let menu = ui.add_menu(window, "Edit", "edit");
        assert_eq!(ui.get_menu(window, "edit"), Some(menu));
        ui.destroy_document_window(window);
        assert_eq!(ui.window_count(), 0);
        assert_eq!(ui.widget_count(), 0);
        assert_eq!(ui.menu_id(menu), None);
    }

    #[test]
    fn menu_state_applies_to_matching_items() {
        let ui = HeadlessUi::new();
        let window = ui.create_document_window(None);
        let menu = ui.add_menu(window, "Edit", "edit");
        ui.add_menu_item(
            menu,
            MenuItem {
                title: "Copy".into(),
                action_id: "window.copy".into(),
                key_sequence: None,
                role: None,
            },
        );
        ui.add_separator(menu);
        assert_eq!(ui.menu_actions(menu), vec!["window.copy"]);
        assert!(ui.menu_item_state(window, "window.copy").unwrap().enabled);
        ui.apply_menu_state(
            window,
            "window.copy",
            &MenuItemState {
                title: None,
                enabled: false,
                checked: true,
            },
        );
        let state = ui.menu_item_state(window, "window.copy").unwrap();
        assert!(!state.enabled);
        assert!(state.checked);
        assert_eq!(state.title.as_deref(), Some("Copy"));
    }
}
