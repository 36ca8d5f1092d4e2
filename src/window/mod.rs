//! Window shell: menus, action dispatch, periodic servicing, close path.
//!
//! A [`Window`] owns one toolkit document window. The toolkit calls back into
//! it for ticks, key events, menu refresh, menu activation, and closing (see
//! [`crate::ui`]). Menu state is recomputed from the action registry each
//! time a menu is about to show, using an [`ActionContext`] built from the
//! application, this window, and the focused widget.
//!
//! The close path runs exactly once, from [`about_to_close`](Window::about_to_close),
//! an explicit [`close`](Window::close), or drop, and releases everything the
//! window holds.

pub mod event_loop;
pub mod tasks;

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::io;
use std::rc::Rc;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::action::{standard_menus, ActionContext, ActionRegistry, MenuDescription};
use crate::app::Application;
use crate::event::KeyEvent;
use crate::ui::{MenuId, MenuItem, MenuItemState, UiRef, UserInterface, WidgetId, WindowId};

pub use event_loop::EventLoop;
pub use tasks::{Task, TaskQueue, TaskSet};

/// Actions refreshed by the dedicated File menu pass.
pub const FILE_MENU_ACTIONS: &[&str] = &[
    "window.close",
    "window.page_setup",
    "window.print",
    "application.exit",
];

/// Actions refreshed by the dedicated Edit menu pass.
pub const EDIT_MENU_ACTIONS: &[&str] = &[
    "window.undo",
    "window.redo",
    "window.cut",
    "window.copy",
    "window.paste",
    "window.delete",
    "window.select_all",
];

/// Actions refreshed by the dedicated Window menu pass.
pub const WINDOW_MENU_ACTIONS: &[&str] = &[
    "window.minimize",
    "window.zoom",
    "window.bring_to_front",
];

const DEFAULT_SHORTCUT_CONTEXT: &str = "window";

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("failed to create window event loop: {0}")]
    EventLoop(#[from] io::Error),
}

type Command = Rc<dyn Fn() -> bool>;

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

pub struct Window {
    ui: UiRef,
    app: RefCell<Option<Rc<Application>>>,
    registry: Arc<ActionRegistry>,
    shortcut_context: String,
    document_window: Cell<Option<WindowId>>,
    menus: RefCell<BTreeMap<String, MenuId>>,
    commands: RefCell<HashMap<String, Command>>,
    queue: RefCell<TaskQueue>,
    tasks: RefCell<TaskSet>,
    event_loop: RefCell<Option<Rc<EventLoop>>>,
    on_close: RefCell<Option<Box<dyn FnOnce()>>>,
    close_listeners: RefCell<Vec<Box<dyn FnOnce(&Window)>>>,
}

impl Window {
    /// Create a document window, optionally as a child of `parent`.
    ///
    /// Without an application the window uses the process-wide registry and
    /// the default shortcut context.
    pub fn new(
        ui: UiRef,
        app: Option<Rc<Application>>,
        parent: Option<&Window>,
    ) -> Result<Self, WindowError> {
        let event_loop = EventLoop::new()?;
        let registry = app
            .as_ref()
            .map_or_else(ActionRegistry::global, |app| Arc::clone(app.registry()));
        let shortcut_context = app.as_ref().map_or_else(
            || DEFAULT_SHORTCUT_CONTEXT.to_owned(),
            |app| app.config().shortcut_context.clone(),
        );
        let document_window =
            ui.create_document_window(parent.and_then(Window::document_window));
        debug!(?document_window, "created window");
        Ok(Self {
            ui,
            app: RefCell::new(app),
            registry,
            shortcut_context,
            document_window: Cell::new(Some(document_window)),
            menus: RefCell::new(BTreeMap::new()),
            commands: RefCell::new(HashMap::new()),
            queue: RefCell::new(TaskQueue::new()),
            tasks: RefCell::new(TaskSet::new()),
            event_loop: RefCell::new(Some(Rc::new(event_loop))),
            on_close: RefCell::new(None),
            close_listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn ui(&self) -> &dyn UserInterface {
        &*self.ui
    }

    pub fn ui_ref(&self) -> &UiRef {
        &self.ui
    }

    pub fn app(&self) -> Option<Rc<Application>> {
        self.app.borrow().clone()
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// The toolkit window, or `None` once closed.
    pub fn document_window(&self) -> Option<WindowId> {
        self.document_window.get()
    }

    pub fn is_closed(&self) -> bool {
        self.document_window.get().is_none()
    }

    // ── Content ──────────────────────────────────────────────────────

    pub fn attach_widget(&self, widget: WidgetId) {
        if let Some(window) = self.document_window() {
            self.ui.attach(window, widget);
        }
    }

    pub fn detach_widget(&self) {
        if let Some(window) = self.document_window() {
            self.ui.detach(window);
        }
    }

    pub fn show(&self) {
        if let Some(window) = self.document_window() {
            self.ui.show(window);
        }
    }

    pub fn title(&self) -> String {
        self.document_window()
            .map(|window| self.ui.title(window))
            .unwrap_or_default()
    }

    pub fn set_title(&self, title: &str) {
        if let Some(window) = self.document_window() {
            self.ui.set_title(window, title);
        }
    }

    pub fn focus_widget(&self) -> Option<WidgetId> {
        self.document_window()
            .and_then(|window| self.ui.focus_widget(window))
    }

    /// Ask the toolkit to close the window.
    pub fn request_close(&self) {
        if let Some(window) = self.document_window() {
            self.ui.request_close(window);
        }
    }

    // ── Menus ────────────────────────────────────────────────────────

    /// Build the File, Edit, Window, and Help menus.
    pub fn create_standard_menus(&self) {
        self.build_menu(None, &standard_menus());
    }

    /// A top-level menu built by this window, by menu id.
    pub fn menu(&self, menu_id: &str) -> Option<MenuId> {
        self.menus.borrow().get(menu_id).copied()
    }

    /// Build menus from descriptions. `menu` is `None` for the menu bar.
    ///
    /// Items naming unregistered actions are skipped.
    pub fn build_menu(&self, menu: Option<MenuId>, descriptions: &[MenuDescription]) {
        let Some(window) = self.document_window() else {
            return;
        };
        for description in descriptions {
            match description {
                MenuDescription::Menu {
                    menu_id,
                    title,
                    items,
                } => {
                    if menu.is_some() {
                        warn!(%menu_id, "top-level menu nested inside a menu; skipped");
                        continue;
                    }
                    let new_menu = self
                        .ui
                        .get_menu(window, menu_id)
                        .unwrap_or_else(|| self.ui.add_menu(window, title, menu_id));
                    self.menus.borrow_mut().insert(menu_id.clone(), new_menu);
                    self.build_menu(Some(new_menu), items);
                }
                MenuDescription::Item { action_id } => {
                    let Some(menu) = menu else {
                        warn!(%action_id, "menu item outside a menu; skipped");
                        continue;
                    };
                    match self.registry.get(action_id) {
                        Some(action) => self.ui.add_menu_item(
                            menu,
                            MenuItem {
                                title: action.action_name().to_owned(),
                                action_id: action_id.clone(),
                                key_sequence: self
                                    .registry
                                    .shortcut(action_id, &self.shortcut_context),
                                role: action.role().map(str::to_owned),
                            },
                        ),
                        None => debug!(%action_id, "unregistered action"),
                    }
                }
                MenuDescription::Separator => match menu {
                    Some(menu) => self.ui.add_separator(menu),
                    None => warn!("separator outside a menu; skipped"),
                },
                MenuDescription::SubMenu {
                    menu_id,
                    title,
                    items,
                } => {
                    let Some(menu) = menu else {
                        warn!(%menu_id, "sub-menu outside a menu; skipped");
                        continue;
                    };
                    let sub_menu = self.ui.create_sub_menu(window, title, menu_id);
                    self.ui.add_sub_menu(menu, title, sub_menu);
                    self.build_menu(Some(sub_menu), items);
                }
            }
        }
    }

    /// Refresh every top-level menu. Sub-menus are not visited.
    pub fn adjust_menus(&self) {
        let Some(window) = self.document_window() else {
            return;
        };
        for menu in self.ui.menus(window) {
            self.menu_about_to_show(menu);
        }
    }

    /// Recompute the state of the items in `menu` before it opens.
    pub fn menu_about_to_show(&self, menu: MenuId) {
        let context = self.action_context();
        match self.ui.menu_id(menu).as_deref() {
            Some("file") => self.apply_menu_states(FILE_MENU_ACTIONS, &context),
            Some("edit") => self.apply_menu_states(EDIT_MENU_ACTIONS, &context),
            Some("window") => self.apply_menu_states(WINDOW_MENU_ACTIONS, &context),
            _ => {
                let action_ids = self.ui.menu_actions(menu);
                self.apply_menu_states(&action_ids, &context);
            }
        }
    }

    fn apply_menu_states<S: AsRef<str>>(&self, action_ids: &[S], context: &ActionContext<'_>) {
        for action_id in action_ids {
            self.apply_menu_state(action_id.as_ref(), context);
        }
    }

    fn apply_menu_state(&self, action_id: &str, context: &ActionContext<'_>) {
        let Some(window) = self.document_window() else {
            return;
        };
        if !self.ui.has_menu_action(window, action_id) {
            return;
        }
        let Some(action) = self.registry.get(action_id) else {
            return;
        };
        let state = MenuItemState {
            title: Some(action.get_action_name(context)),
            enabled: action.is_enabled(context),
            checked: action.is_checked(context),
        };
        trace!(%action_id, enabled = state.enabled, checked = state.checked, "menu state");
        self.ui.apply_menu_state(window, action_id, &state);
    }

    // ── Actions ──────────────────────────────────────────────────────

    pub fn action_context(&self) -> ActionContext<'_> {
        ActionContext {
            application: self.app(),
            window: self,
            focus_widget: self.focus_widget(),
        }
    }

    /// Invoke an action by id. Unknown ids are ignored; returns whether the
    /// action was found.
    pub fn perform_action(&self, action_id: &str) -> bool {
        match self.registry.get(action_id) {
            Some(action) => {
                debug!(%action_id, "perform action");
                action.invoke(&self.action_context());
                true
            }
            None => false,
        }
    }

    /// Offer `command` to the focused widget, then to this window.
    pub fn dispatch_any_to_focus_widget(&self, command: &str) -> bool {
        if let Some(widget) = self.focus_widget() {
            if self.ui.dispatch_command(widget, command) {
                return true;
            }
        }
        self.dispatch_command(command)
    }

    /// Give the window a named command, replacing any previous one.
    pub fn register_command(&self, command: impl Into<String>, f: impl Fn() -> bool + 'static) {
        self.commands.borrow_mut().insert(command.into(), Rc::new(f));
    }

    pub fn unregister_command(&self, command: &str) -> bool {
        self.commands.borrow_mut().remove(command).is_some()
    }

    pub fn has_command(&self, command: &str) -> bool {
        self.commands.borrow().contains_key(command)
    }

    /// Run one of this window's commands. Returns `false` if it is missing or
    /// declined.
    pub fn dispatch_command(&self, command: &str) -> bool {
        let found = self.commands.borrow().get(command).cloned();
        match found {
            Some(f) => f(),
            None => false,
        }
    }

    // ── Keys ─────────────────────────────────────────────────────────

    /// Resolve a pressed key through the shortcut table and perform the
    /// bound action if it is enabled.
    pub fn key_pressed(&self, event: &KeyEvent) -> bool {
        let Some(action_id) = self
            .registry
            .action_id_for_event(&self.shortcut_context, event)
        else {
            return false;
        };
        let Some(action) = self.registry.get(&action_id) else {
            return false;
        };
        let context = self.action_context();
        if !action.is_enabled(&context) {
            debug!(%action_id, "shortcut for disabled action");
            return false;
        }
        action.invoke(&context);
        true
    }

    /// A released Ctrl chord may have been a shortcut; refresh menu state.
    pub fn key_released(&self, event: &KeyEvent) -> bool {
        if event.is_control_chord() {
            self.adjust_menus();
        }
        false
    }

    // ── Periodic ─────────────────────────────────────────────────────

    /// One tick: queued tasks, keyed tasks, one event loop pass, then the
    /// application hook.
    pub fn periodic(&self) {
        let queued = self.queue.borrow_mut().drain();
        for task in queued {
            task();
        }
        let keyed = self.tasks.borrow_mut().drain();
        for task in keyed {
            task();
        }
        let event_loop = self.event_loop.borrow().clone();
        if let Some(event_loop) = event_loop {
            event_loop.run_once();
        }
        if let Some(app) = self.app() {
            app.periodic();
        }
    }

    /// Run a tick now when the toolkit has no event loop to drive one.
    pub fn finish_periodic(&self) {
        if !self.ui.has_event_loop() {
            self.periodic();
        }
    }

    /// Run `task` on a coming tick, after every task queued before it.
    pub fn queue_task(&self, task: impl FnOnce() + 'static) {
        self.queue.borrow_mut().push(Box::new(task));
    }

    pub fn clear_queued_tasks(&self) {
        self.queue.borrow_mut().clear();
    }

    /// Run `task` on the next tick unless replaced or cleared first.
    pub fn add_task(&self, key: impl Into<String>, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().insert(key, Box::new(task));
    }

    pub fn clear_task(&self, key: &str) {
        self.tasks.borrow_mut().remove(key);
    }

    /// Schedule a future on this window's event loop. Returns `None` once the
    /// window is closed.
    pub fn spawn_local<F>(&self, future: F) -> Option<JoinHandle<F::Output>>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let event_loop = self.event_loop.borrow().clone()?;
        Some(event_loop.spawn_local(future))
    }

    // ── Closing ──────────────────────────────────────────────────────

    /// Set the hook run when the toolkit closes the window.
    pub fn set_on_close(&self, f: impl FnOnce() + 'static) {
        *self.on_close.borrow_mut() = Some(Box::new(f));
    }

    /// Add a listener fired at the start of the close path.
    pub fn on_window_close(&self, f: impl FnOnce(&Window) + 'static) {
        self.close_listeners.borrow_mut().push(Box::new(f));
    }

    /// The toolkit is closing the window: run the close hook, then close.
    pub fn about_to_close(&self) {
        let on_close = self.on_close.borrow_mut().take();
        if let Some(on_close) = on_close {
            on_close();
        }
        self.close();
    }

    /// Release everything the window holds. Idempotent.
    pub fn close(&self) {
        let Some(window) = self.document_window.get() else {
            return;
        };
        let listeners = std::mem::take(&mut *self.close_listeners.borrow_mut());
        for listener in listeners {
            listener(self);
        }
        self.on_close.borrow_mut().take();
        self.event_loop.borrow_mut().take();
        self.document_window.set(None);
        self.ui.destroy_document_window(window);
        self.menus.borrow_mut().clear();
        self.commands.borrow_mut().clear();
        self.queue.borrow_mut().clear();
        self.tasks.borrow_mut().clear();
        self.app.borrow_mut().take();
        debug!(?window, "closed window");
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("document_window", &self.document_window.get())
            .field("shortcut_context", &self.shortcut_context)
            .field("menus", &*self.menus.borrow())
            .finish_non_exhaustive()
    }
}
