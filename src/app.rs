//! Application: configuration, shared registry, exit and command hooks.
//!
//! [`Application`] is shared by every window it creates (`Rc<Application>`).
//! The host loop owns it, polls [`is_exit_requested`](Application::is_exit_requested),
//! and ticks windows; each window's periodic pass ends with
//! [`Application::periodic`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use serde::Deserialize;

use crate::action::ActionRegistry;
use crate::ui::UiRef;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name, shown by the About action.
    pub title: Option<String>,
    /// Title given to windows and dialogs that declare none.
    pub default_window_title: String,
    /// Shortcut context used for menu key sequences and key lookup.
    pub shortcut_context: String,
    /// Whether dialogs receive the standard File/Edit/Window/Help menus.
    pub standard_menus: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: None,
            default_window_title: "Untitled".to_owned(),
            shortcut_context: "window".to_owned(),
            standard_menus: true,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_default_window_title(mut self, title: impl Into<String>) -> Self {
        self.default_window_title = title.into();
        self
    }

    pub fn with_shortcut_context(mut self, context: impl Into<String>) -> Self {
        self.shortcut_context = context.into();
        self
    }

    pub fn with_standard_menus(mut self, enabled: bool) -> Self {
        self.standard_menus = enabled;
        self
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

type Command = Rc<dyn Fn() -> bool>;

pub struct Application {
    ui: UiRef,
    config: AppConfig,
    registry: Arc<ActionRegistry>,
    exit_requested: Cell<bool>,
    commands: RefCell<HashMap<String, Command>>,
    on_periodic: RefCell<Option<Box<dyn FnMut()>>>,
}

impl Application {
    /// Create an application over `ui` using the process-wide registry.
    pub fn new(ui: UiRef, config: AppConfig) -> Self {
        Self {
            ui,
            config,
            registry: ActionRegistry::global(),
            exit_requested: Cell::new(false),
            commands: RefCell::new(HashMap::new()),
            on_periodic: RefCell::new(None),
        }
    }

    /// Use a dedicated action registry instead of the process-wide one.
    pub fn with_registry(mut self, registry: Arc<ActionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn ui(&self) -> &UiRef {
        &self.ui
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// Record an exit request for the host loop.
    pub fn exit(&self) {
        tracing::debug!("exit requested");
        self.exit_requested.set(true);
    }

    pub fn is_exit_requested(&self) -> bool {
        self.exit_requested.get()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Give the application a named command, replacing any previous one.
    pub fn register_command(&self, command: impl Into<String>, f: impl Fn() -> bool + 'static) {
        self.commands.borrow_mut().insert(command.into(), Rc::new(f));
    }

    pub fn has_command(&self, command: &str) -> bool {
        self.commands.borrow().contains_key(command)
    }

    /// Run a named command. Returns `false` if it is missing or declined.
    pub fn dispatch_command(&self, command: &str) -> bool {
        let found = self.commands.borrow().get(command).cloned();
        match found {
            Some(f) => f(),
            None => false,
        }
    }

    // ── Periodic ─────────────────────────────────────────────────────

    /// Install the hook run at the end of every window tick.
    pub fn set_periodic(&self, f: impl FnMut() + 'static) {
        *self.on_periodic.borrow_mut() = Some(Box::new(f));
    }

    pub fn periodic(&self) {
        // Take the hook out so it can re-enter the application.
        let Some(mut hook) = self.on_periodic.borrow_mut().take() else {
            return;
        };
        hook();
        let mut slot = self.on_periodic.borrow_mut();
        if slot.is_none() {
            *slot = Some(hook);
        }
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("exit_requested", &self.exit_requested.get())
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
