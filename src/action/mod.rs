//! Actions: identifier-keyed commands behind menu items and shortcuts.
//!
//! An [`Action`] computes its title, enabled, and checked state from an
//! [`ActionContext`] each time a menu is about to show, and performs its work
//! on [`invoke`](Action::invoke). Actions live in an [`ActionRegistry`]
//! shared by every window of the process.

pub mod menu;
pub mod registry;
pub mod standard;

use std::rc::Rc;

use crate::app::Application;
use crate::ui::WidgetId;
use crate::window::Window;

pub use menu::{standard_menus, MenuDescription};
pub use registry::{ActionRegistry, RegistryError};

/// What an action observes when it runs or reports state.
pub struct ActionContext<'a> {
    pub application: Option<Rc<Application>>,
    pub window: &'a Window,
    pub focus_widget: Option<WidgetId>,
}

/// A named command.
pub trait Action: Send + Sync {
    /// Globally unique identifier, e.g. `window.copy`.
    fn action_id(&self) -> &str;

    /// Static display name.
    fn action_name(&self) -> &str;

    /// Platform menu role (`about`, `quit`, `preferences`).
    fn role(&self) -> Option<&str> {
        None
    }

    fn invoke(&self, context: &ActionContext<'_>);

    fn is_enabled(&self, _context: &ActionContext<'_>) -> bool {
        true
    }

    fn is_checked(&self, _context: &ActionContext<'_>) -> bool {
        false
    }

    /// Display name for the given context.
    fn get_action_name(&self, _context: &ActionContext<'_>) -> String {
        self.action_name().to_owned()
    }
}
