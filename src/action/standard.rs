//! The standard application and window actions.
//!
//! Edit and window-management actions forward a command name to the focused
//! widget, falling back to the window's own command table. They report
//! enabled when either side handles the command.

use std::sync::Arc;

use super::{Action, ActionContext};

/// Default shortcut table: (action id, context, key sequence).
pub const STANDARD_SHORTCUTS: &[(&str, &str, &str)] = &[
    ("application.exit", "window", "quit"),
    ("window.close", "window", "close"),
    ("window.print", "window", "Ctrl+P"),
    ("window.undo", "window", "undo"),
    ("window.redo", "window", "redo"),
    ("window.cut", "window", "cut"),
    ("window.copy", "window", "copy"),
    ("window.paste", "window", "paste"),
    ("window.delete", "window", "delete"),
    ("window.select_all", "window", "select-all"),
];

/// (action id, display name, command) for every forwarding action.
const DISPATCH_ACTIONS: &[(&str, &str, &str)] = &[
    ("window.bring_to_front", "Bring to Front", "bring_to_front"),
    ("window.copy", "Copy", "copy"),
    ("window.cut", "Cut", "cut"),
    ("window.delete", "Delete", "delete"),
    ("window.minimize", "Minimize", "minimize"),
    ("window.page_setup", "Page Setup", "page_setup"),
    ("window.paste", "Paste", "paste"),
    ("window.print", "Print...", "print"),
    ("window.redo", "Redo", "redo"),
    ("window.select_all", "Select All", "select_all"),
    ("window.undo", "Undo", "undo"),
    ("window.zoom", "Zoom", "zoom"),
];

/// Every standard action, ready to register.
pub fn standard_actions() -> Vec<Arc<dyn Action>> {
    let mut actions: Vec<Arc<dyn Action>> = vec![
        Arc::new(AboutAction),
        Arc::new(CloseWindowAction),
        Arc::new(ExitAction),
        Arc::new(PreferencesAction),
    ];
    actions.extend(
        DISPATCH_ACTIONS
            .iter()
            .map(|&(id, name, command)| Arc::new(DispatchAction::new(id, name, command)) as Arc<dyn Action>),
    );
    actions
}

fn focus_or_window_handles(context: &ActionContext<'_>, command: &str) -> bool {
    let focus_handles = context
        .focus_widget
        .is_some_and(|widget| context.window.ui().handles_command(widget, command));
    focus_handles || context.window.has_command(command)
}

// ---------------------------------------------------------------------------
// DispatchAction
// ---------------------------------------------------------------------------

/// Forwards `command` to the focused widget, then the window.
#[derive(Debug, Clone)]
pub struct DispatchAction {
    id: &'static str,
    name: &'static str,
    command: &'static str,
}

impl DispatchAction {
    pub const fn new(id: &'static str, name: &'static str, command: &'static str) -> Self {
        Self { id, name, command }
    }

    pub fn command(&self) -> &str {
        self.command
    }
}

impl Action for DispatchAction {
    fn action_id(&self) -> &str {
        self.id
    }

    fn action_name(&self) -> &str {
        self.name
    }

    fn invoke(&self, context: &ActionContext<'_>) {
        if !context.window.dispatch_any_to_focus_widget(self.command) {
            tracing::debug!(command = self.command, "no receiver for command");
        }
    }

    fn is_enabled(&self, context: &ActionContext<'_>) -> bool {
        focus_or_window_handles(context, self.command)
    }
}

// ---------------------------------------------------------------------------
// Application-level actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct CloseWindowAction;

impl Action for CloseWindowAction {
    fn action_id(&self) -> &str {
        "window.close"
    }

    fn action_name(&self) -> &str {
        "Close Window"
    }

    fn invoke(&self, context: &ActionContext<'_>) {
        context.window.request_close();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExitAction;

impl Action for ExitAction {
    fn action_id(&self) -> &str {
        "application.exit"
    }

    fn action_name(&self) -> &str {
        "Exit"
    }

    fn role(&self) -> Option<&str> {
        Some("quit")
    }

    fn invoke(&self, context: &ActionContext<'_>) {
        if let Some(application) = &context.application {
            application.exit();
        }
    }
}

/// Runs `command` on the window if it has it, else on the application.
fn window_then_application(context: &ActionContext<'_>, command: &str) {
    if context.window.has_command(command) {
        context.window.dispatch_command(command);
    } else if let Some(application) = &context.application {
        application.dispatch_command(command);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AboutAction;

impl Action for AboutAction {
    fn action_id(&self) -> &str {
        "application.about"
    }

    fn action_name(&self) -> &str {
        "About..."
    }

    fn role(&self) -> Option<&str> {
        Some("about")
    }

    /// Names the application when its configuration carries a title.
    fn get_action_name(&self, context: &ActionContext<'_>) -> String {
        let title = context
            .application
            .as_ref()
            .and_then(|app| app.config().title.clone());
        match title {
            Some(title) => format!("About {title}..."),
            None => self.action_name().to_owned(),
        }
    }

    fn invoke(&self, context: &ActionContext<'_>) {
        window_then_application(context, "about");
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PreferencesAction;

impl Action for PreferencesAction {
    fn action_id(&self) -> &str {
        "application.preferences"
    }

    fn action_name(&self) -> &str {
        "Preferences..."
    }

    fn role(&self) -> Option<&str> {
        Some("preferences")
    }

    fn invoke(&self, context: &ActionContext<'_>) {
        window_then_application(context, "preferences");
    }
}
