//! Action registry and shortcut table.
//!
//! [`ActionRegistry`] maps action ids to [`Action`]s and keeps a shortcut
//! table of action id → context name → key sequence. The process-wide
//! instance from [`ActionRegistry::global`] is populated with the standard
//! actions on first use; applications register their own actions on it at
//! startup and read it from then on. Separate registries can be built for
//! tests or embedded hosts.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::standard;
use super::Action;
use crate::event::KeyEvent;

static GLOBAL: Lazy<Arc<ActionRegistry>> =
    Lazy::new(|| Arc::new(ActionRegistry::with_standard_actions()));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("action '{0}' is already registered")]
    DuplicateAction(String),
}

// ---------------------------------------------------------------------------
// ActionRegistry
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ActionRegistry {
    actions: RwLock<HashMap<String, Arc<dyn Action>>>,
    shortcuts: RwLock<BTreeMap<String, BTreeMap<String, String>>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the standard actions and shortcuts.
    pub fn with_standard_actions() -> Self {
        let registry = Self::new();
        registry.register_each(standard::standard_actions());
        for (action_id, context, key_sequence) in standard::STANDARD_SHORTCUTS {
            registry.add_shortcut(*action_id, *context, *key_sequence);
        }
        registry
    }

    /// Register every action, logging and skipping ids already taken.
    /// Returns how many were skipped.
    fn register_each(&self, actions: impl IntoIterator<Item = Arc<dyn Action>>) -> usize {
        let mut skipped = 0;
        for action in actions {
            if let Err(err) = self.register_arc(action) {
                tracing::error!(%err, "skipping action");
                skipped += 1;
            }
        }
        skipped
    }

    /// The process-wide registry.
    pub fn global() -> Arc<ActionRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Register an action under its id.
    pub fn register(&self, action: impl Action + 'static) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(action))
    }

    pub fn register_arc(&self, action: Arc<dyn Action>) -> Result<(), RegistryError> {
        let mut actions = self.actions.write();
        let id = action.action_id().to_owned();
        if actions.contains_key(&id) {
            return Err(RegistryError::DuplicateAction(id));
        }
        tracing::debug!(action_id = %id, "registered action");
        actions.insert(id, action);
        Ok(())
    }

    pub fn get(&self, action_id: &str) -> Option<Arc<dyn Action>> {
        self.actions.read().get(action_id).cloned()
    }

    pub fn contains(&self, action_id: &str) -> bool {
        self.actions.read().contains_key(action_id)
    }

    /// Registered ids, sorted.
    pub fn action_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.actions.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.actions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.read().is_empty()
    }

    // ── Shortcuts ────────────────────────────────────────────────────

    /// Set the key sequence for `action_id` in `context`, replacing any
    /// previous one for that pair.
    pub fn add_shortcut(
        &self,
        action_id: impl Into<String>,
        context: impl Into<String>,
        key_sequence: impl Into<String>,
    ) {
        self.shortcuts
            .write()
            .entry(action_id.into())
            .or_default()
            .insert(context.into(), key_sequence.into());
    }

    /// Add a table of `action_id → [(context, key_sequence)]`.
    pub fn register_shortcuts<I, A, M, C, K>(&self, table: I)
    where
        I: IntoIterator<Item = (A, M)>,
        A: Into<String>,
        M: IntoIterator<Item = (C, K)>,
        C: Into<String>,
        K: Into<String>,
    {
        for (action_id, contexts) in table {
            let action_id = action_id.into();
            for (context, key_sequence) in contexts {
                self.add_shortcut(action_id.clone(), context, key_sequence);
            }
        }
    }

    /// The key sequence for `action_id` in `context`.
    pub fn shortcut(&self, action_id: &str, context: &str) -> Option<String> {
        self.shortcuts
            .read()
            .get(action_id)
            .and_then(|contexts| contexts.get(context))
            .cloned()
    }

    /// The action bound to `key_sequence` in `context`. Linear over the table.
    pub fn action_id_for_key(&self, context: &str, key_sequence: &str) -> Option<String> {
        self.shortcuts
            .read()
            .iter()
            .find(|(_, contexts)| {
                contexts
                    .get(context)
                    .is_some_and(|sequence| sequence == key_sequence)
            })
            .map(|(action_id, _)| action_id.clone())
    }

    /// The action bound to a pressed key in `context`, matching either its
    /// standard-key name or its chord spelling.
    pub fn action_id_for_event(&self, context: &str, event: &KeyEvent) -> Option<String> {
        event
            .standard_key()
            .and_then(|name| self.action_id_for_key(context, name))
            .or_else(|| self.action_id_for_key(context, &event.key_sequence()))
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.action_ids())
            .field("shortcuts", &*self.shortcuts.read())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionContext;
    use crate::event::{Key, Modifiers};

    struct Noop(&'static str);

    impl Action for Noop {
        fn action_id(&self) -> &str {
            self.0
        }

        fn action_name(&self) -> &str {
            "Noop"
        }

        fn invoke(&self, _context: &ActionContext<'_>) {}
    }

    // ── Registration ─────────────────────────────────────────────────

    #[test]
    fn new_registry_is_empty() {
        let reg = ActionRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn register_and_get() {
        let reg = ActionRegistry::new();
        reg.register(Noop("app.noop")).unwrap();
        assert!(reg.contains("app.noop"));
        assert_eq!(reg.get("app.noop").unwrap().action_name(), "Noop");
        assert!(reg.get("app.other").is_none());
    }

    #[test]
    fn duplicate_registration_fails() {
        let reg = ActionRegistry::new();
        reg.register(Noop("app.noop")).unwrap();
        let err = reg.register(Noop("app.noop")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateAction("app.noop".into()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn standard_registry_has_sixteen_actions() {
        let reg = ActionRegistry::with_standard_actions();
        assert_eq!(reg.len(), 16);
        assert!(reg.contains("application.exit"));
        assert!(reg.contains("window.select_all"));
    }

    #[test]
    fn register_each_skips_duplicates_and_keeps_first() {
        let reg = ActionRegistry::new();
        let mut actions = standard::standard_actions();
        actions.push(Arc::new(standard::DispatchAction::new("window.copy", "Copy Twice", "copy")));
        assert_eq!(reg.register_each(actions), 1);
        assert_eq!(reg.len(), 16);
        assert_eq!(reg.get("window.copy").unwrap().action_name(), "Copy");
    }

    #[test]
    fn global_registry_is_shared() {
        let a = ActionRegistry::global();
        let b = ActionRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.contains("window.close"));
    }

    // ── Shortcuts ────────────────────────────────────────────────────

    #[test]
    fn shortcut_lookup_by_context() {
        let reg = ActionRegistry::new();
        reg.add_shortcut("app.find", "window", "Ctrl+F");
        reg.add_shortcut("app.find", "editor", "Ctrl+Shift+F");
        assert_eq!(reg.shortcut("app.find", "window").as_deref(), Some("Ctrl+F"));
        assert_eq!(reg.shortcut("app.find", "editor").as_deref(), Some("Ctrl+Shift+F"));
        assert_eq!(reg.shortcut("app.find", "dialog"), None);
    }

    #[test]
    fn register_shortcuts_table() {
        let reg = ActionRegistry::new();
        reg.register_shortcuts([
            ("app.find", vec![("window", "Ctrl+F")]),
            ("app.replace", vec![("window", "Ctrl+H"), ("editor", "Ctrl+R")]),
        ]);
        assert_eq!(reg.action_id_for_key("window", "Ctrl+H").as_deref(), Some("app.replace"));
        assert_eq!(reg.action_id_for_key("editor", "Ctrl+R").as_deref(), Some("app.replace"));
        assert_eq!(reg.action_id_for_key("editor", "Ctrl+F"), None);
    }

    #[test]
    fn event_matches_standard_name_or_chord() {
        let reg = ActionRegistry::with_standard_actions();
        assert_eq!(
            reg.action_id_for_event("window", &KeyEvent::ctrl('c')).as_deref(),
            Some("window.copy")
        );
        assert_eq!(
            reg.action_id_for_event("window", &KeyEvent::ctrl('p')).as_deref(),
            Some("window.print")
        );
        assert_eq!(
            reg.action_id_for_event("window", &KeyEvent::new(Key::Char('p'), Modifiers::NONE)),
            None
        );
        assert_eq!(reg.action_id_for_event("dialog", &KeyEvent::ctrl('c')), None);
    }
}
