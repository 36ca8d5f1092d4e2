//! Outgoing event slots for handlers that raise events.
//!
//! A component handler owns an [`EventSlots`] and fires its declared events
//! through it; the constructor connects each slot to a method on the outer
//! handler. A slot holds at most one callback, and connecting again replaces
//! it.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

/// Keyword arguments passed to an event method.
pub type EventArgs = Map<String, Value>;

/// A toolkit or handler signal callback: positional then keyword arguments.
pub type SignalCallback = Box<dyn FnMut(&[Value], &EventArgs)>;

#[derive(Default)]
pub struct EventSlots {
    slots: HashMap<String, SignalCallback>,
}

impl EventSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback` on `event`, replacing any previous one.
    pub fn connect(&mut self, event: impl Into<String>, callback: SignalCallback) {
        self.slots.insert(event.into(), callback);
    }

    pub fn disconnect(&mut self, event: &str) -> bool {
        self.slots.remove(event).is_some()
    }

    pub fn is_connected(&self, event: &str) -> bool {
        self.slots.contains_key(event)
    }

    /// Fire `event` with positional arguments. Returns whether anything was
    /// connected.
    pub fn fire(&mut self, event: &str, args: &[Value]) -> bool {
        self.fire_with(event, args, &EventArgs::new())
    }

    /// Fire `event` with positional and keyword arguments.
    pub fn fire_with(&mut self, event: &str, args: &[Value], kwargs: &EventArgs) -> bool {
        match self.slots.get_mut(event) {
            Some(callback) => {
                callback(args, kwargs);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for EventSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("EventSlots").field("connected", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fire_unconnected_returns_false() {
        let mut slots = EventSlots::new();
        assert!(!slots.fire("on_changed", &[]));
    }

    #[test]
    fn fire_passes_arguments() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut slots = EventSlots::new();
        slots.connect(
            "on_changed",
            Box::new(move |args, kwargs| {
                sink.borrow_mut().push((args.to_vec(), kwargs.clone()));
            }),
        );
        let mut kwargs = EventArgs::new();
        kwargs.insert("source".into(), json!("slider"));
        assert!(slots.fire_with("on_changed", &[json!(4)], &kwargs));
        let seen = seen.borrow();
        assert_eq!(seen[0].0, vec![json!(4)]);
        assert_eq!(seen[0].1["source"], json!("slider"));
    }

    #[test]
    fn connect_replaces_previous() {
        let count = Rc::new(RefCell::new((0, 0)));
        let (a, b) = (count.clone(), count.clone());
        let mut slots = EventSlots::new();
        slots.connect("on_x", Box::new(move |_, _| a.borrow_mut().0 += 1));
        slots.connect("on_x", Box::new(move |_, _| b.borrow_mut().1 += 1));
        slots.fire("on_x", &[]);
        assert_eq!(*count.borrow(), (0, 1));
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn disconnect_removes_slot() {
        let mut slots = EventSlots::new();
        slots.connect("on_x", Box::new(|_, _| {}));
        assert!(slots.disconnect("on_x"));
        assert!(!slots.is_connected("on_x"));
        assert!(slots.is_empty());
    }
}
