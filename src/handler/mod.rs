//! Handler capabilities.
//!
//! A handler is the application object a specification tree is wired to. The
//! runtime never requires a fixed interface: every capability is a defaulted
//! method on [`Handler`], and the optional lifecycle hooks are reached through
//! `as_*` probes that return `None` when the handler does not provide them.
//! Absence of a capability is ordinary control flow.

pub mod binding;
pub mod slots;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::spec::Resources;
use crate::ui::WidgetId;

pub use binding::{Converter, FnConverter, PropertyBinding};
pub use slots::{EventArgs, EventSlots, SignalCallback};

/// Shared, single-threaded handle to a handler.
pub type HandlerRef = Rc<RefCell<dyn Handler>>;

/// Wrap a concrete handler as a [`HandlerRef`].
pub fn handler_ref<H: Handler>(handler: H) -> HandlerRef {
    Rc::new(RefCell::new(handler))
}

/// An application object wired to a widget tree by name, binding, or event.
pub trait Handler: 'static {
    /// Read a named attribute.
    fn property(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Write a named attribute. Returns `false` if the attribute is unknown.
    fn set_property(&mut self, _name: &str, _value: Value) -> bool {
        false
    }

    /// A nested object reached by attribute name, used for dotted binding
    /// paths such as `model.title`.
    fn object(&self, _name: &str) -> Option<HandlerRef> {
        None
    }

    /// A value converter reached by attribute name.
    fn converter(&self, _name: &str) -> Option<Rc<dyn Converter>> {
        None
    }

    /// Receive the widget constructed for a node that declared `name`.
    fn set_widget(&mut self, _name: &str, _widget: WidgetId) {}

    fn has_method(&self, _name: &str) -> bool {
        false
    }

    /// Invoke an event method. `sender` is the widget the event belongs to.
    fn call_method(&mut self, _name: &str, _sender: WidgetId, _args: &EventArgs) {}

    /// Invoke a factory method producing a component's private handler.
    fn create_handler(&mut self, _method: &str) -> Option<HandlerRef> {
        None
    }

    fn resources(&self) -> Option<&Resources> {
        None
    }

    fn resources_mut(&mut self) -> Option<&mut Resources> {
        None
    }

    /// Outgoing event slots, for handlers that act as an event source.
    fn event_slots(&mut self) -> Option<&mut EventSlots> {
        None
    }

    fn as_init_handler(&mut self) -> Option<&mut dyn InitHandler> {
        None
    }

    fn as_init_component(&mut self) -> Option<&mut dyn InitComponent> {
        None
    }

    fn as_close_handler(&mut self) -> Option<&mut dyn CloseHandler> {
        None
    }
}

/// Called on a top-level handler once its tree is attached and bound.
pub trait InitHandler {
    fn init_handler(&mut self);
}

/// Called on a component handler once its content is constructed.
pub trait InitComponent {
    fn init_component(&mut self);
}

/// Called when the toolkit closes the window a handler is attached to.
pub trait CloseHandler {
    fn close(&mut self);
}

/// Run `f` against a mutably borrowed handler.
///
/// Returns `None` without calling `f` when the handler is already borrowed,
/// which happens when a handler method re-enters the runtime on itself.
pub(crate) fn with_handler_mut<R>(
    handler: &HandlerRef,
    f: impl FnOnce(&mut dyn Handler) -> R,
) -> Option<R> {
    match handler.try_borrow_mut() {
        Ok(mut guard) => Some(f(&mut *guard)),
        Err(_) => {
            tracing::warn!("handler is already borrowed; skipping re-entrant call");
            None
        }
    }
}

/// Probe for `init_handler` and run it.
pub(crate) fn init_handler(handler: &HandlerRef) {
    with_handler_mut(handler, |h| {
        if let Some(init) = h.as_init_handler() {
            init.init_handler();
        }
    });
}

/// Probe for `init_component` and run it.
pub(crate) fn init_component(handler: &HandlerRef) {
    with_handler_mut(handler, |h| {
        if let Some(init) = h.as_init_component() {
            init.init_component();
        }
    });
}

/// Probe for `close` and run it.
pub(crate) fn close_handler(handler: &HandlerRef) {
    with_handler_mut(handler, |h| {
        if let Some(close) = h.as_close_handler() {
            close.close();
        }
    });
}
