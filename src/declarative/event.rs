//! Event trampolines.
//!
//! A trampoline adapts a toolkit signal, invoked with positional and keyword
//! arguments, to a handler method invoked as `method(sender, **args)`: the
//! declared argument names are zipped with the positional values and the
//! keyword arguments merged on top.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{trace, warn};

use crate::handler::{with_handler_mut, EventArgs, Handler, HandlerRef, SignalCallback};
use crate::ui::{UserInterface, WidgetId};

/// Where a trampoline is installed.
#[derive(Clone, Copy)]
pub enum SignalSource<'a> {
    /// A toolkit widget signal.
    Widget(WidgetId),
    /// The event slots of a component handler.
    Handler(&'a HandlerRef),
}

/// Route `event` on `source` to `handler.method`, passing `widget` as the
/// sender.
///
/// Does nothing when no method is named. A named method the handler lacks
/// is logged and left unwired.
pub fn connect_event(
    ui: &dyn UserInterface,
    widget: WidgetId,
    source: SignalSource<'_>,
    method: Option<&str>,
    handler: Option<&HandlerRef>,
    event: &str,
    arg_names: &[&str],
) {
    let (Some(method), Some(handler)) = (method, handler) else {
        return;
    };
    let has_method = handler
        .try_borrow()
        .map(|h| h.has_method(method))
        .unwrap_or(false);
    if !has_method {
        warn!(%event, %method, "event method not found on handler");
        return;
    }

    let callback = trampoline(widget, Rc::downgrade(handler), method, arg_names);
    match source {
        SignalSource::Widget(source) => ui.connect(source, event, callback),
        SignalSource::Handler(source) => {
            let connected = with_handler_mut(source, |h| match h.event_slots() {
                Some(slots) => {
                    slots.connect(event, callback);
                    true
                }
                None => false,
            });
            if connected != Some(true) {
                warn!(%event, "component handler has no event slots");
            }
        }
    }
}

fn trampoline(
    sender: WidgetId,
    target: Weak<RefCell<dyn Handler>>,
    method: &str,
    arg_names: &[&str],
) -> SignalCallback {
    let method = method.to_owned();
    let arg_names: Vec<String> = arg_names.iter().map(|&name| name.to_owned()).collect();
    Box::new(move |args: &[Value], kwargs: &EventArgs| {
        let Some(handler) = target.upgrade() else {
            trace!(%method, "handler dropped; event ignored");
            return;
        };
        let mut combined: EventArgs = arg_names.iter().cloned().zip(args.iter().cloned()).collect();
        for (key, value) in kwargs {
            combined.insert(key.clone(), value.clone());
        }
        with_handler_mut(&handler, |h| h.call_method(&method, sender, &combined));
    })
}
