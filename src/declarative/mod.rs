//! Declarative construction: specification tree to live widget tree.
//!
//! [`construct`] walks a [`Node`](crate::spec::Node) once, asking the toolkit
//! for widgets and wiring each one to the handler three ways:
//!
//! - **by name**: a node's `name` hands the widget to
//!   [`Handler::set_widget`](crate::handler::Handler::set_widget);
//! - **by binding**: string and reference properties either set a value now
//!   or queue a [`Finisher`] that attaches a live
//!   [`PropertyBinding`](crate::handler::PropertyBinding) once the whole
//!   subtree exists;
//! - **by event**: event fields install trampolines that call handler
//!   methods with the sender widget and named arguments.
//!
//! Top-level nodes (`window`, `modeless_dialog`) produce a
//! [`Window`](crate::window::Window) and run their own finishers before
//! `init_handler`.

mod component;
pub mod connect;
pub mod construct;
pub mod event;
pub mod top_level;

use crate::ui::WidgetId;
use crate::window::{Window, WindowError};

pub use connect::{
    connect_name, connect_reference_value, connect_string_value, run_finishers, Finisher,
};
pub use construct::{construct, construct_margin};
pub use event::{connect_event, SignalSource};
pub use top_level::{open_window, run_window};

#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    #[error("cannot resolve '{segment}' in '{path}'")]
    AttributeResolution { path: String, segment: String },
    #[error("handler is already borrowed")]
    HandlerBusy,
    #[error(transparent)]
    Window(#[from] WindowError),
}

impl ConstructError {
    pub(crate) fn unresolved(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::AttributeResolution {
            path: path.into(),
            segment: segment.into(),
        }
    }
}

/// The product of constructing one node.
#[derive(Debug)]
pub enum Constructed {
    Widget(WidgetId),
    Window(Window),
}

impl Constructed {
    pub fn widget(&self) -> Option<WidgetId> {
        match self {
            Self::Widget(widget) => Some(*widget),
            Self::Window(_) => None,
        }
    }

    pub fn window(&self) -> Option<&Window> {
        match self {
            Self::Window(window) => Some(window),
            Self::Widget(_) => None,
        }
    }

    pub fn into_window(self) -> Option<Window> {
        match self {
            Self::Window(window) => Some(window),
            Self::Widget(_) => None,
        }
    }
}
