//! Name and property wiring.
//!
//! Literal values land on the widget immediately. Binding expressions become
//! [`Finisher`]s, resolved against the handler only after the enclosing
//! subtree is complete so a path may name objects set up later in the pass.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use super::ConstructError;
use crate::handler::{with_handler_mut, HandlerRef, PropertyBinding};
use crate::spec::{BindingExpr, ReferenceValue, StringValue};
use crate::ui::{UserInterface, WidgetId};

/// Hand `widget` to the handler under `name`.
pub fn connect_name(handler: Option<&HandlerRef>, name: Option<&str>, widget: WidgetId) {
    if let (Some(handler), Some(name)) = (handler, name) {
        with_handler_mut(handler, |h| h.set_widget(name, widget));
    }
}

/// Wire a string property: a literal is set on the widget, a binding is
/// queued.
pub fn connect_string_value(
    ui: &dyn UserInterface,
    widget: WidgetId,
    property: &str,
    value: Option<&StringValue>,
    handler: Option<&HandlerRef>,
    finishers: &mut Vec<Finisher>,
) {
    match value {
        None => {}
        Some(StringValue::Literal(text)) => {
            ui.set_property(widget, property, Value::String(text.clone()));
        }
        Some(StringValue::Binding(binding)) => match handler {
            Some(handler) => finishers.push(Finisher::new(widget, property, binding.clone(), handler)),
            None => debug!(%property, %binding, "binding without a handler; skipped"),
        },
    }
}

/// Wire a reference property onto the widget's `binding_name` (defaults to
/// `property`).
///
/// An attribute name is read off the handler now; a binding is queued. An
/// empty attribute name leaves the widget untouched.
pub fn connect_reference_value(
    ui: &dyn UserInterface,
    widget: WidgetId,
    property: &str,
    value: Option<&ReferenceValue>,
    handler: Option<&HandlerRef>,
    binding_name: Option<&str>,
    finishers: &mut Vec<Finisher>,
) -> Result<(), ConstructError> {
    let target = binding_name.unwrap_or(property);
    let Some(handler) = handler else {
        return Ok(());
    };
    match value {
        None => {}
        Some(ReferenceValue::Attribute(name)) if name.is_empty() => {}
        Some(ReferenceValue::Attribute(name)) => {
            let current = handler
                .try_borrow()
                .map_err(|_| ConstructError::HandlerBusy)?
                .property(name);
            let current = current.ok_or_else(|| ConstructError::unresolved(name, name))?;
            ui.set_property(widget, target, current);
        }
        Some(ReferenceValue::Binding(binding)) => {
            finishers.push(Finisher::new(widget, target, binding.clone(), handler));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Finisher
// ---------------------------------------------------------------------------

/// A property binding waiting for its subtree to be complete.
pub struct Finisher {
    widget: WidgetId,
    property: String,
    binding: BindingExpr,
    handler: HandlerRef,
}

impl Finisher {
    pub fn new(
        widget: WidgetId,
        property: impl Into<String>,
        binding: BindingExpr,
        handler: &HandlerRef,
    ) -> Self {
        Self {
            widget,
            property: property.into(),
            binding,
            handler: handler.clone(),
        }
    }

    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn binding(&self) -> &BindingExpr {
        &self.binding
    }

    /// Resolve the source object, leaf property, and converter, then attach
    /// the binding to the widget.
    pub fn finish(self, ui: &dyn UserInterface) -> Result<(), ConstructError> {
        let path = self.binding.path().join(".");

        let mut source = self.handler.clone();
        for segment in self.binding.source_path() {
            let next = source
                .try_borrow()
                .map_err(|_| ConstructError::HandlerBusy)?
                .object(segment);
            source = next.ok_or_else(|| ConstructError::unresolved(&path, segment))?;
        }

        let leaf = self.binding.property();
        let exists = source
            .try_borrow()
            .map_err(|_| ConstructError::HandlerBusy)?
            .property(leaf)
            .is_some();
        if !exists {
            return Err(ConstructError::unresolved(&path, leaf));
        }

        let converter = match self.binding.converter() {
            Some(name) => {
                let converter = self
                    .handler
                    .try_borrow()
                    .map_err(|_| ConstructError::HandlerBusy)?
                    .converter(name);
                Some(converter.ok_or_else(|| ConstructError::unresolved(name, name))?)
            }
            None => None,
        };

        debug!(widget = ?self.widget, property = %self.property, %path, "bind");
        ui.bind_property(
            self.widget,
            &self.property,
            PropertyBinding::new(source, leaf, converter),
        );
        Ok(())
    }
}

impl fmt::Debug for Finisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finisher")
            .field("widget", &self.widget)
            .field("property", &self.property)
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

/// Attach every queued binding, in order. Stops at the first failure.
pub fn run_finishers(ui: &dyn UserInterface, finishers: Vec<Finisher>) -> Result<(), ConstructError> {
    for finisher in finishers {
        finisher.finish(ui)?;
    }
    Ok(())
}
