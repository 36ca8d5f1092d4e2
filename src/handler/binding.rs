//! Property bindings between a widget property and a handler attribute.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use super::HandlerRef;

/// Transforms values crossing a binding in both directions.
pub trait Converter {
    /// Handler value to widget value.
    fn convert(&self, value: Value) -> Value;

    /// Widget value to handler value.
    fn convert_back(&self, value: Value) -> Value;
}

/// A [`Converter`] built from a pair of closures.
pub struct FnConverter<F, B> {
    forward: F,
    back: B,
}

impl<F, B> FnConverter<F, B>
where
    F: Fn(Value) -> Value,
    B: Fn(Value) -> Value,
{
    pub fn new(forward: F, back: B) -> Self {
        Self { forward, back }
    }
}

impl<F, B> Converter for FnConverter<F, B>
where
    F: Fn(Value) -> Value,
    B: Fn(Value) -> Value,
{
    fn convert(&self, value: Value) -> Value {
        (self.forward)(value)
    }

    fn convert_back(&self, value: Value) -> Value {
        (self.back)(value)
    }
}

/// A live link from a widget property to `source.property`.
///
/// The toolkit reads through [`value`](Self::value) to refresh the widget and
/// writes user edits back through [`update`](Self::update).
#[derive(Clone)]
pub struct PropertyBinding {
    source: HandlerRef,
    property: String,
    converter: Option<Rc<dyn Converter>>,
}

impl PropertyBinding {
    pub fn new(
        source: HandlerRef,
        property: impl Into<String>,
        converter: Option<Rc<dyn Converter>>,
    ) -> Self {
        Self {
            source,
            property: property.into(),
            converter,
        }
    }

    pub fn source(&self) -> &HandlerRef {
        &self.source
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn has_converter(&self) -> bool {
        self.converter.is_some()
    }

    /// Current source value, converted for the widget.
    ///
    /// `None` if the source does not expose the property or is busy.
    pub fn value(&self) -> Option<Value> {
        let raw = self.source.try_borrow().ok()?.property(&self.property)?;
        Some(match &self.converter {
            Some(converter) => converter.convert(raw),
            None => raw,
        })
    }

    /// Push a widget value back to the source. Returns `false` if the source
    /// rejected it or is busy.
    pub fn update(&self, value: Value) -> bool {
        let value = match &self.converter {
            Some(converter) => converter.convert_back(value),
            None => value,
        };
        match self.source.try_borrow_mut() {
            Ok(mut source) => source.set_property(&self.property, value),
            Err(_) => false,
        }
    }
}

impl fmt::Debug for PropertyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBinding")
            .field("property", &self.property)
            .field("converter", &self.converter.is_some())
            .finish_non_exhaustive()
    }
}
