//! Positional log-call arguments.

use std::sync::Arc;

use crate::field::FieldEmitter;
use crate::marker::Marker;
use crate::render::Renderer;
use crate::value::Value;

/// One positional argument of a log call.
#[derive(Clone, Debug)]
pub enum Argument {
    /// A marker, field-emitting or plain.
    Marker(Arc<Marker>),
    /// Any other value.
    Value(Value),
}

impl Argument {
    /// The field-emitting behaviour of this argument, if it has any.
    pub fn field_emitter(&self) -> Option<&dyn FieldEmitter> {
        match self {
            Argument::Marker(marker) => marker.field_emitter(),
            Argument::Value(_) => None,
        }
    }

    /// Renders the argument for the log line.
    pub fn render(&self, renderer: &mut Renderer) -> String {
        match self {
            Argument::Marker(marker) => marker.render(renderer),
            Argument::Value(value) => renderer.render_value(value),
        }
    }
}

/// Conversion into an [`Argument`], used by [`arguments!`](crate::arguments).
///
/// Implemented for markers and for everything convertible into a [`Value`].
pub trait IntoArgument {
    /// Performs the conversion.
    fn into_argument(self) -> Argument;
}

impl<T> IntoArgument for T
where
    T: Into<Value>,
{
    fn into_argument(self) -> Argument {
        Argument::Value(self.into())
    }
}

impl IntoArgument for Marker {
    fn into_argument(self) -> Argument {
        Argument::Marker(Arc::new(self))
    }
}

impl IntoArgument for Arc<Marker> {
    fn into_argument(self) -> Argument {
        Argument::Marker(self)
    }
}

impl IntoArgument for Argument {
    fn into_argument(self) -> Argument {
        self
    }
}
