//! Structured document targets.
//!
//! The engine writes fields through the [`DocumentSink`] trait and never interprets the
//! values it hands over beyond the text it renders itself.
//!
//! Two sinks are provided:
//!
//! - [`JsonWriter`]: streams a single JSON object into any [`std::io::Write`].
//! - [`ValueSink`]: collects the fields into an in-memory [`serde_json::Value`].

use core::fmt::Debug;

use crate::error::Error;
use crate::value::Value;

pub use self::json::JsonWriter;
pub use self::value::ValueSink;

mod json;
mod value;

/// A target for named document fields.
///
/// Values bind to the most recently written field name. Field names are not deduplicated:
/// what a repeated name means is up to the implementation.
pub trait DocumentSink: Debug {
    /// Starts a field named `name`.
    fn write_field_name(&mut self, name: &str) -> Result<(), Error>;

    /// Writes `value` as the value of the pending field.
    fn write_object(&mut self, value: &Value) -> Result<(), Error>;

    /// Writes pre-encoded `json` unescaped as the value of the pending field.
    fn write_raw_value(&mut self, json: &str) -> Result<(), Error>;

    /// Writes a complete field.
    fn write_object_field(&mut self, name: &str, value: &Value) -> Result<(), Error> {
        self.write_field_name(name)?;
        self.write_object(value)
    }
}
