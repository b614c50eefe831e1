//! Assembly of one log event into a structured document.
//!
//! [`ArgumentAssembler::serialize`] writes, in order:
//!
//! 1. `@timestamp`, RFC 3339 in UTC with millisecond precision.
//! 2. `message`, raw or truncated according to [`Settings`].
//! 3. Context properties, if enabled.
//! 4. The positional arguments, if either inclusion flag is enabled.
//!
//! Field names are not deduplicated. A structured argument named `message` is written
//! after the baseline `message` field, what that means is up to the sink.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::argument::Argument;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::Error;
use crate::message::format_message;
use crate::render::Renderer;
use crate::sink::{DocumentSink, ValueSink};
use crate::value::Value;

/// Document field holding the event timestamp.
pub const TIMESTAMP_FIELD: &str = "@timestamp";

/// Document field holding the event message.
pub const MESSAGE_FIELD: &str = "message";

/// Appended to a message cut at [`Settings::max_message_size`].
pub const TRUNCATION_MARKER: &str = "..";

/// Default value of [`Settings::non_structured_arguments_field_prefix`].
pub const DEFAULT_FIELD_PREFIX: &str = "arg";

/// Options controlling what [`ArgumentAssembler`] writes.
///
/// Every field has a default, so hosts can deserialize partial configurations.
///
/// # Examples
///
/// ```rust
/// use logfields::assembler::Settings;
///
/// let settings: Settings =
///     serde_json::from_str(r#"{ "include_structured_arguments": true }"#).unwrap();
/// assert!(settings.include_structured_arguments);
/// assert_eq!(settings.non_structured_arguments_field_prefix, "arg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Write field-emitting arguments through their own fields.
    pub include_structured_arguments: bool,

    /// Write other arguments as `prefix + index` fields.
    pub include_non_structured_arguments: bool,

    /// Prefix of the fields written for non-structured arguments.
    pub non_structured_arguments_field_prefix: String,

    /// Write the message unescaped, as pre-encoded JSON.
    pub raw_json_message: bool,

    /// Maximum message length in characters, `0` for no limit. Ignored for raw messages.
    pub max_message_size: usize,

    /// Write the event's context properties as fields.
    pub include_context_properties: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            include_structured_arguments: false,
            include_non_structured_arguments: false,
            non_structured_arguments_field_prefix: DEFAULT_FIELD_PREFIX.to_owned(),
            raw_json_message: false,
            max_message_size: 0,
            include_context_properties: false,
        }
    }
}

/// The parts of a log call that end up in the document.
#[derive(Clone, Debug, Default)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp_millis: i64,

    /// The formatted message.
    pub message: String,

    /// Positional arguments in call order.
    pub arguments: Option<Vec<Argument>>,

    /// Flat context properties in iteration order.
    pub context_properties: Option<IndexMap<String, String>>,
}

impl LogEvent {
    /// Creates an event without arguments or context properties.
    pub fn new(timestamp_millis: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp_millis,
            message: message.into(),
            arguments: None,
            context_properties: None,
        }
    }

    /// Creates an event whose message is `template` with its `{}` anchors replaced by
    /// `arguments`, see [`format_message`].
    pub fn formatted(
        timestamp_millis: i64,
        template: &str,
        arguments: Vec<Argument>,
        renderer: &mut Renderer,
    ) -> Self {
        let message = format_message(template, &arguments, renderer);
        Self::new(timestamp_millis, message).with_arguments(arguments)
    }

    /// Sets the positional arguments.
    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = Some(arguments);
        self
    }

    /// Sets the context properties.
    pub fn with_context_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.context_properties = Some(
            properties
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }
}

/// Writes log events into document sinks.
///
/// # Examples
///
/// ```rust
/// use logfields::arguments;
/// use logfields::assembler::{ArgumentAssembler, LogEvent, Settings};
/// use logfields::structured::key_value;
///
/// # fn main() -> Result<(), logfields::Error> {
/// let assembler = ArgumentAssembler::new(Settings {
///     include_structured_arguments: true,
///     include_non_structured_arguments: true,
///     ..Settings::default()
/// });
///
/// let event = LogEvent::new(0, "done")
///     .with_arguments(arguments![key_value("x", 1), "plainArg"]);
///
/// assert_eq!(
///     assembler.to_json(&event)?,
///     serde_json::json!({
///         "@timestamp": "1970-01-01T00:00:00.000Z",
///         "message": "done",
///         "x": 1,
///         "arg1": "plainArg",
///     })
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArgumentAssembler {
    settings: Settings,
    diagnostics: Arc<dyn Diagnostics>,
}

impl ArgumentAssembler {
    /// Creates an assembler reporting to [`TracingDiagnostics`].
    pub fn new(settings: Settings) -> Self {
        Self::with_diagnostics(settings, Arc::new(TracingDiagnostics))
    }

    /// Creates an assembler reporting argument values that fail to render to `diagnostics`.
    pub fn with_diagnostics(settings: Settings, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            settings,
            diagnostics,
        }
    }

    /// The settings in use.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Writes `event` into `sink`.
    ///
    /// Caller values are written as their text form, a value that fails to render is written
    /// as the placeholder and reported to this assembler's channel. Sink failures are returned
    /// unchanged and leave the document incomplete.
    pub fn serialize(&self, event: &LogEvent, sink: &mut dyn DocumentSink) -> Result<(), Error> {
        let sink = &mut ReportingSink {
            inner: &mut *sink,
            diagnostics: &*self.diagnostics,
        };

        sink.write_object_field(TIMESTAMP_FIELD, &timestamp(event.timestamp_millis))?;
        self.serialize_message(&event.message, sink)?;

        if self.settings.include_context_properties
            && let Some(properties) = &event.context_properties
        {
            for (key, value) in properties {
                sink.write_object_field(key, &Value::from(value))?;
            }
        }

        if let Some(arguments) = &event.arguments {
            self.serialize_arguments(arguments, sink)?;
        }

        Ok(())
    }

    /// Serializes `event` into a JSON value.
    pub fn to_json(&self, event: &LogEvent) -> Result<serde_json::Value, Error> {
        let mut sink = ValueSink::new();
        self.serialize(event, &mut sink)?;
        sink.into_value()
    }

    fn serialize_message(&self, message: &str, sink: &mut dyn DocumentSink) -> Result<(), Error> {
        if self.settings.raw_json_message {
            sink.write_field_name(MESSAGE_FIELD)?;
            return sink.write_raw_value(message);
        }

        let max = self.settings.max_message_size;
        let message = match message.char_indices().nth(max) {
            Some((cut, _)) if max > 0 => {
                let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
                truncated.push_str(&message[..cut]);
                truncated.push_str(TRUNCATION_MARKER);
                Value::String(truncated)
            }
            _ => Value::from(message),
        };

        sink.write_object_field(MESSAGE_FIELD, &message)
    }

    fn serialize_arguments(
        &self,
        arguments: &[Argument],
        sink: &mut dyn DocumentSink,
    ) -> Result<(), Error> {
        let Settings {
            include_structured_arguments: structured,
            include_non_structured_arguments: non_structured,
            non_structured_arguments_field_prefix: prefix,
            ..
        } = &self.settings;

        if !structured && !non_structured {
            return Ok(());
        }

        for (index, argument) in arguments.iter().enumerate() {
            if let Some(emitter) = argument.field_emitter() {
                // Never redirected to the indexed fields, even when not included.
                if *structured {
                    emitter.write_to(sink)?;
                }
                continue;
            }

            if *non_structured {
                let name = format!("{prefix}{index}");
                match argument {
                    Argument::Value(value) => sink.write_object_field(&name, value)?,
                    Argument::Marker(marker) => {
                        sink.write_object_field(&name, &Value::String(marker.to_string()))?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for ArgumentAssembler {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// Renders caller objects with the assembler's channel before they reach the sink.
#[derive(Debug)]
struct ReportingSink<'a, 's> {
    inner: &'a mut (dyn DocumentSink + 's),
    diagnostics: &'a dyn Diagnostics,
}

impl DocumentSink for ReportingSink<'_, '_> {
    fn write_field_name(&mut self, name: &str) -> Result<(), Error> {
        self.inner.write_field_name(name)
    }

    fn write_object(&mut self, value: &Value) -> Result<(), Error> {
        self.inner
            .write_object(&value.with_objects_rendered(self.diagnostics))
    }

    fn write_raw_value(&mut self, json: &str) -> Result<(), Error> {
        self.inner.write_raw_value(json)
    }
}

fn timestamp(millis: i64) -> Value {
    match DateTime::from_timestamp_millis(millis) {
        Some(time) => Value::String(time.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => Value::I64(millis),
    }
}
