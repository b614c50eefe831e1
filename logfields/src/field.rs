//! Field-emitting marker kinds.
//!
//! A field emitter writes itself into the structured document and renders itself into the
//! text of the log line. The two channels are not required to agree character for
//! character, see [`MapEntries`].

use crate::error::Error;
use crate::pattern::FormatPattern;
use crate::render::Renderer;
use crate::sink::DocumentSink;
use crate::stringify::{self, FAILED_TO_STRING};
use crate::value::{Map, Value};

const ORIGIN: &str = "logfields::field";

/// The dual-channel capability shared by field-emitting markers.
pub trait FieldEmitter {
    /// Writes this emitter's fields into `sink`.
    ///
    /// Sink failures are returned unchanged.
    fn write_to(&self, sink: &mut dyn DocumentSink) -> Result<(), Error>;

    /// Renders this emitter's own text, ignoring any marker references.
    fn to_string_self(&self, renderer: &mut Renderer) -> String;
}

/// The value carried by a [`SingleField`].
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// A value encoded by the sink.
    Object(Value),
    /// Pre-encoded JSON text, written unescaped and rendered verbatim.
    RawJson(String),
}

/// Writes exactly one field and renders it through a [`FormatPattern`].
#[derive(Clone, Debug, PartialEq)]
pub struct SingleField {
    field_name: String,
    value: FieldValue,
    pattern: FormatPattern,
}

impl SingleField {
    /// Creates a field rendered with `pattern`.
    pub fn new(field_name: impl Into<String>, value: FieldValue, pattern: FormatPattern) -> Self {
        Self {
            field_name: field_name.into(),
            value,
            pattern,
        }
    }

    /// The document field name.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The field value.
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// The text pattern.
    pub fn pattern(&self) -> &FormatPattern {
        &self.pattern
    }

    fn value_text(&self, renderer: &Renderer) -> String {
        match &self.value {
            FieldValue::Object(value) => renderer.render_value(value),
            FieldValue::RawJson(json) => json.clone(),
        }
    }
}

impl FieldEmitter for SingleField {
    fn write_to(&self, sink: &mut dyn DocumentSink) -> Result<(), Error> {
        sink.write_field_name(&self.field_name)?;
        match &self.value {
            FieldValue::Object(value) => sink.write_object(value),
            FieldValue::RawJson(json) => sink.write_raw_value(json),
        }
    }

    fn to_string_self(&self, renderer: &mut Renderer) -> String {
        let value = self.value_text(renderer);

        if self.pattern.is_value_only() {
            return value;
        }

        if self.pattern.is_key_value() {
            let mut output = String::with_capacity(self.field_name.len() + 1 + value.len());
            output.push_str(&self.field_name);
            output.push('=');
            output.push_str(&value);
            return output;
        }

        match renderer.patterns.get(self.pattern.as_str()) {
            Ok(compiled) => compiled.format(&[self.field_name.as_str(), value.as_str()]),
            // Patterns are validated on construction, this only guards hand-built ones.
            Err(error) => {
                renderer
                    .diagnostics
                    .warn(ORIGIN, "Failed to apply format pattern", Some(&error));
                FAILED_TO_STRING.to_owned()
            }
        }
    }
}

/// Writes one field per mapping entry.
///
/// The text rendering is the display form of the whole mapping, `{k=v, k=v}`, not the
/// individual fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapEntries {
    map: Option<Map>,
}

impl MapEntries {
    /// Emits the entries of `map`, or nothing when the mapping is absent.
    pub fn new(map: Option<Map>) -> Self {
        Self { map }
    }

    /// The mapping, if present.
    pub fn map(&self) -> Option<&Map> {
        self.map.as_ref()
    }
}

impl FieldEmitter for MapEntries {
    fn write_to(&self, sink: &mut dyn DocumentSink) -> Result<(), Error> {
        let Some(map) = &self.map else {
            return Ok(());
        };

        for (key, value) in map.iter() {
            sink.write_object_field(key, value)?;
        }
        Ok(())
    }

    fn to_string_self(&self, renderer: &mut Renderer) -> String {
        match &self.map {
            Some(map) => stringify::map_to_display_string(map, &*renderer.diagnostics),
            None => "null".to_owned(),
        }
    }
}
