//! Constructors for structured arguments.
//!
//! Every constructor returns a field-emitting [`Marker`] that can be passed as a positional
//! log-call argument, or attached to another marker as a reference.
//!
//! # Examples
//!
//! ```rust
//! use logfields::structured::{entries, key_value, value};
//! use logfields::value::Map;
//!
//! let user = value("user", "alice");
//! let port = key_value("port", 8080);
//! let labels = entries([("team", "core")].into_iter().collect::<Map>());
//!
//! assert_eq!(user.to_string(), "alice");
//! assert_eq!(port.to_string(), "port=8080");
//! assert_eq!(labels.to_string(), "{team=core}");
//! ```

use crate::error::Error;
use crate::field::{FieldValue, MapEntries, SingleField};
use crate::marker::{Marker, MarkerKind};
use crate::pattern::FormatPattern;
use crate::value::{Map, Value};

/// Name of the markers built by [`value`], [`key_value`] and [`key_value_with_pattern`].
pub const APPEND_OBJECT_MARKER_NAME: &str = "LS_APPEND_OBJECT";

/// Name of the markers built by [`raw`].
pub const APPEND_RAW_MARKER_NAME: &str = "LS_APPEND_RAW";

/// Name of the markers built by [`entries`] and [`entries_absent`].
pub const MAP_FIELDS_MARKER_NAME: &str = "LS_MAP_FIELDS";

/// A field rendered in text as its value only.
pub fn value(key: impl Into<String>, value: impl Into<Value>) -> Marker {
    single(key, value, FormatPattern::VALUE_ONLY)
}

/// A field rendered in text as `key=value`.
pub fn key_value(key: impl Into<String>, value: impl Into<Value>) -> Marker {
    single(key, value, FormatPattern::KEY_VALUE)
}

/// A field rendered in text through a custom pattern, `{0}` being the key and `{1}` the
/// value.
///
/// Returns [`Error::InvalidPattern`] if `pattern` does not compile.
pub fn key_value_with_pattern(
    key: impl Into<String>,
    value: impl Into<Value>,
    pattern: impl Into<String>,
) -> Result<Marker, Error> {
    Ok(single(key, value, FormatPattern::new(pattern)?))
}

/// A field holding an object array.
pub fn array<I>(key: impl Into<String>, elements: I) -> Marker
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    key_value(key, Value::array(elements))
}

/// One field per entry of `map`, rendered in text as the whole mapping.
pub fn entries(map: Map) -> Marker {
    Marker::with_kind(
        MAP_FIELDS_MARKER_NAME,
        MarkerKind::Entries(MapEntries::new(Some(map))),
    )
}

/// An entries argument without a mapping: writes nothing and renders as `null`.
pub fn entries_absent() -> Marker {
    Marker::with_kind(
        MAP_FIELDS_MARKER_NAME,
        MarkerKind::Entries(MapEntries::new(None)),
    )
}

/// A field whose value is pre-encoded JSON, written to the document unescaped.
///
/// The text is not validated here, a sink that parses it reports invalid JSON as a sink
/// failure.
pub fn raw(key: impl Into<String>, json: impl Into<String>) -> Marker {
    Marker::with_kind(
        APPEND_RAW_MARKER_NAME,
        MarkerKind::Field(SingleField::new(
            key,
            FieldValue::RawJson(json.into()),
            FormatPattern::KEY_VALUE,
        )),
    )
}

fn single(key: impl Into<String>, value: impl Into<Value>, pattern: FormatPattern) -> Marker {
    Marker::with_kind(
        APPEND_OBJECT_MARKER_NAME,
        MarkerKind::Field(SingleField::new(
            key,
            FieldValue::Object(value.into()),
            pattern,
        )),
    )
}
