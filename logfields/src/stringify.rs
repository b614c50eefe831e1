//! Array-aware conversion of values to display strings.
//!
//! [`to_display_string`] is total: a caller type whose [`Display`](core::fmt::Display)
//! implementation fails or panics is replaced by [`FAILED_TO_STRING`] and reported to the
//! diagnostic channel, so rendering never aborts a log call.

use core::fmt::{self, Debug, Write};
use std::panic::{self, AssertUnwindSafe};

use crate::diagnostics::Diagnostics;
use crate::value::{Array, Map, Value};

/// Placeholder text for a value whose display conversion failed.
pub const FAILED_TO_STRING: &str = "[FAILED toString()]";

const ORIGIN: &str = "logfields::stringify";

/// Why a display conversion failed.
#[derive(thiserror::Error, Debug)]
enum RenderError {
    #[error("display implementation returned an error")]
    Format(#[from] fmt::Error),

    #[error("display implementation panicked: {0}")]
    Panicked(String),
}

/// Renders `value` for the human-readable log line.
///
/// - `Null` renders as `null`, strings render without quotes.
/// - Arrays render as `[e1, e2, e3]`, object arrays recursively so nested arrays keep their
///   element formatting.
/// - Maps render as `{k=v, k=v}` in insertion order.
///
/// # Examples
///
/// ```rust
/// use logfields::diagnostics::TracingDiagnostics;
/// use logfields::stringify::to_display_string;
/// use logfields::value::Value;
///
/// let nested = Value::array([Value::from(vec![1, 2]), Value::from(vec![3])]);
/// assert_eq!(to_display_string(&nested, &TracingDiagnostics::DEFAULT), "[[1, 2], [3]]");
/// ```
pub fn to_display_string(value: &Value, diagnostics: &dyn Diagnostics) -> String {
    guarded(value.type_name(), diagnostics, |output| write_value(output, value))
}

/// Renders a whole mapping as `{k=v, k=v}`, with the same failure handling as
/// [`to_display_string`].
pub fn map_to_display_string(map: &Map, diagnostics: &dyn Diagnostics) -> String {
    guarded("Map", diagnostics, |output| write_map(output, map))
}

fn guarded(
    type_name: &str,
    diagnostics: &dyn Diagnostics,
    render: impl FnOnce(&mut String) -> fmt::Result,
) -> String {
    let mut output = String::new();

    let error = match panic::catch_unwind(AssertUnwindSafe(|| render(&mut output))) {
        Ok(Ok(())) => return output,
        Ok(Err(error)) => RenderError::from(error),
        Err(payload) => RenderError::Panicked(panic_message(payload.as_ref())),
    };

    diagnostics.warn(
        ORIGIN,
        &format!("Failed toString() invocation on an object of type [{type_name}]"),
        Some(&error),
    );

    FAILED_TO_STRING.to_owned()
}

fn panic_message(payload: &(dyn core::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

fn write_value(output: &mut String, value: &Value) -> fmt::Result {
    match value {
        Value::Null => output.write_str("null"),
        Value::Bool(value) => write!(output, "{value}"),
        Value::Char(value) => output.write_char(*value),
        Value::I64(value) => write!(output, "{value}"),
        Value::U64(value) => write!(output, "{value}"),
        // `Debug` keeps the fractional part, so `5.0` does not collapse to `5`.
        Value::F32(value) => write!(output, "{value:?}"),
        Value::F64(value) => write!(output, "{value:?}"),
        Value::String(value) => output.write_str(value),
        Value::Array(array) => write_array(output, array),
        Value::Map(map) => write_map(output, map),
        Value::Object(object) => write!(output, "{object}"),
    }
}

fn write_array(output: &mut String, array: &Array) -> fmt::Result {
    fn display<T: fmt::Display>(output: &mut String, element: &T) -> fmt::Result {
        write!(output, "{element}")
    }

    fn debug<T: Debug>(output: &mut String, element: &T) -> fmt::Result {
        write!(output, "{element:?}")
    }

    match array {
        Array::I8(elements) => write_list(output, elements, display),
        Array::I16(elements) => write_list(output, elements, display),
        Array::I32(elements) => write_list(output, elements, display),
        Array::I64(elements) => write_list(output, elements, display),
        Array::U8(elements) => write_list(output, elements, display),
        Array::U16(elements) => write_list(output, elements, display),
        Array::U32(elements) => write_list(output, elements, display),
        Array::U64(elements) => write_list(output, elements, display),
        Array::F32(elements) => write_list(output, elements, debug),
        Array::F64(elements) => write_list(output, elements, debug),
        Array::Char(elements) => write_list(output, elements, display),
        Array::Bool(elements) => write_list(output, elements, display),
        Array::Object(elements) => write_list(output, elements, write_value),
    }
}

fn write_list<T>(
    output: &mut String,
    elements: &[T],
    mut write_element: impl FnMut(&mut String, &T) -> fmt::Result,
) -> fmt::Result {
    output.push('[');
    for (index, element) in elements.iter().enumerate() {
        if index > 0 {
            output.push_str(", ");
        }
        write_element(output, element)?;
    }
    output.push(']');
    Ok(())
}

fn write_map(output: &mut String, map: &Map) -> fmt::Result {
    output.push('{');
    for (index, (key, value)) in map.iter().enumerate() {
        if index > 0 {
            output.push_str(", ");
        }
        output.push_str(key);
        output.push('=');
        write_value(output, value)?;
    }
    output.push('}');
    Ok(())
}

#[cfg(test)]
mod tests {
    use core::fmt;

    use test_case::test_case;

    use super::{FAILED_TO_STRING, to_display_string};
    use crate::diagnostics::tests::Recording;
    use crate::value::{Map, Value};

    #[derive(Debug)]
    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[derive(Debug)]
    struct Exploding;

    impl fmt::Display for Exploding {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            panic!("kaboom")
        }
    }

    #[derive(Debug)]
    struct Point(i32, i32);

    impl fmt::Display for Point {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "({}, {})", self.0, self.1)
        }
    }

    fn render(value: Value) -> String {
        let diagnostics = Recording::default();
        let rendered = to_display_string(&value, &diagnostics);
        assert!(diagnostics.take().is_empty());
        rendered
    }

    #[test_case(Value::Null => "null"; "null")]
    #[test_case(Value::from(true) => "true"; "boolean")]
    #[test_case(Value::from('c') => "c"; "character")]
    #[test_case(Value::from(-5_i8) => "-5"; "signed")]
    #[test_case(Value::from(5.0) => "5.0"; "double")]
    #[test_case(Value::from(0.1_f32) => "0.1"; "float")]
    #[test_case(Value::from("plain") => "plain"; "string")]
    #[test_case(Value::object(Point(1, 2)) => "(1, 2)"; "object")]
    fn scalars(value: Value) -> String {
        render(value)
    }

    #[test_case(Value::from(vec![1, 2, 3]) => "[1, 2, 3]"; "int array")]
    #[test_case(Value::from(vec![-1_i8, 2]) => "[-1, 2]"; "byte array")]
    #[test_case(Value::from(vec![1_i64, 2]) => "[1, 2]"; "long array")]
    #[test_case(Value::from(vec![1.0_f64, 2.5]) => "[1.0, 2.5]"; "double array")]
    #[test_case(Value::from(vec![1.5_f32]) => "[1.5]"; "float array")]
    #[test_case(Value::from(vec!['a', 'b']) => "[a, b]"; "char array")]
    #[test_case(Value::from(vec![true, false]) => "[true, false]"; "boolean array")]
    #[test_case(Value::from(Vec::<i32>::new()) => "[]"; "empty array")]
    #[test_case(Value::array([Value::from(1), Value::from("x")]) => "[1, x]"; "object array")]
    #[test_case(
        Value::array([Value::from(vec![1, 2]), Value::from(vec![3])]) => "[[1, 2], [3]]";
        "nested arrays"
    )]
    #[test_case(
        Value::array([Value::Null, Value::array([Value::from(vec!['x'])])]) => "[null, [[x]]]";
        "deeply nested"
    )]
    fn arrays(value: Value) -> String {
        render(value)
    }

    #[test]
    fn maps_render_in_insertion_order() {
        let map: Map = [("b", Value::from(2)), ("a", Value::from(vec![1, 2]))]
            .into_iter()
            .collect();
        assert_eq!(render(Value::Map(map)), "{b=2, a=[1, 2]}");
    }

    #[test]
    fn failing_display_is_replaced() {
        let diagnostics = Recording::default();

        let rendered = to_display_string(&Value::object(Broken), &diagnostics);

        assert_eq!(rendered, FAILED_TO_STRING);
        let entries = diagnostics.take();
        assert_eq!(entries.len(), 1);
        let (origin, message, cause) = &entries[0];
        assert_eq!(*origin, "logfields::stringify");
        assert!(message.contains("Broken"), "{message}");
        assert_eq!(
            cause.as_deref(),
            Some("display implementation returned an error")
        );
    }

    #[test]
    fn panicking_display_is_replaced() {
        let diagnostics = Recording::default();

        let rendered = to_display_string(&Value::object(Exploding), &diagnostics);

        assert_eq!(rendered, FAILED_TO_STRING);
        let entries = diagnostics.take();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].2.as_deref(),
            Some("display implementation panicked: kaboom")
        );
    }

    #[test]
    fn failure_inside_array_fails_whole_value() {
        let diagnostics = Recording::default();
        let value = Value::array([Value::from(1), Value::object(Broken)]);

        assert_eq!(to_display_string(&value, &diagnostics), FAILED_TO_STRING);
        assert_eq!(diagnostics.take().len(), 1);
    }
}
