use core::fmt;
use std::io::Write;

use super::DocumentSink;
use crate::error::Error;
use crate::value::Value;

/// Streams one JSON object into a writer.
///
/// Repeated field names are written as they come, the output then contains duplicate keys.
///
/// # Examples
///
/// ```rust
/// use logfields::sink::{DocumentSink, JsonWriter};
/// use logfields::value::Value;
///
/// # fn main() -> Result<(), logfields::Error> {
/// let mut sink = JsonWriter::begin(Vec::new())?;
/// sink.write_object_field("user", &Value::from("alice"))?;
/// sink.write_field_name("extra")?;
/// sink.write_raw_value(r#"{"a":1}"#)?;
/// let output = sink.finish()?;
///
/// assert_eq!(output, br#"{"user":"alice","extra":{"a":1}}"#);
/// # Ok(())
/// # }
/// ```
pub struct JsonWriter<W> {
    writer: W,
    fields: usize,
    pending: Option<String>,
}

impl<W> JsonWriter<W>
where
    W: Write,
{
    /// Opens the object.
    pub fn begin(mut writer: W) -> Result<Self, Error> {
        writer.write_all(b"{")?;
        Ok(Self {
            writer,
            fields: 0,
            pending: None,
        })
    }

    /// Closes the object and returns the writer.
    pub fn finish(mut self) -> Result<W, Error> {
        if let Some(name) = self.pending.take() {
            return Err(Error::DanglingFieldName(name));
        }
        self.writer.write_all(b"}")?;
        Ok(self.writer)
    }

    fn take_pending(&mut self) -> Result<String, Error> {
        self.pending.take().ok_or(Error::MissingFieldName)
    }
}

impl<W> DocumentSink for JsonWriter<W>
where
    W: Write,
{
    fn write_field_name(&mut self, name: &str) -> Result<(), Error> {
        if let Some(pending) = self.pending.take() {
            return Err(Error::DanglingFieldName(pending));
        }

        if self.fields > 0 {
            self.writer.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.writer, name)?;
        self.writer.write_all(b":")?;

        self.fields += 1;
        self.pending = Some(name.to_owned());
        Ok(())
    }

    fn write_object(&mut self, value: &Value) -> Result<(), Error> {
        self.take_pending()?;
        serde_json::to_writer(&mut self.writer, value)?;
        Ok(())
    }

    fn write_raw_value(&mut self, json: &str) -> Result<(), Error> {
        self.take_pending()?;
        self.writer.write_all(json.as_bytes())?;
        Ok(())
    }
}

impl<W> fmt::Debug for JsonWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonWriter")
            .field("fields", &self.fields)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
