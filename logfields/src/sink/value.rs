use super::DocumentSink;
use crate::error::Error;
use crate::value::Value;

/// Collects fields into an in-memory JSON object.
///
/// Fields keep their first-write position. A repeated name replaces the earlier value, so
/// the last write wins.
///
/// # Examples
///
/// ```rust
/// use logfields::sink::{DocumentSink, ValueSink};
/// use logfields::value::Value;
///
/// # fn main() -> Result<(), logfields::Error> {
/// let mut sink = ValueSink::new();
/// sink.write_object_field("k", &Value::from(5))?;
/// sink.write_object_field("k", &Value::from(6))?;
///
/// assert_eq!(sink.into_value()?, serde_json::json!({ "k": 6 }));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ValueSink {
    fields: serde_json::Map<String, serde_json::Value>,
    pending: Option<String>,
}

impl ValueSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected object.
    pub fn into_value(self) -> Result<serde_json::Value, Error> {
        if let Some(name) = self.pending {
            return Err(Error::DanglingFieldName(name));
        }
        Ok(serde_json::Value::Object(self.fields))
    }

    fn insert(&mut self, value: serde_json::Value) -> Result<(), Error> {
        let name = self.pending.take().ok_or(Error::MissingFieldName)?;
        self.fields.insert(name, value);
        Ok(())
    }
}

impl DocumentSink for ValueSink {
    fn write_field_name(&mut self, name: &str) -> Result<(), Error> {
        if let Some(pending) = self.pending.replace(name.to_owned()) {
            return Err(Error::DanglingFieldName(pending));
        }
        Ok(())
    }

    fn write_object(&mut self, value: &Value) -> Result<(), Error> {
        let value = serde_json::to_value(value)?;
        self.insert(value)
    }

    fn write_raw_value(&mut self, json: &str) -> Result<(), Error> {
        let value = serde_json::from_str(json)?;
        self.insert(value)
    }
}
