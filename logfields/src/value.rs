//! Values carried by log-call arguments.
//!
//! A log call can carry anything, so values are modelled as a closed [`Value`] enum.
//! Arrays keep their exact element type in [`Array`] so they can be rendered the way
//! their element type dictates, and arbitrary caller types are carried as
//! [`Value::Object`].
//!
//! # Examples
//!
//! ```rust
//! use logfields::value::{Array, Map, Value};
//!
//! let user_id = Value::from(123);
//! let username = Value::from("alice");
//! let scores = Value::from(vec![1, 2, 3]);
//! let nested = Value::array([Value::from(vec![1, 2]), Value::from(vec![3])]);
//! let labels: Map = [("team", "core"), ("zone", "eu")].into_iter().collect();
//!
//! assert!(matches!(scores, Value::Array(Array::I32(_))));
//! assert_eq!(labels.len(), 2);
//! ```

use core::fmt::{self, Debug, Display};
use std::borrow::Cow;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::stringify;

/// A caller-supplied value that is rendered through its [`Display`] implementation.
///
/// This is implemented for every `Display + Debug + Send + Sync` type, there is no need to
/// implement it manually.
pub trait Object: Display + Debug + Send + Sync + 'static {
    /// Name of the concrete type, used in diagnostics.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl<T> Object for T where T: Display + Debug + Send + Sync + 'static {}

/// A single log-call value.
#[derive(Clone, Debug)]
pub enum Value {
    /// The absent value, rendered as `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A single character.
    Char(char),
    /// A signed integer of any width.
    I64(i64),
    /// An unsigned integer of any width.
    U64(u64),
    /// A 32-bit float, kept apart from [`Value::F64`] so it renders with its own precision.
    F32(f32),
    /// A 64-bit float.
    F64(f64),
    /// Text.
    String(String),
    /// An array, dispatched by element type.
    Array(Array),
    /// A key to value mapping.
    Map(Map),
    /// Any other caller type.
    Object(Arc<dyn Object>),
}

impl Value {
    /// Wraps a caller type whose [`Display`] output is its text rendering.
    pub fn object<T>(object: T) -> Self
    where
        T: Object,
    {
        Value::Object(Arc::new(object))
    }

    /// Builds an object array, each element rendered through the same dispatch as a
    /// top-level value.
    pub fn array<I>(elements: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::Array(Array::Object(elements.into_iter().map(Into::into).collect()))
    }

    /// Name of the value's type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "String",
            Value::Array(array) => array.type_name(),
            Value::Map(_) => "Map",
            // Through the `Arc`, which is itself an `Object`.
            Value::Object(object) => (**object).type_name(),
        }
    }

    /// This value with every [`Value::Object`], including nested ones, replaced by its guarded
    /// text form, reporting failures to `diagnostics`.
    ///
    /// Borrows when there is nothing to replace.
    pub(crate) fn with_objects_rendered(&self, diagnostics: &dyn Diagnostics) -> Cow<'_, Value> {
        if self.has_objects() {
            Cow::Owned(self.render_objects(diagnostics))
        } else {
            Cow::Borrowed(self)
        }
    }

    fn has_objects(&self) -> bool {
        match self {
            Value::Object(_) => true,
            Value::Array(Array::Object(elements)) => elements.iter().any(Value::has_objects),
            Value::Map(map) => map.entries.values().any(Value::has_objects),
            _ => false,
        }
    }

    fn render_objects(&self, diagnostics: &dyn Diagnostics) -> Value {
        match self {
            Value::Object(_) => Value::String(stringify::to_display_string(self, diagnostics)),
            Value::Array(Array::Object(elements)) => Value::Array(Array::Object(
                elements
                    .iter()
                    .map(|element| element.render_objects(diagnostics))
                    .collect(),
            )),
            Value::Map(map) => Value::Map(Map {
                entries: map
                    .entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.render_objects(diagnostics)))
                    .collect(),
            }),
            other => other.clone(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Caller objects have no equality of their own, only identity.
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// An array of values, tagged with its exact element type.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Array {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Char(Vec<char>),
    Bool(Vec<bool>),
    /// Elements of any type; nested arrays inside are rendered recursively.
    Object(Vec<Value>),
}

impl Array {
    fn type_name(&self) -> &'static str {
        match self {
            Array::I8(_) => "[i8]",
            Array::I16(_) => "[i16]",
            Array::I32(_) => "[i32]",
            Array::I64(_) => "[i64]",
            Array::U8(_) => "[u8]",
            Array::U16(_) => "[u16]",
            Array::U32(_) => "[u32]",
            Array::U64(_) => "[u64]",
            Array::F32(_) => "[f32]",
            Array::F64(_) => "[f64]",
            Array::Char(_) => "[char]",
            Array::Bool(_) => "[bool]",
            Array::Object(_) => "[Value]",
        }
    }
}

/// An insertion-ordered mapping from field names to values.
///
/// Keys are converted to their string form on insertion, an absent key becomes `"null"`.
/// Equality is structural and ignores order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Map {
    entries: IndexMap<String, Value>,
}

impl Map {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing the value of an existing key in place.
    ///
    /// A key whose text form fails is reported to [`TracingDiagnostics`], use
    /// [`Map::insert_reporting`] to choose the channel.
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        self.insert_reporting(key, value, &TracingDiagnostics::DEFAULT);
    }

    /// Inserts an entry, reporting a key whose text form fails to `diagnostics`.
    pub fn insert_reporting<K, V>(&mut self, key: K, value: V, diagnostics: &dyn Diagnostics)
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        let key = stringify::to_display_string(&key.into(), diagnostics);
        self.entries.insert(key, value.into());
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Map
where
    K: Into<Value>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Char(value) => serializer.serialize_char(*value),
            Value::I64(value) => serializer.serialize_i64(*value),
            Value::U64(value) => serializer.serialize_u64(*value),
            Value::F32(value) => serializer.serialize_f32(*value),
            Value::F64(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(array) => array.serialize(serializer),
            Value::Map(map) => map.serialize(serializer),
            // Objects are opaque here; their document form is their guarded text form. The
            // assembler renders them beforehand with its own channel.
            Value::Object(_) => serializer.serialize_str(&stringify::to_display_string(
                self,
                &TracingDiagnostics::DEFAULT,
            )),
        }
    }
}

impl Serialize for Array {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        fn seq<S, T>(serializer: S, elements: &[T]) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
            T: Serialize,
        {
            let mut seq = serializer.serialize_seq(Some(elements.len()))?;
            for element in elements {
                seq.serialize_element(element)?;
            }
            seq.end()
        }

        match self {
            Array::I8(elements) => seq(serializer, elements),
            Array::I16(elements) => seq(serializer, elements),
            Array::I32(elements) => seq(serializer, elements),
            Array::I64(elements) => seq(serializer, elements),
            Array::U8(elements) => seq(serializer, elements),
            Array::U16(elements) => seq(serializer, elements),
            Array::U32(elements) => seq(serializer, elements),
            Array::U64(elements) => seq(serializer, elements),
            Array::F32(elements) => seq(serializer, elements),
            Array::F64(elements) => seq(serializer, elements),
            Array::Char(elements) => seq(serializer, elements),
            Array::Bool(elements) => seq(serializer, elements),
            Array::Object(elements) => seq(serializer, elements),
        }
    }
}

impl Serialize for Map {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify::to_display_string(
            self,
            &TracingDiagnostics::DEFAULT,
        ))
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(Array::Object(value))
    }
}

macro_rules! impl_from_integer {
    ($variant:ident as $wide:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(<$wide>::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(I64 as i64: i8, i16, i32, i64);
impl_from_integer!(U64 as u64: u8, u16, u32, u64);

macro_rules! impl_from_array {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for Value {
                fn from(value: Vec<$ty>) -> Self {
                    Value::Array(Array::$variant(value))
                }
            }

            impl From<&[$ty]> for Value {
                fn from(value: &[$ty]) -> Self {
                    Value::Array(Array::$variant(value.to_vec()))
                }
            }

            impl<const N: usize> From<[$ty; N]> for Value {
                fn from(value: [$ty; N]) -> Self {
                    Value::Array(Array::$variant(value.to_vec()))
                }
            }
        )*
    };
}

impl_from_array!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    bool => Bool,
);
