//! # `logfields`
//!
//! Structured log-argument serialization: turns the arguments of a log call into named fields
//! of a structured document and into the text of the human-readable log line.
//!
//! ## Features
//!
//! - **Structured arguments**: single fields, pre-encoded JSON fields and whole mappings that
//!   write themselves into the document and render themselves into text
//! - **Markers**: named attachments forming a shared, lock-free reference graph
//! - **Total rendering**: a value whose display conversion fails degrades to a placeholder
//!   and a diagnostic, never to a failed log call
//! - **Sinks**: streaming JSON output or an in-memory [`serde_json::Value`]
//!
//! ## Basic Usage
//!
//! Build the arguments of a log call:
//!
//! ```rust
//! use logfields::arguments;
//! use logfields::structured::{key_value, value};
//!
//! let args = arguments![value("user", "alice"), key_value("port", 8080), "plain"];
//! ```
//!
//! Then render the message and assemble the document:
//!
//! ```rust
//! use logfields::arguments;
//! use logfields::assembler::{ArgumentAssembler, LogEvent, Settings};
//! use logfields::render::Renderer;
//! use logfields::sink::JsonWriter;
//! use logfields::structured::{key_value, value};
//!
//! # fn main() -> Result<(), logfields::Error> {
//! // One renderer per worker, it caches compiled patterns.
//! let mut renderer = Renderer::new();
//!
//! let event = LogEvent::formatted(
//!     0,
//!     "login by {} on {}",
//!     arguments![value("user", "alice"), key_value("port", 8080)],
//!     &mut renderer,
//! );
//! assert_eq!(event.message, "login by alice on port=8080");
//!
//! let assembler = ArgumentAssembler::new(Settings {
//!     include_structured_arguments: true,
//!     ..Settings::default()
//! });
//! let mut sink = JsonWriter::begin(Vec::new())?;
//! assembler.serialize(&event, &mut sink)?;
//! let json = String::from_utf8(sink.finish()?).unwrap();
//!
//! assert_eq!(
//!     json,
//!     r#"{"@timestamp":"1970-01-01T00:00:00.000Z","message":"login by alice on port=8080","user":"alice","port":8080}"#
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Markers
//!
//! Markers are identified by name and can reference each other:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use logfields::marker::Marker;
//!
//! let audit = Arc::new(Marker::new("AUDIT"));
//! let login = Arc::new(Marker::new("LOGIN"));
//! login.add(audit.clone());
//!
//! // Would close a two-marker cycle, ignored.
//! audit.add(login.clone());
//!
//! assert!(login.contains_name("AUDIT"));
//! assert!(!audit.has_references());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod argument;
pub mod assembler;
pub mod diagnostics;
mod error;
pub mod field;
mod macros;
pub mod marker;
pub mod message;
pub mod pattern;
pub mod render;
pub mod sink;
pub mod stringify;
pub mod structured;
pub mod value;

pub use argument::Argument;
pub use assembler::{ArgumentAssembler, LogEvent, Settings};
pub use error::Error;
pub use marker::Marker;
