#![expect(missing_docs, reason = "tests")]

use std::fmt;
use std::sync::Arc;

use indoc::indoc;
use logfields::assembler::{ArgumentAssembler, LogEvent, Settings};
use logfields::diagnostics::Diagnostics;
use logfields::render::Renderer;
use logfields::sink::JsonWriter;
use logfields::structured::{entries, key_value, key_value_with_pattern, raw, value};
use logfields::stringify::FAILED_TO_STRING;
use logfields::value::Value;
use logfields::{Marker, arguments, map};
use pretty_assertions::assert_eq;

fn include_all() -> ArgumentAssembler {
    ArgumentAssembler::new(Settings {
        include_structured_arguments: true,
        include_non_structured_arguments: true,
        include_context_properties: true,
        ..Settings::default()
    })
}

fn pretty(assembler: &ArgumentAssembler, event: &LogEvent) -> String {
    serde_json::to_string_pretty(&assembler.to_json(event).unwrap()).unwrap()
}

#[test]
fn structured_and_positional_arguments() {
    let event = LogEvent::new(1_700_000_000_123, "payment accepted")
        .with_context_properties([("request_id", "r-42")])
        .with_arguments(arguments![
            key_value("x", 1),
            "plainArg",
            entries(map!("currency" = "EUR", "amount" = 12.5)),
            vec![1_i32, 2, 3],
        ]);

    assert_eq!(
        pretty(&include_all(), &event),
        indoc! {r#"
            {
              "@timestamp": "2023-11-14T22:13:20.123Z",
              "message": "payment accepted",
              "request_id": "r-42",
              "x": 1,
              "arg1": "plainArg",
              "currency": "EUR",
              "amount": 12.5,
              "arg3": [
                1,
                2,
                3
              ]
            }"#}
    );
}

#[test]
fn streaming_writer_keeps_duplicate_fields() {
    let event = LogEvent::new(0, "original")
        .with_arguments(arguments![value("message", "override"), raw("extra", "[1,2]")]);

    let mut sink = JsonWriter::begin(Vec::new()).unwrap();
    include_all().serialize(&event, &mut sink).unwrap();
    let json = String::from_utf8(sink.finish().unwrap()).unwrap();

    assert_eq!(
        json,
        concat!(
            r#"{"@timestamp":"1970-01-01T00:00:00.000Z","#,
            r#""message":"original","message":"override","extra":[1,2]}"#,
        )
    );
}

#[derive(Debug)]
struct Unprintable;

impl fmt::Display for Unprintable {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

#[derive(Debug, Default)]
struct Counting(std::sync::atomic::AtomicUsize);

impl Diagnostics for Counting {
    fn warn(&self, _: &'static str, _: &str, _: Option<&(dyn std::error::Error + 'static)>) {
        self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }
}

#[test]
fn misbehaving_argument_degrades_only_its_own_field() {
    let diagnostics = Arc::new(Counting::default());
    let mut renderer = Renderer::with_diagnostics(diagnostics.clone());

    let event = LogEvent::formatted(
        0,
        "object {} next to {}",
        arguments![key_value("broken", Value::object(Unprintable)), value("ok", 7)],
        &mut renderer,
    );

    assert_eq!(
        event.message,
        format!("object broken={FAILED_TO_STRING} next to 7")
    );
    assert_eq!(diagnostics.0.load(std::sync::atomic::Ordering::Relaxed), 1);

    let assembler = ArgumentAssembler::with_diagnostics(
        Settings {
            include_structured_arguments: true,
            ..Settings::default()
        },
        diagnostics.clone(),
    );
    let document = assembler.to_json(&event).unwrap();
    assert_eq!(document["broken"], FAILED_TO_STRING);
    assert_eq!(document["ok"], 7);
    assert_eq!(diagnostics.0.load(std::sync::atomic::Ordering::Relaxed), 2);
}

#[test]
fn shared_markers_with_per_worker_renderers() {
    let audit = Arc::new(Marker::new("AUDIT"));
    let field = Arc::new(key_value_with_pattern("worker", 0, "{0}#{1}").unwrap());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let audit = audit.clone();
            let field = field.clone();
            std::thread::spawn(move || {
                let mut renderer = Renderer::new();
                let child = Arc::new(Marker::new(format!("WORKER-{worker}")));
                audit.add(child.clone());

                let event = LogEvent::formatted(
                    i64::from(worker),
                    "{} {}",
                    arguments![field, audit.clone()],
                    &mut renderer,
                );
                assert!(event.message.starts_with("worker#0 AUDIT ["));
                assert_eq!(renderer.patterns().len(), 1);
                assert!(audit.contains(&child));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(audit.references().len(), 4);
}
