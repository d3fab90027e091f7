//! Captures `tracing` events emitted while a closure runs.

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push((field.name().to_owned(), format!("{:?}", value)));
        }
    }
}

#[derive(Clone, Default)]
struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Runs `f` with a capturing subscriber and returns its warnings
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<CapturedEvent>) {
    let capture = LogCapture::default();
    let subscriber = Registry::default().with(capture.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    let warnings = capture
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.level == Level::WARN)
        .cloned()
        .collect();
    (out, warnings)
}
