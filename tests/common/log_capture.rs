//! Tracing capture for log assertions.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;

/// Collects events emitted on the current thread until dropped.
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    _guard: tracing::subscriber::DefaultGuard,
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: tracing::Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogCapture {
    /// Install a thread-local subscriber that records every event.
    pub fn start() -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let layer = CaptureLayer {
            events: events.clone(),
        };
        let subscriber = tracing_subscriber::registry().with(layer);
        let guard = tracing::subscriber::set_default(subscriber);
        Self {
            events,
            _guard: guard,
        }
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Assert an event at `level` whose message contains `needle`.
    pub fn assert_logged(&self, level: tracing::Level, needle: &str) {
        let events = self.events();
        assert!(
            events
                .iter()
                .any(|e| e.level == level && e.message.contains(needle)),
            "Expected {level} event containing '{needle}'. Captured: {:#?}",
            events.iter().map(|e| (&e.level, &e.message)).collect::<Vec<_>>()
        );
    }

    /// Assert an event whose message contains `needle` and carries `field=value`.
    pub fn assert_field(&self, needle: &str, field: &str, value: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.message.contains(needle)
                && e.fields.iter().any(|(k, v)| k == field && v == value)),
            "Expected '{needle}' with {field}={value}. Captured: {events:#?}"
        );
    }

    /// Assert no pfmp event contains `needle` in its message or fields.
    pub fn assert_not_mentioned(&self, needle: &str) {
        let events = self.events();
        for event in events.iter().filter(|e| e.target.starts_with("pfmp")) {
            assert!(
                !event.message.contains(needle)
                    && !event.fields.iter().any(|(_, v)| v.contains(needle)),
                "'{needle}' leaked into logs: {event:#?}"
            );
        }
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn push(&mut self, name: &str, value: String) {
        if name == "message" {
            self.message = value;
        } else {
            self.fields.push((name.to_string(), value));
        }
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.push(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.push(field.name(), value.to_string());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.push(field.name(), value.to_string());
    }
}
