//! Observability
//!
//! - Structured logging (JSON, one line per event)
//! - Typed lifecycle events
//! - Scope-based begin/complete logging for CLI steps
//!
//! # Usage
//!
//! ```ignore
//! use userbase::observability::{log_event_with_fields, Event, Logger, ObservationScope};
//!
//! Logger::info("USER_IMPORT", &[("rows", "42")]);
//! log_event_with_fields(Event::Serving, &[("addr", "0.0.0.0:8000")]);
//!
//! let scope = ObservationScope::new("MIGRATE");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
