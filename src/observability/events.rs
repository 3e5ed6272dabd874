//! Lifecycle events
//!
//! Events are explicit and typed; the string form is what appears in the
//! `event` field of a log line.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration file loaded and validated
    ConfigLoaded,
    /// Connection pool established
    DatabaseConnected,
    /// Pending migrations applied
    MigrationsApplied,
    /// Migrations reverted
    MigrationsReverted,
    /// HTTP listener bound, ready for requests
    Serving,
    /// Shutdown signal received
    ShutdownStart,
    /// Listener stopped and pool closed
    ShutdownComplete,
    /// One HTTP request handled
    HttpRequest,
    /// Request failed with a server-side error
    HttpServerError,
    /// Startup could not complete (FATAL)
    BootFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DatabaseConnected => "DATABASE_CONNECTED",
            Event::MigrationsApplied => "MIGRATIONS_APPLIED",
            Event::MigrationsReverted => "MIGRATIONS_REVERTED",
            Event::Serving => "SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::HttpRequest => "HTTP_REQUEST",
            Event::HttpServerError => "HTTP_SERVER_ERROR",
            Event::BootFailed => "BOOT_FAILED",
        }
    }

    /// FATAL events end the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::BootFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
