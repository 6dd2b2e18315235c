//! # Logging
//!
//! The [`Logger`] capability handed to the client builder and the reconciler,
//! plus tracing subscriber setup for the binary.
//!
//! Trust decisions are logged through this trait rather than straight into
//! `tracing` so embedders can capture or silence them per reconciler.

use tracing_subscriber::EnvFilter;

use crate::constants::LOG_TARGET;

/// Leveled sink for operational messages
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards every message to `tracing` at the matching level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: LOG_TARGET, "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(target: LOG_TARGET, "{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!(target: LOG_TARGET, "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: LOG_TARGET, "{message}");
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Output verbosity selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only
    Quiet,
    #[default]
    Normal,
    Debug,
}

impl Verbosity {
    /// Filter directive for this crate's events
    pub fn directive(self) -> String {
        let level = match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Debug => "debug",
        };
        format!("{LOG_TARGET}={level}")
    }
}

/// Install the global fmt subscriber
///
/// `RUST_LOG` wins over `verbosity` when it is set.
pub fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
