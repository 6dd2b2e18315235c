//! Common test utilities
//!
//! rustls crypto provider setup and a logger that records what it was told.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::{Arc, Mutex, Once};

use dronesec::Logger;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// Must run before any client is built. Uses a `Once` so parallel tests
/// share one installation.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
    });
}

/// Mock server base URL without the trailing slash pact adds
pub fn base_url(url: &impl ToString) -> String {
    let mut base_url = url.to_string();
    if base_url.ends_with('/') {
        base_url.pop();
    }
    base_url
}

/// Logger that keeps every message per level
#[derive(Default)]
pub struct RecordingLogger {
    debug: Mutex<Vec<String>>,
    info: Mutex<Vec<String>>,
    warning: Mutex<Vec<String>>,
    error: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn debugs(&self) -> Vec<String> {
        self.debug.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.info.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warning.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.error.lock().unwrap().clone()
    }

    pub fn has_debug(&self, needle: &str) -> bool {
        self.debugs().iter().any(|m| m.contains(needle))
    }

    pub fn has_info(&self, needle: &str) -> bool {
        self.infos().iter().any(|m| m.contains(needle))
    }

    pub fn has_warning(&self, needle: &str) -> bool {
        self.warnings().iter().any(|m| m.contains(needle))
    }

    pub fn has_error(&self, needle: &str) -> bool {
        self.errors().iter().any(|m| m.contains(needle))
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.debug.lock().unwrap().push(message.to_string());
    }

    fn info(&self, message: &str) {
        self.info.lock().unwrap().push(message.to_string());
    }

    fn warning(&self, message: &str) {
        self.warning.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.error.lock().unwrap().push(message.to_string());
    }
}
