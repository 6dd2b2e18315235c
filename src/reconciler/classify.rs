//! # Remote Error Classification
//!
//! Drone reports "already exists" and "not found" only as free text coming
//! from its storage layer, so both are recognised by substring.
//!
//! This couples the reconciler to the server's exact wording. A message that
//! matches nothing below is treated as a genuine failure.

use crate::error::ApiError;

/// Meaning recovered from a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// A secret with this name is already stored for the repository
    AlreadyExists,
    /// No secret with this name is stored for the repository
    NotFound,
}

/// Known message fragments, checked in order
pub const ERROR_PATTERNS: &[(&str, RemoteErrorKind)] = &[
    // sqlite
    ("UNIQUE constraint failed", RemoteErrorKind::AlreadyExists),
    // postgres
    ("duplicate key value violates unique constraint", RemoteErrorKind::AlreadyExists),
    // mysql
    ("Duplicate entry", RemoteErrorKind::AlreadyExists),
    // database/sql lookup miss, returned by every driver
    ("no rows in result set", RemoteErrorKind::NotFound),
    ("not found", RemoteErrorKind::NotFound),
];

/// Classify a server message, `None` when no pattern matches
pub fn classify_message(message: &str) -> Option<RemoteErrorKind> {
    ERROR_PATTERNS
        .iter()
        .find(|(pattern, _)| message.contains(pattern))
        .map(|(_, kind)| *kind)
}

/// Classify the server text carried by an API error
///
/// Transport failures never reached the server and are never classified.
pub fn classify(error: &ApiError) -> Option<RemoteErrorKind> {
    error.server_message().and_then(classify_message)
}
