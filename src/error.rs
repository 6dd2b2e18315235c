//! # Errors
//!
//! Closed error sets for every layer of the crate. Callers match on variants
//! rather than comparing error identity.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Why a trust source yielded no usable certificates
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid certificate")]
    InvalidCertificate,
}

/// Failures while preparing or probing an authenticated client
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("logger cannot be null")]
    NullLogger,

    #[error("empty token is invalid")]
    EmptyToken,

    #[error("invalid host url {host}: {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("failed to load certificates from {}", location.display())]
    FailedToLoadCertificates {
        location: PathBuf,
        #[source]
        source: CertificateError,
    },

    #[error("failed to build http transport")]
    Transport(#[source] reqwest::Error),

    #[error("failed to connect to server")]
    ConnectionFailed(#[source] ApiError),
}

/// Failures reported by the Drone API or the transport underneath it
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed")]
    Request(#[from] reqwest::Error),

    /// Non-success status; `message` is the server's error text
    #[error("client error {}: {message}", status.as_u16())]
    Status { status: StatusCode, message: String },
}

impl ApiError {
    /// Text the server attached to the failure; `None` for transport errors
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => Some(message.as_str()),
            ApiError::Request(_) => None,
        }
    }

    /// Text the server attached to the failure, or the transport error text
    pub fn message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Request(e) => e.to_string(),
        }
    }

    /// HTTP status if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status(),
        }
    }
}

/// Failures of the secret reconciliation operations
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("input cannot be empty: {field}")]
    EmptyInput { field: &'static str },

    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error("failed to create secret {name}")]
    Create {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to overwrite secret {name}")]
    Update {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to delete secret {name}")]
    Delete {
        name: String,
        #[source]
        source: ApiError,
    },
}

/// Failures while discovering local secret files
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("secrets directory does not exist: {}", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("did not find secret file of form \"secret_name.secret\" in {}", path.display())]
    NoSecrets { path: PathBuf },

    #[error("failed to read secret file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list {}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
