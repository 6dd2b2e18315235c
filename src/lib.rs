//! # dronesec
//!
//! Pushes secrets into a Drone CI repository's secret store.
//!
//! [`client::ClientBuilder`] turns a CA location and insecure flag into a
//! trust policy and hands out bearer-authenticated clients that have already
//! passed an identity probe. [`reconciler::SecretReconciler`] binds such a
//! client to one repository and offers create-or-overwrite and idempotent
//! delete.

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod reconciler;
pub mod secret_files;

pub use client::{BuilderFlags, ClientBuilder, DroneClient, RepositoryTarget, Secret, SecretApi};
pub use error::{ApiError, BuilderError, ReconcileError};
pub use logging::{Logger, NullLogger, TracingLogger};
pub use reconciler::SecretReconciler;
