//! # Constants
//!
//! Shared constants used throughout the crate.

/// Path segments of the Drone identity endpoint, used only as a probe
pub const USER_PATH: [&str; 2] = ["api", "user"];

/// Path segments prefixing every repository-scoped Drone endpoint
pub const REPOS_PATH: [&str; 2] = ["api", "repos"];

/// Path segment of the per-repository secret collection
pub const SECRETS_SEGMENT: &str = "secrets";

/// Connect timeout for the Drone transport (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Whole-request timeout for the Drone transport (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("dronesec/", env!("CARGO_PKG_VERSION"));

/// File extension that marks a secret file during discovery
pub const SECRET_FILE_EXTENSION: &str = "secret";

/// Header prepended to every certificate loading failure in the logs
pub const CERT_LOAD_ERROR_HEADER: &str = "Error loading certificates";

/// Tracing target for this crate's events
pub const LOG_TARGET: &str = "dronesec";
