//! # Configuration
//!
//! Connection settings, read from flags or the Drone plugin environment.

use std::fmt;
use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args};

use crate::client::BuilderFlags;
use crate::logging::Verbosity;

/// Where to sync to and how to authenticate
#[derive(Clone, Args)]
pub struct SyncConfig {
    /// Scheme of the Drone server
    #[arg(long, env = "DRONE_SYSTEM_PROTO", default_value = "https", global = true)]
    pub proto: String,

    /// Host (and optional port) of the Drone server
    #[arg(long, env = "DRONE_SYSTEM_HOST", default_value = "", global = true)]
    pub host: String,

    /// Owner of the target repository
    #[arg(long, env = "DRONE_REPO_OWNER", default_value = "", global = true)]
    pub owner: String,

    /// Name of the target repository
    #[arg(long, env = "DRONE_REPO_NAME", default_value = "", global = true)]
    pub repo: String,

    /// Drone API token
    #[arg(
        long,
        env = "DRONE_TOKEN",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true,
        global = true
    )]
    pub token: String,

    /// CA certificate file, or directory of certificates, replacing the built-in roots
    #[arg(long = "certs", env = "DRONE_CA_CERTS", global = true)]
    pub certs_location: Option<PathBuf>,

    /// Ignore invalid certificates
    #[arg(long, env = "INSECURE", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new(), global = true)]
    pub insecure: bool,

    /// Debug log
    #[arg(long, env = "DEBUG", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new(), global = true)]
    pub debug: bool,

    /// Warnings and errors only
    #[arg(long, env = "QUIET", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new(), global = true)]
    pub quiet: bool,
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("proto", &self.proto)
            .field("host", &self.host)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("certs_location", &self.certs_location)
            .field("insecure", &self.insecure)
            .finish_non_exhaustive()
    }
}

impl SyncConfig {
    /// `proto://host`, or an empty string when no host is configured
    pub fn host_url(&self) -> String {
        if self.host.is_empty() {
            return String::new();
        }
        format!("{}://{}", self.proto, self.host)
    }

    /// Debug wins over quiet
    pub fn verbosity(&self) -> Verbosity {
        if self.debug {
            Verbosity::Debug
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    pub fn builder_flags(&self) -> BuilderFlags {
        BuilderFlags {
            insecure: self.insecure,
        }
    }

    /// Certificate location as the builder expects it; empty means built-in roots
    pub fn certs_location(&self) -> PathBuf {
        self.certs_location.clone().unwrap_or_default()
    }
}
