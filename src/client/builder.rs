//! # Client Builder
//!
//! Prepares the TLS trust policy once and hands out probed [`DroneClient`]s.
//!
//! Trust policy:
//! - no certificate location: built-in roots
//! - certificate location: exactly the loaded bundle, built-in roots dropped
//! - insecure flag: chain verification disabled, whatever the roots are

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use super::{DroneClient, SecretApi, TrustBundle};
use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, USER_AGENT};
use crate::error::BuilderError;
use crate::logging::Logger;

/// Construction options for [`ClientBuilder`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderFlags {
    /// Skip TLS certificate verification entirely
    pub insecure: bool,
}

impl BuilderFlags {
    pub const INSECURE: Self = Self { insecure: true };
}

/// Builds authenticated clients sharing one trust policy
pub struct ClientBuilder {
    logger: Arc<dyn Logger>,
    trust_bundle: Option<TrustBundle>,
    insecure: bool,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("certificates", &self.trust_bundle.as_ref().map_or(0, TrustBundle::len))
            .field("insecure", &self.insecure)
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    /// Set up the trust policy
    ///
    /// An empty `certs_location` keeps the built-in roots. A logger is
    /// mandatory here: every trust decision is logged.
    pub fn new(
        logger: Option<Arc<dyn Logger>>,
        certs_location: impl AsRef<Path>,
        flags: BuilderFlags,
    ) -> Result<Self, BuilderError> {
        let logger = logger.ok_or(BuilderError::NullLogger)?;

        if flags.insecure {
            logger.warning("Ignoring certificates, this is dangerous!");
        }

        let certs_location = certs_location.as_ref();
        let trust_bundle = if certs_location.as_os_str().is_empty() {
            logger.info("No certificates provided");
            None
        } else {
            TrustBundle::load(certs_location, logger.as_ref())?
        };

        Ok(Self {
            logger,
            trust_bundle,
            insecure: flags.insecure,
        })
    }

    pub fn trust_bundle(&self) -> Option<&TrustBundle> {
        self.trust_bundle.as_ref()
    }

    pub fn is_insecure(&self) -> bool {
        self.insecure
    }

    /// Build a client for `host` and probe it with `token`
    ///
    /// The identity endpoint must answer successfully before the client is
    /// returned; any failure comes back as [`BuilderError::ConnectionFailed`].
    pub async fn build_client(&self, host: &str, token: &str) -> Result<DroneClient, BuilderError> {
        if token.is_empty() {
            return Err(BuilderError::EmptyToken);
        }
        let base_url = parse_host(host)?;

        let client = DroneClient::new(self.transport()?, base_url, token);
        client
            .verify_identity()
            .await
            .map_err(BuilderError::ConnectionFailed)?;

        self.logger.debug(&format!("Connected to {host}"));
        Ok(client)
    }

    /// Plain HTTP transport carrying the trust policy, without credentials
    fn transport(&self) -> Result<reqwest::Client, BuilderError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

        if let Some(bundle) = &self.trust_bundle {
            builder = builder.tls_built_in_root_certs(false);
            for certificate in bundle.certificates() {
                builder = builder.add_root_certificate(certificate.clone());
            }
        }

        if self.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(BuilderError::Transport)
    }
}

fn parse_host(host: &str) -> Result<Url, BuilderError> {
    let url = Url::parse(host).map_err(|e| BuilderError::InvalidHost {
        host: host.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(BuilderError::InvalidHost {
            host: host.to_string(),
            reason: "url cannot carry a path".to_string(),
        });
    }
    Ok(url)
}
