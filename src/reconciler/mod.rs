//! # Secret Reconciler
//!
//! Create-or-overwrite and idempotent delete of secrets in one repository.
//!
//! `create` never looks the secret up first. It posts, and only when the
//! server rejects the name as a duplicate does it overwrite with a PATCH.
//! This avoids a lookup round trip and the race between lookup and write.

use std::path::Path;
use std::sync::Arc;

use tracing::{info_span, Instrument};

use crate::client::{BuilderFlags, ClientBuilder, RepositoryTarget, Secret, SecretApi};
use crate::error::ReconcileError;
use crate::logging::{Logger, NullLogger};

pub mod classify;

use classify::RemoteErrorKind;

/// Writes secrets into a single repository's secret store
pub struct SecretReconciler {
    api: Arc<dyn SecretApi>,
    target: RepositoryTarget,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for SecretReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretReconciler")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl SecretReconciler {
    /// Validate inputs, build a probed client and bind it to `owner/repo`
    ///
    /// Inputs are checked in order host, owner, repo, token; the first empty
    /// one is reported. Without a logger nothing is logged.
    pub async fn new(
        host: &str,
        owner: &str,
        repo: &str,
        token: &str,
        certs_location: impl AsRef<Path>,
        flags: BuilderFlags,
        logger: Option<Arc<dyn Logger>>,
    ) -> Result<Self, ReconcileError> {
        let required = [
            ("host url", host),
            ("repo owner", owner),
            ("repo name", repo),
            ("token", token),
        ];
        if let Some(&(field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(ReconcileError::EmptyInput { field });
        }

        let logger = logger.unwrap_or_else(|| Arc::new(NullLogger));
        let builder = ClientBuilder::new(Some(Arc::clone(&logger)), certs_location, flags)?;
        let client = builder.build_client(host, token).await?;

        Ok(Self::with_client(
            Arc::new(client),
            RepositoryTarget::new(owner, repo),
            logger,
        ))
    }

    /// Bind an existing API handle to a repository
    pub fn with_client(
        api: Arc<dyn SecretApi>,
        target: RepositoryTarget,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self { api, target, logger }
    }

    pub fn target(&self) -> &RepositoryTarget {
        &self.target
    }

    /// Create `name`, overwriting it if the server already has it
    pub async fn create(&self, name: &str, data: &str) -> Result<(), ReconcileError> {
        let span = info_span!("drone.secret.create", secret.name = name, repo = %self.target);
        let secret = Secret::new(name, data);

        async {
            match self.api.create_secret(&self.target, &secret).await {
                Ok(()) => {
                    self.logger.info(&format!("Created secret {name}"));
                    Ok(())
                }
                Err(e) if classify::classify(&e) == Some(RemoteErrorKind::AlreadyExists) => {
                    self.logger.debug(&e.message());
                    self.logger.warning(&format!("Overwriting old secret {name}"));
                    self.api
                        .update_secret(&self.target, &secret)
                        .await
                        .map_err(|source| ReconcileError::Update {
                            name: name.to_string(),
                            source,
                        })?;
                    self.logger.info(&format!("Updated secret {name}"));
                    Ok(())
                }
                Err(source) => Err(ReconcileError::Create {
                    name: name.to_string(),
                    source,
                }),
            }
        }
        .instrument(span)
        .await
    }

    /// Delete `name`; a secret that is already gone counts as deleted
    pub async fn delete(&self, name: &str) -> Result<(), ReconcileError> {
        let span = info_span!("drone.secret.delete", secret.name = name, repo = %self.target);

        async {
            match self.api.delete_secret(&self.target, name).await {
                Ok(()) => {
                    self.logger.info(&format!("Deleted secret {name}"));
                    Ok(())
                }
                Err(e) if classify::classify(&e) == Some(RemoteErrorKind::NotFound) => {
                    self.logger.debug(&e.message());
                    self.logger.warning(&format!("Secret {name} not found"));
                    Ok(())
                }
                Err(source) => Err(ReconcileError::Delete {
                    name: name.to_string(),
                    source,
                }),
            }
        }
        .instrument(span)
        .await
    }
}
