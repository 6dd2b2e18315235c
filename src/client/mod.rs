//! # Drone Client
//!
//! Bearer-authenticated access to the Drone secret API.
//!
//! The HTTP transport (TLS trust policy, timeouts) is built first by
//! [`builder::ClientBuilder`]; [`DroneClient`] wraps it and attaches the
//! token to every request.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::constants::{REPOS_PATH, SECRETS_SEGMENT, USER_PATH};
use crate::error::ApiError;

pub mod builder;
pub mod trust;

pub use builder::{BuilderFlags, ClientBuilder};
pub use trust::TrustBundle;

/// Remote secret API consumed by the reconciler
#[async_trait]
pub trait SecretApi: Send + Sync {
    /// Fetch the authenticated principal; only success matters
    async fn verify_identity(&self) -> Result<(), ApiError>;

    async fn create_secret(&self, repo: &RepositoryTarget, secret: &Secret) -> Result<(), ApiError>;

    async fn update_secret(&self, repo: &RepositoryTarget, secret: &Secret) -> Result<(), ApiError>;

    async fn delete_secret(&self, repo: &RepositoryTarget, name: &str) -> Result<(), ApiError>;
}

/// Repository whose secret store is being written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTarget {
    pub owner: String,
    pub name: String,
}

impl RepositoryTarget {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Request body for both create and update
///
/// Secrets are always exposed to pull request builds.
#[derive(Clone, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    pub name: String,
    pub data: String,
    pub pull_request: bool,
}

impl Secret {
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            pull_request: true,
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("pull_request", &self.pull_request)
            .finish_non_exhaustive()
    }
}

/// Drone error body: `{"message": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Authenticated handle on one Drone server
///
/// Cheap to clone; carries no per-call state.
#[derive(Clone)]
pub struct DroneClient {
    http: reqwest::Client,
    base_url: Url,
    token: Arc<Zeroizing<String>>,
}

impl fmt::Debug for DroneClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DroneClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl DroneClient {
    /// Wrap an already configured transport with bearer authentication
    ///
    /// `base_url` must be able to carry path segments (checked by the builder).
    pub(crate) fn new(transport: reqwest::Client, base_url: Url, token: &str) -> Self {
        Self {
            http: transport,
            base_url,
            token: Arc::new(Zeroizing::new(token.to_string())),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn secrets_endpoint(&self, repo: &RepositoryTarget, name: Option<&str>) -> Url {
        let mut segments: Vec<&str> = REPOS_PATH.to_vec();
        segments.extend([repo.owner.as_str(), repo.name.as_str(), SECRETS_SEGMENT]);
        segments.extend(name);
        self.endpoint(segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(self.token.as_str())
    }

    /// Send and turn any non-success status into [`ApiError::Status`]
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!("Drone returned {}: {}", status, body.trim());
        Err(ApiError::Status {
            status,
            message: error_message(&body),
        })
    }
}

#[async_trait]
impl SecretApi for DroneClient {
    async fn verify_identity(&self) -> Result<(), ApiError> {
        let url = self.endpoint(USER_PATH);
        self.send(self.request(Method::GET, url)).await?;
        Ok(())
    }

    async fn create_secret(&self, repo: &RepositoryTarget, secret: &Secret) -> Result<(), ApiError> {
        let url = self.secrets_endpoint(repo, None);
        self.send(self.request(Method::POST, url).json(secret)).await?;
        Ok(())
    }

    async fn update_secret(&self, repo: &RepositoryTarget, secret: &Secret) -> Result<(), ApiError> {
        let url = self.secrets_endpoint(repo, Some(&secret.name));
        self.send(self.request(Method::PATCH, url).json(secret)).await?;
        Ok(())
    }

    async fn delete_secret(&self, repo: &RepositoryTarget, name: &str) -> Result<(), ApiError> {
        let url = self.secrets_endpoint(repo, Some(name));
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

/// Server message from an error body; raw text when it is not Drone's JSON
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
