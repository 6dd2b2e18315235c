//! Pact contract tests for the Drone secrets API
//!
//! These tests define the contract between dronesec and a Drone server.
//! Each test drives the real client or reconciler against a Pact mock server;
//! any request the contract does not describe, or any described request that
//! never arrives, fails the test when the mock server is dropped.

#[cfg(test)]
mod common;

use std::sync::Arc;

use common::{base_url, init_rustls, RecordingLogger};
use dronesec::{
    ApiError, BuilderError, BuilderFlags, ClientBuilder, Logger, ReconcileError, SecretReconciler,
};
use pact_consumer::prelude::*;
use serde_json::json;

const TOKEN: &str = "test-token";
const OWNER: &str = "octocat";
const REPO: &str = "hello-world";

fn pact() -> PactBuilder {
    init_rustls();
    PactBuilder::new("dronesec", "Drone-Server")
}

fn with_identity(pact_builder: &mut PactBuilder) {
    pact_builder.interaction("fetch the authenticated user", "", |mut i| {
        i.given("the token belongs to an active user");
        i.request
            .method("GET")
            .path("/api/user".to_string())
            .header("authorization", format!("Bearer {TOKEN}"));
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": 1,
                "login": "octocat",
                "admin": false
            }));
        i
    });
}

async fn reconciler(url: &str, logger: Arc<RecordingLogger>) -> SecretReconciler {
    let logger: Arc<dyn Logger> = logger;
    SecretReconciler::new(url, OWNER, REPO, TOKEN, "", BuilderFlags::default(), Some(logger))
        .await
        .expect("Failed to build reconciler")
}

#[tokio::test]
async fn test_identity_probe_contract() {
    let mut pact_builder = pact();
    with_identity(&mut pact_builder);

    let mock_server = pact_builder.start_mock_server(None, None);
    let url = base_url(&mock_server.url());

    let logger = RecordingLogger::new();
    let builder = ClientBuilder::new(Some(logger.clone()), "", BuilderFlags::default())
        .expect("Failed to create builder");
    let client = builder
        .build_client(&url, TOKEN)
        .await
        .expect("Identity probe should succeed");

    assert_eq!(base_url(client.base_url()), url);
    assert!(logger.has_info("No certificates provided"));
}

#[tokio::test]
async fn test_identity_probe_rejected_token_contract() {
    let mut pact_builder = pact();
    pact_builder.interaction("fetch the user with a revoked token", "", |mut i| {
        i.given("the token is revoked");
        i.request
            .method("GET")
            .path("/api/user".to_string())
            .header("authorization", format!("Bearer {TOKEN}"));
        i.response
            .status(401)
            .header("content-type", "application/json")
            .json_body(json!({ "message": "Unauthorized" }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let url = base_url(&mock_server.url());

    let builder = ClientBuilder::new(Some(RecordingLogger::new()), "", BuilderFlags::default())
        .expect("Failed to create builder");
    let result = builder.build_client(&url, TOKEN).await;

    match result {
        Err(BuilderError::ConnectionFailed(ApiError::Status { status, message })) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("Expected ConnectionFailed(401), got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_new_secret_contract() {
    let mut pact_builder = pact();
    with_identity(&mut pact_builder);
    pact_builder.interaction("create a new secret", "", |mut i| {
        i.given("the repository has no secret named registry_password");
        i.request
            .method("POST")
            .path(format!("/api/repos/{OWNER}/{REPO}/secrets"))
            .header("authorization", format!("Bearer {TOKEN}"))
            .json_body(json!({
                "name": "registry_password",
                "data": "hunter2",
                "pull_request": true
            }));
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": 7,
                "repo_id": 1,
                "name": "registry_password",
                "pull_request": true
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let url = base_url(&mock_server.url());

    let logger = RecordingLogger::new();
    let reconciler = reconciler(&url, logger.clone()).await;
    reconciler
        .create("registry_password", "hunter2")
        .await
        .expect("Create should succeed");

    assert!(logger.has_info("Created secret registry_password"));
    assert!(logger.warnings().is_empty());
}

#[tokio::test]
async fn test_create_overwrites_existing_secret_contract() {
    let mut pact_builder = pact();
    with_identity(&mut pact_builder);
    pact_builder.interaction("create a secret that already exists", "", |mut i| {
        i.given("the repository already has a secret named registry_password");
        i.request
            .method("POST")
            .path(format!("/api/repos/{OWNER}/{REPO}/secrets"))
            .header("authorization", format!("Bearer {TOKEN}"))
            .json_body(json!({
                "name": "registry_password",
                "data": "hunter3",
                "pull_request": true
            }));
        i.response
            .status(500)
            .header("content-type", "application/json")
            .json_body(json!({
                "message": "UNIQUE constraint failed: secrets.secret_repo_id, secrets.secret_name"
            }));
        i
    });
    pact_builder.interaction("overwrite an existing secret", "", |mut i| {
        i.given("the repository already has a secret named registry_password");
        i.request
            .method("PATCH")
            .path(format!("/api/repos/{OWNER}/{REPO}/secrets/registry_password"))
            .header("authorization", format!("Bearer {TOKEN}"))
            .json_body(json!({
                "name": "registry_password",
                "data": "hunter3",
                "pull_request": true
            }));
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": 7,
                "repo_id": 1,
                "name": "registry_password",
                "pull_request": true
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let url = base_url(&mock_server.url());

    let logger = RecordingLogger::new();
    let reconciler = reconciler(&url, logger.clone()).await;
    reconciler
        .create("registry_password", "hunter3")
        .await
        .expect("Create should fall back to overwrite");

    assert!(logger.has_debug("UNIQUE constraint failed"));
    assert_eq!(logger.warnings(), vec!["Overwriting old secret registry_password"]);
    assert!(logger.has_info("Updated secret registry_password"));
    assert!(!logger.has_info("Created secret"));
}

#[tokio::test]
async fn test_create_unrelated_failure_contract() {
    let mut pact_builder = pact();
    with_identity(&mut pact_builder);
    pact_builder.interaction("create a secret without write access", "", |mut i| {
        i.given("the user cannot write to the repository");
        i.request
            .method("POST")
            .path(format!("/api/repos/{OWNER}/{REPO}/secrets"))
            .header("authorization", format!("Bearer {TOKEN}"));
        i.response
            .status(403)
            .header("content-type", "application/json")
            .json_body(json!({ "message": "Forbidden" }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let url = base_url(&mock_server.url());

    let logger = RecordingLogger::new();
    let reconciler = reconciler(&url, logger.clone()).await;
    let result = reconciler.create("registry_password", "hunter2").await;

    match result {
        Err(ReconcileError::Create { name, source }) => {
            assert_eq!(name, "registry_password");
            assert_eq!(source.status().map(|s| s.as_u16()), Some(403));
            assert_eq!(source.message(), "Forbidden");
        }
        other => panic!("Expected Create error, got {other:?}"),
    }
    assert!(logger.warnings().is_empty());
}

#[tokio::test]
async fn test_delete_existing_secret_contract() {
    let mut pact_builder = pact();
    with_identity(&mut pact_builder);
    pact_builder.interaction("delete a secret", "", |mut i| {
        i.given("the repository has a secret named api_key");
        i.request
            .method("DELETE")
            .path(format!("/api/repos/{OWNER}/{REPO}/secrets/api_key"))
            .header("authorization", format!("Bearer {TOKEN}"));
        i.response.status(204);
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let url = base_url(&mock_server.url());

    let logger = RecordingLogger::new();
    let reconciler = reconciler(&url, logger.clone()).await;
    reconciler
        .delete("api_key")
        .await
        .expect("Delete should succeed");

    assert!(logger.has_info("Deleted secret api_key"));
}

#[tokio::test]
async fn test_delete_missing_secret_contract() {
    let mut pact_builder = pact();
    with_identity(&mut pact_builder);
    pact_builder.interaction("delete a secret that does not exist", "", |mut i| {
        i.given("the repository has no secret named api_key");
        i.request
            .method("DELETE")
            .path(format!("/api/repos/{OWNER}/{REPO}/secrets/api_key"))
            .header("authorization", format!("Bearer {TOKEN}"));
        i.response
            .status(404)
            .header("content-type", "application/json")
            .json_body(json!({ "message": "sql: no rows in result set" }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let url = base_url(&mock_server.url());

    let logger = RecordingLogger::new();
    let reconciler = reconciler(&url, logger.clone()).await;
    reconciler
        .delete("api_key")
        .await
        .expect("Deleting a missing secret is not an error");

    assert!(logger.has_debug("sql: no rows in result set"));
    assert_eq!(logger.warnings(), vec!["Secret api_key not found"]);
    assert!(!logger.has_info("Deleted secret"));
}

#[tokio::test]
async fn test_delete_in_unknown_repository_contract() {
    let mut pact_builder = pact();
    with_identity(&mut pact_builder);
    pact_builder.interaction("delete a secret in a repository that does not exist", "", |mut i| {
        i.given("the repository does not exist");
        i.request
            .method("DELETE")
            .path(format!("/api/repos/{OWNER}/{REPO}/secrets/api_key"))
            .header("authorization", format!("Bearer {TOKEN}"));
        i.response
            .status(404)
            .header("content-type", "application/json")
            .json_body(json!({ "message": "Not Found" }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let url = base_url(&mock_server.url());

    let reconciler = reconciler(&url, RecordingLogger::new()).await;
    let result = reconciler.delete("api_key").await;

    assert!(
        matches!(result, Err(ReconcileError::Delete { .. })),
        "Expected Delete error, got {result:?}"
    );
}
