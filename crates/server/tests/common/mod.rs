//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the router around a
//! fresh AppState, so requests run through the full middleware stack
//! without binding a port.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use wheel_core::{Config, DatabaseConfig, EngineConfig, ServerConfig};
use wheel_server::state::AppState;

/// Re-export fixtures for test convenience
pub use wheel_core::testing::fixtures;

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_solve() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/solve", json!({
///         "pool": [1, 2, 3, 4, 5], "k": 3, "m": 2
///     })).await;
///
///     assert_eq!(response.status, StatusCode::OK);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Temporary directory for the database path
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default engine limits.
    pub fn new() -> Self {
        Self::with_engine(EngineConfig::default())
    }

    /// Create a test fixture with custom engine limits.
    pub fn with_engine(engine: EngineConfig) -> Self {
        Self::build(engine, ServerConfig::default().max_running_jobs)
    }

    /// Create a test fixture that runs at most `limit` jobs at once.
    pub fn with_job_limit(limit: usize) -> Self {
        Self::build(EngineConfig::default(), limit)
    }

    fn build(engine: EngineConfig, max_running_jobs: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
                max_running_jobs,
            },
            database: DatabaseConfig {
                path: temp_dir.path().join("test.db"),
            },
            engine,
            ..Config::default()
        };

        let state = Arc::new(AppState::new(config));
        let router = wheel_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// GET a path and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    /// Poll a job until it leaves the running state.
    pub async fn wait_for_job(&self, id: &str) -> TestResponse {
        for _ in 0..500 {
            let response = self.get(&format!("/api/v1/jobs/{}", id)).await;
            if response.body["status"] != "running" {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish in time", id);
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
