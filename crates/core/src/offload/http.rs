//! HTTP client for a remote `wheel-server`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::OffloadConfig;
use crate::engine::SolveRequest;

use super::{OffloadError, RemoteSolveResponse, RemoteSolver};

/// Error body returned by the solve service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Remote solver speaking the `/api/v1/solve` JSON API.
pub struct HttpRemoteSolver {
    client: Client,
    endpoint: String,
}

impl HttpRemoteSolver {
    /// Create a client with the configured timeout.
    pub fn new(config: &OffloadConfig) -> Result<Self, OffloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OffloadError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/v1/solve", config.url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl RemoteSolver for HttpRemoteSolver {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn solve(&self, request: &SolveRequest) -> Result<RemoteSolveResponse, OffloadError> {
        debug!(
            endpoint = %self.endpoint,
            n = request.pool.len(),
            k = request.k,
            m = request.m,
            "Sending remote solve"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OffloadError::Timeout
                } else if e.is_connect() {
                    OffloadError::ConnectionFailed(e.to_string())
                } else {
                    OffloadError::InvalidResponse(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(OffloadError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<RemoteSolveResponse>().await.map_err(|e| {
            if e.is_timeout() {
                OffloadError::Timeout
            } else {
                OffloadError::InvalidResponse(e.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config(url: &str, timeout_secs: u64) -> OffloadConfig {
        OffloadConfig {
            url: url.to_string(),
            timeout_secs,
            threshold: 0,
        }
    }

    /// Serve one canned HTTP response on a random local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let solver = HttpRemoteSolver::new(&config("http://compute:8080/", 5)).unwrap();
        assert_eq!(solver.endpoint(), "http://compute:8080/api/v1/solve");
    }

    #[tokio::test]
    async fn test_successful_solve() {
        let url = serve_once("200 OK", r#"{"tickets": [[1, 2, 3], [1, 4, 5]]}"#).await;
        let solver = HttpRemoteSolver::new(&config(&url, 5)).unwrap();

        let response = solver
            .solve(&SolveRequest::new(vec![1, 2, 3, 4, 5], 3, 2))
            .await
            .unwrap();
        assert_eq!(response.tickets, vec![vec![1, 2, 3], vec![1, 4, 5]]);
        assert!(response.stats.is_none());
    }

    #[tokio::test]
    async fn test_api_error_uses_error_body() {
        let url = serve_once(
            "413 Payload Too Large",
            r#"{"error": "Input too large", "kind": "too_large"}"#,
        )
        .await;
        let solver = HttpRemoteSolver::new(&config(&url, 5)).unwrap();

        let err = solver
            .solve(&SolveRequest::new(vec![1, 2, 3], 2, 1))
            .await
            .unwrap_err();
        match err {
            OffloadError::Api { status, message } => {
                assert_eq!(status, 413);
                assert_eq!(message, "Input too large");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let url = serve_once("200 OK", r#"{"nope": true}"#).await;
        let solver = HttpRemoteSolver::new(&config(&url, 5)).unwrap();

        let err = solver
            .solve(&SolveRequest::new(vec![1, 2, 3], 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, OffloadError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_failed() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let solver = HttpRemoteSolver::new(&config(&format!("http://{}", addr), 5)).unwrap();
        let err = solver
            .solve(&SolveRequest::new(vec![1, 2, 3], 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, OffloadError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let solver = HttpRemoteSolver::new(&config(&format!("http://{}", addr), 1)).unwrap();
        let err = solver
            .solve(&SolveRequest::new(vec![1, 2, 3], 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, OffloadError::Timeout));
    }
}
