//! # api::transport — reqwest-backed [`Transport`]

use std::time::Duration;

use async_trait::async_trait;

use super::{RawResponse, Request, Transport, TransportError};

/// Sends requests to `base_url` with one shared, pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client:   reqwest::Client,
    base_url: String,
    timeout:  Duration,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, timeout)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &Request, bearer: Option<&str>) -> Result<RawResponse, TransportError> {
        let builder = match request {
            Request::Get { path }        => self.client.get(self.url(path)),
            Request::Post { path, body } => self.client.post(self.url(path)).json(body),
        };

        let builder = match bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let resp = builder
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| TransportError(e.to_string()))?;

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let transport = ReqwestTransport::new("http://localhost:8000/api/", Duration::from_secs(1));
        assert_eq!(transport.url("/login"), "http://localhost:8000/api/login");
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new(format!("http://{addr}"), Duration::from_millis(200));
        let result = transport.send(&Request::get("/login"), None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_silent_backend_times_out() {
        // accepts the connection, never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let transport = ReqwestTransport::new(format!("http://{addr}"), Duration::from_millis(100));
        let started = std::time::Instant::now();
        let result = transport.send(&Request::get("/login"), Some("tok")).await;

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
