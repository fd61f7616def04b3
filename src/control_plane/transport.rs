//! Transport seam for control plane GETs.
//!
//! # Responsibilities
//! - Define the request shape the control plane client emits
//! - Provide the production HTTP implementation (reqwest)
//!
//! # Design Decisions
//! - Object-safe trait returning a boxed future so the service can hold an
//!   `Arc<dyn Transport>` and tests can swap in an in-memory implementation
//! - The transport returns raw bodies; JSON decoding belongs to the client
//! - Every call carries the configured request timeout

use std::fmt::Debug;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::config::ControlPlaneConfig;
use crate::control_plane::types::{ControlPlaneError, ControlPlaneResult};

/// A GET against the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Path relative to the control plane base URL.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            headers: Vec::new(),
            query: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Executes control plane GETs and returns the response body.
pub trait Transport: Send + Sync + Debug {
    fn get(&self, request: FetchRequest) -> BoxFuture<'_, ControlPlaneResult<String>>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ControlPlaneConfig) -> ControlPlaneResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ControlPlaneError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn get(&self, request: FetchRequest) -> BoxFuture<'_, ControlPlaneResult<String>> {
        Box::pin(async move {
            let url = format!("{}{}", self.base_url, request.path);
            let mut builder = self.client.get(&url).query(&request.query);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = builder.send().await.map_err(|e| ControlPlaneError::Fetch {
                endpoint: request.path.clone(),
                message: e.to_string(),
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ControlPlaneError::Status {
                    endpoint: request.path,
                    status: status.as_u16(),
                });
            }

            response.text().await.map_err(|e| ControlPlaneError::Fetch {
                endpoint: request.path,
                message: e.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = FetchRequest::new("/api/routes/entries")
            .header("TenantAppkey", "t-1")
            .header("EnvCode", "prod")
            .query("appName", "checkout");

        assert_eq!(request.header_value("tenantappkey"), Some("t-1"));
        assert_eq!(request.header_value("EnvCode"), Some("prod"));
        assert_eq!(request.query_value("appName"), Some("checkout"));
        assert_eq!(request.query_value("reportId"), None);
    }

    #[test]
    fn test_http_transport_base_url() {
        let config = ControlPlaneConfig {
            host: "10.0.0.5".into(),
            port: 10010,
            ..ControlPlaneConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.base_url(), "http://10.0.0.5:10010");
    }
}
