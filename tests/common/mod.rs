//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use route_normalizer::clock::ManualClock;
use route_normalizer::config::ServiceConfig;
use route_normalizer::control_plane::ScriptedTransport;
use route_normalizer::RouteService;

pub const CATALOG: &str = "/api/routes/catalog";
pub const TENANTS: &str = "/api/tenants/config";
pub const ENTRY_RULES: &str = "/api/routes/entries";
pub const ACTIVITIES: &str = "/api/activities";

/// A request as seen by the mock control plane.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    /// Request target including the query string.
    pub target: String,
    /// Header names lower-cased.
    pub headers: HashMap<String, String>,
}

/// Minimal HTTP/1.1 control plane answering GETs by path.
#[derive(Clone, Default)]
pub struct MockControlPlane {
    routes: Arc<Mutex<HashMap<String, (u16, String)>>>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockControlPlane {
    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// Bind on an ephemeral port and serve until the runtime stops.
    pub async fn start(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let plane = self.clone();

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((mut socket, _)) => {
                        let plane = plane.clone();
                        tokio::spawn(async move {
                            let mut buf = Vec::new();
                            let mut chunk = [0u8; 1024];
                            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                                match socket.read(&mut chunk).await {
                                    Ok(0) | Err(_) => return,
                                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                                }
                            }
                            let (status, body) = plane.handle(&String::from_utf8_lossy(&buf));
                            let status_text = match status {
                                200 => "200 OK",
                                404 => "404 Not Found",
                                500 => "500 Internal Server Error",
                                503 => "503 Service Unavailable",
                                _ => "200 OK",
                            };
                            let response = format!(
                                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                status_text,
                                body.len(),
                                body
                            );
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        addr
    }

    fn handle(&self, head: &str) -> (u16, String) {
        let mut lines = head.split("\r\n");
        let target = lines
            .next()
            .and_then(|line| line.split(' ').nth(1))
            .unwrap_or("/")
            .to_string();
        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect();

        let path = target.split('?').next().unwrap_or("/").to_string();
        self.seen.lock().unwrap().push(SeenRequest { target, headers });

        self.routes
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .unwrap_or((404, String::new()))
    }
}

/// Config pointing the control plane client at `addr`.
pub fn config_for(addr: SocketAddr) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.control_plane.host = addr.ip().to_string();
    config.control_plane.port = addr.port();
    config.control_plane.request_timeout_secs = 5;
    config
}

/// Service over a scripted transport and a manual clock.
pub fn scripted_service(
    config: &ServiceConfig,
) -> (Arc<RouteService>, Arc<ScriptedTransport>, Arc<ManualClock>) {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::new());
    let service = Arc::new(RouteService::new(config, transport.clone(), clock.clone()));
    (service, transport, clock)
}
