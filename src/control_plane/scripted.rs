//! In-memory transport with canned responses, for tests and local runs.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use futures_util::future::BoxFuture;

use crate::control_plane::transport::{FetchRequest, Transport};
use crate::control_plane::types::{ControlPlaneError, ControlPlaneResult};

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Failure(String),
}

/// Serves scripted bodies keyed by request path and records every request.
///
/// Paths without a script answer with HTTP 404.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer GETs to `path` with `body`.
    pub fn respond(&self, path: &str, body: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), Reply::Body(body.into()));
    }

    /// Fail GETs to `path` with a transport error.
    pub fn fail(&self, path: &str, message: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), Reply::Failure(message.into()));
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received for `path`.
    pub fn calls_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|request| request.path == path)
            .count()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, request: FetchRequest) -> BoxFuture<'_, ControlPlaneResult<String>> {
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&request.path)
            .cloned();
        let endpoint = request.path.clone();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        Box::pin(async move {
            match reply {
                Some(Reply::Body(body)) => Ok(body),
                Some(Reply::Failure(message)) => Err(ControlPlaneError::Fetch { endpoint, message }),
                None => Err(ControlPlaneError::Status {
                    endpoint,
                    status: 404,
                }),
            }
        })
    }
}
