//! Wire types and errors for the control plane.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while talking to the control plane.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// Network or transport failure.
    #[error("fetch {endpoint} failed: {message}")]
    Fetch { endpoint: String, message: String },

    /// Non-success HTTP status.
    #[error("fetch {endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// Body was not JSON or did not have the expected shape.
    #[error("malformed response from {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP client could not be constructed.
    #[error("control plane client error: {0}")]
    Client(String),
}

impl ControlPlaneError {
    /// Coarse classification used as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            ControlPlaneError::Fetch { .. }
            | ControlPlaneError::Status { .. }
            | ControlPlaneError::Client(_) => "fetch",
            ControlPlaneError::Parse { .. } => "parse",
        }
    }
}

pub type ControlPlaneResult<T> = Result<T, ControlPlaneError>;

/// Every response wraps its payload in a top-level `data` field.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
}

/// `app → ["path#METHOD", ...]`
pub type CatalogDocument = HashMap<String, Option<Vec<String>>>;

/// `app → ["pattern", ...]`
pub type EntryRuleDocument = HashMap<String, Option<Vec<String>>>;

/// One tenant's environment-to-application mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfigEntry {
    pub tenant_app_key: Option<String>,
    pub env_app_map: Option<BTreeMap<String, Option<Vec<String>>>>,
}

/// A business activity attached to a stress-test report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDefinition {
    #[serde(default, deserialize_with = "virtual_flag")]
    pub is_virtual: bool,
    pub method_name: Option<String>,
    /// The route pattern.
    pub service_name: Option<String>,
    pub application_name: Option<String>,
}

/// Accepts `0`/`1`, booleans and numeric strings; anything else is `false`.
fn virtual_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => {
            let text = text.trim();
            text.eq_ignore_ascii_case("true") || text.parse::<f64>().is_ok_and(|n| n != 0.0)
        }
        _ => false,
    })
}
