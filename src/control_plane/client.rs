//! Typed wrappers over the four control plane GET contracts.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::ControlPlaneConfig;
use crate::control_plane::transport::{FetchRequest, Transport};
use crate::control_plane::types::{
    ActivityDefinition, CatalogDocument, ControlPlaneError, ControlPlaneResult, EntryRuleDocument,
    Envelope, TenantConfigEntry,
};

pub const TENANT_HEADER: &str = "TenantAppkey";
pub const ENV_HEADER: &str = "EnvCode";
pub const APP_NAME_PARAM: &str = "appName";
pub const REPORT_ID_PARAM: &str = "reportId";

/// Endpoint paths, relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub catalog: String,
    pub tenant_config: String,
    pub entry_rules: String,
    pub activities: String,
}

impl From<&ControlPlaneConfig> for Endpoints {
    fn from(config: &ControlPlaneConfig) -> Self {
        Self {
            catalog: config.catalog_path.clone(),
            tenant_config: config.tenant_config_path.clone(),
            entry_rules: config.entry_rules_path.clone(),
            activities: config.activities_path.clone(),
        }
    }
}

/// Cheap to clone; all clones share one transport.
#[derive(Debug, Clone)]
pub struct ControlPlaneClient {
    transport: Arc<dyn Transport>,
    endpoints: Arc<Endpoints>,
}

impl ControlPlaneClient {
    pub fn new(transport: Arc<dyn Transport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints: Arc::new(endpoints),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// `None` when the response carries no `data`.
    pub async fn fetch_catalog(&self) -> ControlPlaneResult<Option<CatalogDocument>> {
        self.fetch(FetchRequest::new(self.endpoints.catalog.as_str()))
            .await
    }

    pub async fn fetch_tenant_configs(&self) -> ControlPlaneResult<Option<Vec<TenantConfigEntry>>> {
        self.fetch(FetchRequest::new(self.endpoints.tenant_config.as_str()))
            .await
    }

    /// Entry rules registered for `app_name` under one tenant and environment.
    /// A missing or `null` list comes back empty.
    pub async fn fetch_entry_rules(
        &self,
        tenant_key: &str,
        env_code: &str,
        app_name: &str,
    ) -> ControlPlaneResult<Vec<String>> {
        let request = FetchRequest::new(self.endpoints.entry_rules.as_str())
            .header(TENANT_HEADER, tenant_key)
            .header(ENV_HEADER, env_code)
            .query(APP_NAME_PARAM, app_name);

        let document: Option<EntryRuleDocument> = self.fetch(request).await?;
        Ok(document
            .and_then(|mut apps| apps.remove(app_name))
            .flatten()
            .unwrap_or_default())
    }

    pub async fn fetch_activities(&self, report_id: &str) -> ControlPlaneResult<Vec<ActivityDefinition>> {
        let request =
            FetchRequest::new(self.endpoints.activities.as_str()).query(REPORT_ID_PARAM, report_id);
        let activities: Option<Vec<ActivityDefinition>> = self.fetch(request).await?;
        Ok(activities.unwrap_or_default())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: FetchRequest) -> ControlPlaneResult<Option<T>> {
        let endpoint = request.path.clone();
        let body = self.transport.get(request).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|source| ControlPlaneError::Parse { endpoint, source })?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_plane::ScriptedTransport;

    fn client(transport: &Arc<ScriptedTransport>) -> ControlPlaneClient {
        ControlPlaneClient::new(
            transport.clone(),
            Endpoints::from(&ControlPlaneConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_entry_rules_request_shape() {
        let transport = Arc::new(ScriptedTransport::new());
        let cp = client(&transport);
        transport.respond(
            &cp.endpoints().entry_rules,
            r#"{"data": {"checkout": ["/cart/{id}"], "other": ["/x"]}}"#,
        );

        let rules = cp.fetch_entry_rules("t-1", "prod", "checkout").await.unwrap();
        assert_eq!(rules, vec!["/cart/{id}".to_string()]);

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header_value(TENANT_HEADER), Some("t-1"));
        assert_eq!(sent[0].header_value(ENV_HEADER), Some("prod"));
        assert_eq!(sent[0].query_value(APP_NAME_PARAM), Some("checkout"));
    }

    #[tokio::test]
    async fn test_missing_app_is_empty() {
        let transport = Arc::new(ScriptedTransport::new());
        let cp = client(&transport);
        transport.respond(&cp.endpoints().entry_rules, r#"{"data": {"checkout": null}}"#);
        assert!(cp.fetch_entry_rules("t", "e", "checkout").await.unwrap().is_empty());
        assert!(cp.fetch_entry_rules("t", "e", "billing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_parse_error_carries_endpoint() {
        let transport = Arc::new(ScriptedTransport::new());
        let cp = client(&transport);
        transport.respond(&cp.endpoints().catalog, "<html>gateway error</html>");

        match cp.fetch_catalog().await {
            Err(ControlPlaneError::Parse { endpoint, .. }) => {
                assert_eq!(endpoint, cp.endpoints().catalog)
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_activities_by_report() {
        let transport = Arc::new(ScriptedTransport::new());
        let cp = client(&transport);
        transport.respond(
            &cp.endpoints().activities,
            r#"{"data": [{"isVirtual": 0, "methodName": "GET", "serviceName": "/a/{b}", "applicationName": "shop"}]}"#,
        );

        let activities = cp.fetch_activities("report-9").await.unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].service_name.as_deref(), Some("/a/{b}"));
        assert_eq!(transport.requests()[0].query_value(REPORT_ID_PARAM), Some("report-9"));
    }
}
