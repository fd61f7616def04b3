use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::catalog::TenantBinding;
use crate::service::ServiceStatus;

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub app: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct EntryRuleParams {
    pub tenant_key: String,
    pub env_code: String,
    pub app: String,
    pub path: String,
    #[serde(default = "default_method")]
    pub method: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivityParams {
    pub task_id: String,
    pub path: String,
    #[serde(default = "default_method")]
    pub method: String,
}

#[derive(Debug, Deserialize)]
pub struct TenantParams {
    pub app: String,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Serialize)]
pub struct RouteAnswer {
    pub input: String,
    pub route: String,
}

#[derive(Debug, Serialize)]
pub struct ActivityAnswer {
    pub input: String,
    pub route: String,
    pub application_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TenantAnswer {
    pub app: String,
    pub lookup_enabled: bool,
    /// What callers get back.
    pub effective: TenantBinding,
    /// Raw table entry, regardless of the lookup flag.
    pub live: Option<TenantBinding>,
}

#[derive(Debug, Serialize)]
pub struct RefreshAnswer {
    pub catalog_refreshed: bool,
    pub tenants_refreshed: bool,
    pub status: ServiceStatus,
}

#[derive(Debug, Serialize)]
pub struct FlushAnswer {
    pub entry_rules_flushed: usize,
    pub activities_flushed: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<ServiceStatus> {
    Json(state.service.status())
}

pub async fn get_resolve(
    State(state): State<AdminState>,
    Query(params): Query<ResolveParams>,
) -> Json<RouteAnswer> {
    let route = state
        .service
        .resolve_route(&params.app, &params.method, &params.url);
    Json(RouteAnswer {
        input: params.url,
        route,
    })
}

pub async fn get_entry_rule(
    State(state): State<AdminState>,
    Query(params): Query<EntryRuleParams>,
) -> Json<RouteAnswer> {
    let route = state
        .service
        .match_entry_rule(
            &params.tenant_key,
            &params.env_code,
            &params.app,
            &params.path,
            &params.method,
        )
        .await;
    Json(RouteAnswer {
        input: params.path,
        route,
    })
}

pub async fn get_activity(
    State(state): State<AdminState>,
    Query(params): Query<ActivityParams>,
) -> Json<ActivityAnswer> {
    let found = state
        .service
        .find_business_activity(&params.task_id, &params.path, &params.method)
        .await;
    let (route, application_name) = match found {
        Some(found) => (found.route, found.application_name),
        None => (params.path.clone(), None),
    };
    Json(ActivityAnswer {
        input: params.path,
        route,
        application_name,
    })
}

pub async fn get_tenant(
    State(state): State<AdminState>,
    Query(params): Query<TenantParams>,
) -> Json<TenantAnswer> {
    let tenants = state.service.tenants();
    Json(TenantAnswer {
        lookup_enabled: tenants.lookup_enabled(),
        effective: tenants.get_tenant_config(&params.app),
        live: tenants.binding(&params.app),
        app: params.app,
    })
}

/// Run both refreshes now instead of waiting for the next tick.
pub async fn post_refresh(State(state): State<AdminState>) -> Json<RefreshAnswer> {
    let (catalog_refreshed, tenants_refreshed) =
        tokio::join!(state.service.refresh_catalog(), state.service.refresh_tenants());
    tracing::info!(catalog_refreshed, tenants_refreshed, "Manual refresh requested");
    Json(RefreshAnswer {
        catalog_refreshed,
        tenants_refreshed,
        status: state.service.status(),
    })
}

/// Empty the entry-rule and activity caches.
pub async fn post_flush_caches(State(state): State<AdminState>) -> Json<FlushAnswer> {
    let (entry_rules_flushed, activities_flushed) = state.service.flush_caches();
    Json(FlushAnswer {
        entry_rules_flushed,
        activities_flushed,
    })
}
