//! Authenticated diagnostics API.
//!
//! Every route requires `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::service::RouteService;

#[derive(Clone)]
pub struct AdminState {
    pub service: Arc<RouteService>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(service: Arc<RouteService>, api_key: &str) -> Self {
        Self {
            service,
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/resolve", get(get_resolve))
        .route("/admin/entry-rule", get(get_entry_rule))
        .route("/admin/activity", get(get_activity))
        .route("/admin/tenant", get(get_tenant))
        .route("/admin/refresh", post(post_refresh))
        .route("/admin/caches/flush", post(post_flush_caches))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API on `addr` until `shutdown` fires.
pub async fn serve(
    addr: SocketAddr,
    state: AdminState,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
