//! Periodic refresh of remote configuration.
//!
//! # Responsibilities
//! - Drive one refresh target on a fixed period
//! - Stop on the shutdown broadcast

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::service::RouteService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTarget {
    Catalog,
    Tenants,
}

impl RefreshTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshTarget::Catalog => "catalog",
            RefreshTarget::Tenants => "tenants",
        }
    }
}

impl fmt::Display for RefreshTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct RefreshLoop {
    service: Arc<RouteService>,
    target: RefreshTarget,
    period: Duration,
}

impl RefreshLoop {
    pub fn new(service: Arc<RouteService>, target: RefreshTarget, period: Duration) -> Self {
        Self {
            service,
            target,
            period,
        }
    }

    /// Refresh immediately, then once per period. A refresh in progress runs to
    /// completion; ticks missed meanwhile are not replayed.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            target_name = %self.target,
            period_secs = self.period.as_secs(),
            "Refresh loop starting"
        );

        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!(target_name = %self.target, "Refresh loop received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn refresh_once(&self) -> bool {
        match self.target {
            RefreshTarget::Catalog => self.service.refresh_catalog().await,
            RefreshTarget::Tenants => self.service.refresh_tenants().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ServiceConfig;
    use crate::control_plane::ScriptedTransport;
    use crate::lifecycle::Shutdown;

    const CATALOG: &str = "/api/routes/catalog";

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate_then_periodic() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(CATALOG, r#"{"data": {"shop": ["/a/{id}#GET"]}}"#);
        let service = Arc::new(RouteService::new(
            &ServiceConfig::default(),
            transport.clone(),
            Arc::new(ManualClock::new()),
        ));

        let shutdown = Shutdown::new();
        let refresh = RefreshLoop::new(service.clone(), RefreshTarget::Catalog, Duration::from_secs(120));
        let handle = tokio::spawn(refresh.run(shutdown.subscribe()));

        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(transport.calls_to(CATALOG), 1);

        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(transport.calls_to(CATALOG), 2);
        assert_eq!(service.status().catalog_generation, 2);

        shutdown.trigger();
        handle.await.unwrap();

        time::sleep(Duration::from_secs(600)).await;
        assert_eq!(transport.calls_to(CATALOG), 2);
    }
}
