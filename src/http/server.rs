//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the hot router in the outer middleware stack (tracing, timeout)
//! - Bind the server to a listener
//! - Graceful shutdown on Ctrl+C or an explicit trigger
//!
//! # Design Decisions
//! - The dispatch layer itself is a black box here: we hand it a service
//!   whose routes can be swapped underneath it, nothing more
//! - Route binding failures never surface at this level; unresolvable
//!   handlers already degraded to diagnostic-status fallbacks

use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::bind::HotRouter;
use crate::config::ListenerConfig;
use crate::lifecycle::Shutdown;

/// HTTP server for the filesystem router.
pub struct RouteServer {
    app: Router,
}

impl RouteServer {
    /// Wrap a hot router in the outer middleware stack.
    pub fn new(config: &ListenerConfig, hot: HotRouter) -> Self {
        let app = Router::new()
            .fallback_service(hot)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http());

        Self { app }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.app.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for Ctrl+C or an explicit shutdown trigger.
async fn shutdown_signal(shutdown: Shutdown) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if result.is_err() {
                tracing::error!("Failed to install Ctrl+C handler");
            }
        }
        _ = shutdown.triggered() => {}
    }
    shutdown.trigger();
    tracing::info!("Shutdown signal received");
}
