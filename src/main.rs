//! Filesystem router daemon.
//!
//! Discovers route files under the configured root, binds them into an HTTP
//! server, and hot-reloads the route table when files change.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use routewalk::config::{load_config, RouterConfig};
use routewalk::handler::{HandlerCache, ModuleRegistry};
use routewalk::watch::ChangeWatcher;
use routewalk::{HotRouter, RouteServer, RouteTableStore, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "routewalk", about = "Filesystem-convention HTTP router")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    routewalk::observability::logging::init("routewalk=debug,tower_http=debug");

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        route_root = %config.discovery.root.display(),
        cache_file = %config.discovery.cache_file.display(),
        "Configuration loaded"
    );

    let store = Arc::new(RouteTableStore::new(&config));
    let registry = Arc::new(ModuleRegistry::new());
    let handlers = Arc::new(HandlerCache::new(registry));
    let hot = HotRouter::new();
    let shutdown = Shutdown::new();

    // First load: persisted artifact if fresh, otherwise full discovery.
    let table = store.load().await?;
    hot.rebind(&table, &handlers);
    tracing::info!(routes = table.len(), "Registered routes");

    // Keep the watcher handle alive for the process lifetime.
    let _watcher = if config.watcher.enabled {
        let mut watcher = ChangeWatcher::new(store.clone(), handlers.clone(), &config.watcher);
        let rebind_hot = hot.clone();
        let rebind_handlers = handlers.clone();
        watcher.subscribe(move |table| {
            rebind_hot.rebind(table, &rebind_handlers);
        });
        Some(watcher.spawn(shutdown.subscribe())?)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = RouteServer::new(&config.listener, hot);
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
