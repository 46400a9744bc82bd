//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router
//! daemon. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the filesystem router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address, timeouts).
    pub listener: ListenerConfig,

    /// Route discovery settings (root directory, ignore rules, cache file).
    pub discovery: DiscoveryConfig,

    /// Change watcher settings (debounce, polling).
    pub watcher: WatcherConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout applied by the outer middleware stack.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Route discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Root directory scanned for route files.
    pub root: PathBuf,

    /// Path of the persisted route-table artifact.
    pub cache_file: PathBuf,

    /// File extensions eligible as route sources (no leading dot).
    pub extensions: Vec<String>,

    /// Directory names excluded from the walk, at any depth.
    pub ignore_dirs: Vec<String>,

    /// When true, a file declaring a method outside the fixed set aborts
    /// discovery instead of being skipped with a warning.
    pub strict_methods: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("routes"),
            cache_file: PathBuf::from(".routewalk/routes.json"),
            extensions: vec!["rs".to_string()],
            ignore_dirs: vec![
                "app".to_string(),
                "modules".to_string(),
                "utils".to_string(),
                "server".to_string(),
                "plugins".to_string(),
                "node_modules".to_string(),
                "dist".to_string(),
                "target".to_string(),
                ".git".to_string(),
                ".cache".to_string(),
                ".routewalk".to_string(),
            ],
            strict_methods: false,
        }
    }
}

/// Change watcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Whether the watcher runs at all.
    pub enabled: bool,

    /// Quiet window after the first change event before a rebuild cycle
    /// starts; events arriving inside the window are coalesced.
    pub debounce_ms: u64,

    /// Poll interval for the fallback polling backend.
    pub poll_interval_secs: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 200,
            poll_interval_secs: 2,
        }
    }
}
