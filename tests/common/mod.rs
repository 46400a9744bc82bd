//! Shared utilities for integration tests.

use std::path::{Path, PathBuf};

use routewalk::config::RouterConfig;

/// Write a route tree under `root`; `files` are (relative path, content).
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
    }
}

/// Config pointing at `<dir>/routes` with the artifact under `<dir>/cache`.
pub fn test_config(dir: &Path) -> RouterConfig {
    let mut config = RouterConfig::default();
    config.discovery.root = dir.join("routes");
    config.discovery.cache_file = dir.join("cache").join("routes.json");
    config.watcher.debounce_ms = 25;
    config
}

/// The canonicalized route root, as discovery sees it.
#[allow(dead_code)]
pub fn canonical_root(config: &RouterConfig) -> PathBuf {
    std::fs::canonicalize(&config.discovery.root).unwrap()
}
