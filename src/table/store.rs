//! Route table persistence and in-memory snapshot management.
//!
//! # Responsibilities
//! - Hold the currently-active table as an atomically swappable snapshot
//! - Read and validate the persisted artifact on first load
//! - Decide staleness by re-hashing every entry's source file
//! - Rebuild via the discoverer and persist the result
//!
//! # Design Decisions
//! - Readers always get a whole snapshot (`Arc<RouteTable>`), never a
//!   half-built table; writers swap through `arc-swap`
//! - The validate → maybe rebuild → adopt sequence runs under one mutex, so
//!   concurrent loaders observe either the prior table or the new one
//! - A persist failure means the freshly discovered table is not adopted;
//!   the error carries the io cause

use arc_swap::ArcSwapOption;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::RouterConfig;
use crate::discovery::{DiscoveryError, RouteDiscoverer};
use crate::hash::hash_file;
use crate::table::entry::{RouteEntry, RouteTable};

/// Errors surfaced by table loading and rebuilding.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The discovery pass itself failed.
    #[error("route discovery failed")]
    Discovery(#[from] DiscoveryError),

    /// Writing the route table artifact failed. The discovered table is not
    /// adopted for this cycle.
    #[error("failed to persist route table to {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Owns the active route table and its persisted mirror.
pub struct RouteTableStore {
    cache_path: PathBuf,
    discoverer: RouteDiscoverer,
    current: ArcSwapOption<RouteTable>,
    rebuild_lock: Mutex<()>,
}

impl RouteTableStore {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            cache_path: config.discovery.cache_file.clone(),
            discoverer: RouteDiscoverer::new(&config.discovery),
            current: ArcSwapOption::empty(),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// The discoverer this store rebuilds with.
    pub fn discoverer(&self) -> &RouteDiscoverer {
        &self.discoverer
    }

    /// The in-memory snapshot, if one has been adopted.
    pub fn current(&self) -> Option<Arc<RouteTable>> {
        self.current.load_full()
    }

    /// Return the active table, adopting the persisted artifact or
    /// rebuilding from the filesystem as needed.
    pub async fn load(&self) -> Result<Arc<RouteTable>, StoreError> {
        if let Some(table) = self.current.load_full() {
            return Ok(table);
        }

        let _guard = self.rebuild_lock.lock().await;

        // Another caller may have finished while we waited for the lock.
        if let Some(table) = self.current.load_full() {
            return Ok(table);
        }

        if let Some(cached) = self.read_artifact().await {
            if self.is_fresh(&cached).await {
                let table = Arc::new(cached);
                self.current.store(Some(table.clone()));
                tracing::info!(routes = table.len(), "Adopted persisted route table");
                return Ok(table);
            }
            tracing::info!("Persisted route table is stale, rebuilding");
        }

        self.rebuild_locked().await
    }

    /// Discover from scratch, persist, and swap in the new table.
    pub async fn rebuild(&self) -> Result<Arc<RouteTable>, StoreError> {
        let _guard = self.rebuild_lock.lock().await;
        self.rebuild_locked().await
    }

    /// Persist the current in-memory table, if any.
    pub async fn save(&self) -> Result<(), StoreError> {
        if let Some(table) = self.current.load_full() {
            self.persist(&table).await?;
        }
        Ok(())
    }

    async fn rebuild_locked(&self) -> Result<Arc<RouteTable>, StoreError> {
        let entries = self.discoverer.discover().await?;
        let table = RouteTable::from_entries(entries);

        self.persist(&table).await?;

        let table = Arc::new(table);
        self.current.store(Some(table.clone()));
        tracing::info!(routes = table.len(), "Route table rebuilt");
        Ok(table)
    }

    /// Read and validate the persisted artifact. Any shape problem is logged
    /// and treated as "no artifact".
    async fn read_artifact(&self) -> Option<RouteTable> {
        let bytes = match tokio::fs::read(&self.cache_path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(
                    path = %self.cache_path.display(),
                    error = %err,
                    "Cannot read route table artifact"
                );
                return None;
            }
        };

        let entries: Vec<RouteEntry> = match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(
                    path = %self.cache_path.display(),
                    error = %err,
                    "Malformed route table artifact, ignoring"
                );
                return None;
            }
        };

        let table = RouteTable::from_entries(entries);
        if let Err(err) = table.validate() {
            tracing::warn!(
                path = %self.cache_path.display(),
                error = %err,
                "Invalid route table artifact, ignoring"
            );
            return None;
        }

        Some(table)
    }

    /// A table is fresh when every entry's source file still hashes to the
    /// stored digest.
    async fn is_fresh(&self, table: &RouteTable) -> bool {
        for entry in table.entries() {
            match hash_file(&entry.file_path).await {
                Ok(digest) if digest == entry.file_hash => {}
                Ok(_) => {
                    tracing::debug!(
                        file = %entry.file_path.display(),
                        "Source file changed since last discovery"
                    );
                    return false;
                }
                Err(err) => {
                    tracing::debug!(
                        file = %entry.file_path.display(),
                        error = %err,
                        "Source file unreadable, table is stale"
                    );
                    return false;
                }
            }
        }
        true
    }

    async fn persist(&self, table: &RouteTable) -> Result<(), StoreError> {
        let persist_err = |source| StoreError::Persist {
            path: self.cache_path.clone(),
            source,
        };

        if let Some(parent) = self.cache_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(persist_err)?;
            }
        }

        let json = serde_json::to_vec_pretty(table.entries()).map_err(|err| {
            persist_err(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
        })?;

        tokio::fs::write(&self.cache_path, json)
            .await
            .map_err(persist_err)
    }
}
