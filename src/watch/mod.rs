//! Filesystem change watching and rebuild orchestration.
//!
//! # Data Flow
//! ```text
//! notify backend (OS events)
//!     → ChangeEvent on an unbounded channel
//!     → single consumer task (run_loop)
//!     → debounce + drain (coalesce bursts into one cycle)
//!     → run_cycle: Detecting → Rebuilding → Notifying → Idle
//! ```
//!
//! # Design Decisions
//! - One consumer task owns the rebuild state machine, so at most one
//!   rebuild is ever in flight; overlapping triggers coalesce into the next
//!   cycle instead of queueing
//! - Detection re-hashes every known route source; a hash mismatch, an
//!   unreadable known file, or an event for a new eligible source forces a
//!   rebuild, anything else is a no-op cycle
//! - A failed rebuild keeps the previous table authoritative and returns
//!   the machine to idle

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use crate::config::WatcherConfig;
use crate::handler::HandlerCache;
use crate::hash::hash_file;
use crate::table::{RouteTable, RouteTableStore};

/// One batch of changed paths reported by the filesystem backend.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub paths: Vec<PathBuf>,
}

/// What a change cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No known source changed; nothing rebuilt, nobody notified.
    NoChange,
    /// A new table was built, persisted, adopted, and announced.
    Rebuilt,
    /// The rebuild failed; the previous table remains authoritative.
    Failed,
}

/// Callback invoked synchronously after each successful rebuild.
pub type ReloadCallback = Box<dyn Fn(&Arc<RouteTable>) + Send + Sync>;

/// Watches a route root and keeps the table store in sync with it.
pub struct ChangeWatcher {
    store: Arc<RouteTableStore>,
    handlers: Arc<HandlerCache>,
    debounce: Duration,
    poll_interval: Duration,
    subscribers: Vec<ReloadCallback>,
}

impl ChangeWatcher {
    pub fn new(
        store: Arc<RouteTableStore>,
        handlers: Arc<HandlerCache>,
        config: &WatcherConfig,
    ) -> Self {
        Self {
            store,
            handlers,
            debounce: Duration::from_millis(config.debounce_ms),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            subscribers: Vec::new(),
        }
    }

    /// Register a reload callback. Callbacks run synchronously, in
    /// registration order, after each successful rebuild. A panicking
    /// callback is logged and skipped; the rest still run.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn(&Arc<RouteTable>) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Start watching the route root in the background.
    ///
    /// Returns the filesystem watcher handle; dropping it stops event
    /// delivery, so the caller must keep it alive.
    pub fn spawn(
        self,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<RecommendedWatcher, notify::Error> {
        let root = self.store.discoverer().root().to_path_buf();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        let _ = tx.send(ChangeEvent { paths: event.paths });
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(&root, RecursiveMode::Recursive)?;
        tracing::info!(root = %root.display(), "Change watcher started");

        tokio::spawn(self.run_loop(rx, shutdown));
        Ok(watcher)
    }

    /// Consume change events until the channel closes or shutdown fires.
    ///
    /// Public so tests can drive the loop with a hand-fed channel instead of
    /// a real filesystem backend.
    pub async fn run_loop(
        self,
        mut rx: mpsc::UnboundedReceiver<ChangeEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            let first = tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
                _ = shutdown.recv() => break,
            };

            if !self.debounce.is_zero() {
                tokio::time::sleep(self.debounce).await;
            }

            // Coalesce everything that arrived during the quiet window (and
            // anything that piled up while a previous cycle ran).
            let mut batch = vec![first];
            while let Ok(event) = rx.try_recv() {
                batch.push(event);
            }

            self.run_cycle(&batch).await;
        }

        tracing::debug!("Change watcher stopped");
    }

    /// One Detecting → Rebuilding → Notifying pass.
    pub async fn run_cycle(&self, events: &[ChangeEvent]) -> CycleOutcome {
        tracing::debug!(events = events.len(), "Change cycle: detecting");

        let previous = self.store.current();
        let changed = match &previous {
            Some(table) => self.detect(table, events).await,
            // No table adopted yet; build the first one.
            None => true,
        };

        if !changed {
            tracing::debug!("Change cycle: no source differs, back to idle");
            return CycleOutcome::NoChange;
        }

        tracing::info!("Route sources changed, rebuilding table");
        let new_table = match self.store.rebuild().await {
            Ok(table) => table,
            Err(err) => {
                tracing::error!(error = %err, "Rebuild failed; previous route table stays active");
                return CycleOutcome::Failed;
            }
        };

        if let Some(previous) = previous {
            self.invalidate_changed(&previous, &new_table);
        }

        tracing::debug!(
            subscribers = self.subscribers.len(),
            "Change cycle: notifying"
        );
        // A misbehaving subscriber must not take down the consumer task.
        for callback in &self.subscribers {
            if catch_unwind(AssertUnwindSafe(|| callback(&new_table))).is_err() {
                tracing::error!("Reload subscriber panicked; continuing with the rest");
            }
        }

        CycleOutcome::Rebuilt
    }

    /// Does anything differ from the known table?
    async fn detect(&self, table: &RouteTable, events: &[ChangeEvent]) -> bool {
        for entry in table.entries() {
            match hash_file(&entry.file_path).await {
                Ok(digest) if digest == entry.file_hash => {}
                _ => return true,
            }
        }

        // A brand-new route file is not in the table yet, so the hash sweep
        // above cannot see it.
        events
            .iter()
            .flat_map(|event| event.paths.iter())
            .any(|path| {
                self.store.discoverer().is_eligible_file(path) && !table.contains_path(path)
            })
    }

    /// Drop cached handlers whose source changed or disappeared.
    fn invalidate_changed(&self, previous: &RouteTable, current: &RouteTable) {
        for entry in previous.entries() {
            let unchanged = current
                .get(entry.method, &entry.url)
                .map(|now| {
                    now.file_hash == entry.file_hash && now.handler_module == entry.handler_module
                })
                .unwrap_or(false);

            if !unchanged && self.handlers.invalidate(&entry.handler_module) {
                tracing::debug!(
                    reference = %entry.handler_module,
                    "Invalidated cached handler"
                );
            }
        }
    }
}
