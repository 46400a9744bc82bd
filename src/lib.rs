//! Filesystem-convention HTTP router.
//!
//! Turns a directory of handler files into a live route table: file names
//! encode HTTP methods (`users.post.rs`), directory positions encode URL
//! patterns (`users/_id.get.rs` → `GET /users/:id`), and the table follows
//! the filesystem as files change.
//!
//! # Data Flow
//! ```text
//! filesystem → discovery → table store → binder → HTTP layer
//! file change → watcher → discovery (rebuild) → store (swap)
//!             → binder (re-bind) → subscriber notification
//! ```

pub mod bind;
pub mod config;
pub mod discovery;
pub mod handler;
pub mod hash;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod table;
pub mod watch;

pub use bind::HotRouter;
pub use config::RouterConfig;
pub use discovery::{HttpMethod, RouteDiscoverer};
pub use handler::{HandlerCache, ModuleRegistry};
pub use http::RouteServer;
pub use lifecycle::Shutdown;
pub use table::{RouteEntry, RouteTable, RouteTableStore};
pub use watch::ChangeWatcher;
