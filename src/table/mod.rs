//! Route table subsystem.
//!
//! # Data Flow
//! ```text
//! discovery
//!     → entry.rs (RouteEntry construction, duplicate policy)
//!     → store.rs (persist to JSON artifact, adopt in-memory snapshot)
//!     → binder (reads whole snapshots)
//!
//! On reload:
//!     watcher detects change
//!     → store.rebuild()
//!     → atomic snapshot swap
//!     → binder re-binds
//! ```

pub mod entry;
pub mod store;

pub use entry::{EntryInvalid, HandlerType, RouteEntry, RouteTable};
pub use store::{RouteTableStore, StoreError};
