//! Route discovery subsystem.
//!
//! # Data Flow
//! ```text
//! route root directory
//!     → walker.rs (recursive enumeration, skip rules)
//!     → method.rs (file base name → HTTP method + route name)
//!     → path.rs (filesystem position → URL pattern)
//!     → hash.rs (content digest for change detection)
//!     → Vec<RouteEntry> in traversal order
//! ```
//!
//! # Design Decisions
//! - Filename convention: `<routeName>.<method>.<ext>`; no method suffix
//!   means GET
//! - Directory convention: first segment under the root is the module name;
//!   `index` segments vanish from URLs; `_name` segments become `:name`
//!   parameters
//! - Per-file failures degrade to warnings; the scan always completes

pub mod method;
pub mod path;
pub mod walker;

pub use method::{parse_base_name, HttpMethod, UnknownMethod};
pub use path::{build_url_path, normalize_url, to_kebab_case};
pub use walker::{DiscoveryError, RouteDiscoverer};
