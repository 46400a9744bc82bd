//! HTTP serving glue around the hot-swappable router.

pub mod server;

pub use server::RouteServer;
