//! Handler resolution subsystem.
//!
//! # Data Flow
//! ```text
//! RouteEntry.handlerModule ("file://...")
//!     → resolver.rs (scheme check, memoized resolve)
//!     → registry.rs (HandlerSource lookup: module ref → HandlerModule)
//!     → export selection (default, then `handler`, one `.handler` unwrap)
//!     → RouteHandler (or synthesized 501/500 fallback)
//! ```
//!
//! # Design Decisions
//! - Resolution is a capability trait (`HandlerSource`), so the route-table
//!   format is independent of how handlers are actually produced
//! - Every resolution outcome is cached, including the fallbacks: the cost
//!   is paid at most once per module reference until invalidated
//! - Failures degrade to diagnostic-status handlers instead of crashing the
//!   route

pub mod registry;
pub mod resolver;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

pub use registry::{HandlerModule, HandlerSource, ModuleExport, ModuleLoadError, ModuleRegistry};
pub use resolver::{HandlerCache, UnsupportedReference};

/// The callable that produces a response for a matched request.
pub type RouteHandler = Arc<dyn Fn(Request<Body>) -> HandlerFuture + Send + Sync>;

/// Boxed response future returned by a [`RouteHandler`].
pub type HandlerFuture = BoxFuture<'static, Response>;

/// Wrap an async function as a [`RouteHandler`].
pub fn handler_fn<F, Fut>(f: F) -> RouteHandler
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req| -> HandlerFuture { Box::pin(f(req)) })
}
