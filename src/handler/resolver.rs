//! Memoized handler resolution with fallback synthesis.
//!
//! # Responsibilities
//! - Validate module references (`file://` scheme only)
//! - Resolve references through the configured `HandlerSource`
//! - Cache every outcome, including synthesized fallbacks
//! - Invalidate entries when a rebuild changes their source
//!
//! # Design Decisions
//! - Fallbacks encode the failure in the response status: 501 when a module
//!   has no usable export, 500 when loading fails or the reference scheme is
//!   unsupported
//! - The cache maps reference string → handler; identical references always
//!   return the same `Arc` instance

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use super::registry::HandlerSource;
use super::{HandlerFuture, RouteHandler};

/// A module reference used an addressing scheme other than `file://`.
#[derive(Debug, Clone, Error)]
#[error("unsupported module reference scheme {scheme:?} in {reference} (only file:// is supported)")]
pub struct UnsupportedReference {
    pub reference: String,
    pub scheme: String,
}

/// Memoizing resolver from module references to request handlers.
pub struct HandlerCache {
    resolved: DashMap<String, RouteHandler>,
    source: Arc<dyn HandlerSource>,
}

impl HandlerCache {
    pub fn new(source: Arc<dyn HandlerSource>) -> Self {
        Self {
            resolved: DashMap::new(),
            source,
        }
    }

    /// Resolve a module reference to a handler.
    ///
    /// Never fails: unresolvable references yield a cached fallback handler
    /// whose status reports the failure mode.
    pub fn resolve(&self, module_ref: &str) -> RouteHandler {
        if let Some(handler) = self.resolved.get(module_ref) {
            return handler.clone();
        }

        let handler = self.resolve_uncached(module_ref);
        self.resolved
            .entry(module_ref.to_string())
            .or_insert(handler)
            .clone()
    }

    /// Drop the cached handler for a reference, forcing re-resolution.
    pub fn invalidate(&self, module_ref: &str) -> bool {
        self.resolved.remove(module_ref).is_some()
    }

    /// Number of cached resolutions.
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    fn resolve_uncached(&self, module_ref: &str) -> RouteHandler {
        let path = match reference_path(module_ref) {
            Ok(path) => path,
            Err(err) => {
                tracing::error!(reference = module_ref, error = %err, "Rejected module reference");
                return fallback(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error: unsupported handler reference",
                );
            }
        };

        match self.source.load(&path) {
            Ok(module) => match module.into_callable() {
                Some(handler) => handler,
                None => {
                    tracing::warn!(
                        reference = module_ref,
                        "Module exports no usable handler (no default or `handler`)"
                    );
                    fallback(StatusCode::NOT_IMPLEMENTED, "Not Implemented")
                }
            },
            Err(err) => {
                tracing::error!(reference = module_ref, error = %err, "Handler module failed to load");
                fallback(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error: handler failed to load",
                )
            }
        }
    }
}

/// Turn a `file://` module reference into a filesystem path.
fn reference_path(module_ref: &str) -> Result<PathBuf, UnsupportedReference> {
    let unsupported = |scheme: &str| UnsupportedReference {
        reference: module_ref.to_string(),
        scheme: scheme.to_string(),
    };

    let url = Url::parse(module_ref).map_err(|_| unsupported("<unparseable>"))?;
    if url.scheme() != "file" {
        return Err(unsupported(url.scheme()));
    }
    url.to_file_path().map_err(|()| unsupported("file"))
}

/// Synthesize a handler that reports a failure status.
fn fallback(status: StatusCode, body: &'static str) -> RouteHandler {
    Arc::new(move |_req: Request<Body>| -> HandlerFuture {
        Box::pin(async move { (status, body).into_response() })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::handler::registry::{HandlerModule, ModuleLoadError, ModuleRegistry};

    fn cache_with_registry() -> (Arc<ModuleRegistry>, HandlerCache) {
        let registry = Arc::new(ModuleRegistry::new());
        let cache = HandlerCache::new(registry.clone());
        (registry, cache)
    }

    async fn status_of(handler: &RouteHandler) -> StatusCode {
        handler(Request::builder().body(Body::empty()).unwrap())
            .await
            .status()
    }

    #[tokio::test]
    async fn resolve_returns_the_same_instance_twice() {
        let (registry, cache) = cache_with_registry();
        registry.register_default(
            "/routes/users.get.rs",
            handler_fn(|_req| async { StatusCode::OK.into_response() }),
        );

        let first = cache.resolve("file:///routes/users.get.rs");
        let second = cache.resolve("file:///routes/users.get.rs");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(status_of(&first).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_export_falls_back_to_501() {
        let (registry, cache) = cache_with_registry();
        registry.register("/routes/stub.get.rs", || Ok(HandlerModule::default()));

        let handler = cache.resolve("file:///routes/stub.get.rs");
        assert_eq!(status_of(&handler).await, StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn load_failure_falls_back_to_500_and_is_cached() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let (registry, cache) = cache_with_registry();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        registry.register("/routes/broken.get.rs", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ModuleLoadError::LoadFailed("boom".into()))
        });

        let first = cache.resolve("file:///routes/broken.get.rs");
        assert_eq!(status_of(&first).await, StatusCode::INTERNAL_SERVER_ERROR);

        let second = cache.resolve("file:///routes/broken.get.rs");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(attempts.load(Ordering::SeqCst), 1, "load must not be retried");
    }

    #[tokio::test]
    async fn non_file_scheme_fails_closed() {
        let (_registry, cache) = cache_with_registry();
        let handler = cache.resolve("https://example.com/handler.rs");
        assert_eq!(status_of(&handler).await, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn invalidate_forces_re_resolution() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let (registry, cache) = cache_with_registry();
        let loads = Arc::new(AtomicU32::new(0));
        let counter = loads.clone();
        registry.register("/routes/users.get.rs", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(HandlerModule::from_default(handler_fn(|_req| async {
                StatusCode::OK.into_response()
            })))
        });

        let first = cache.resolve("file:///routes/users.get.rs");
        cache.resolve("file:///routes/users.get.rs");
        assert_eq!(loads.load(Ordering::SeqCst), 1, "cached resolve must not reload");

        assert!(cache.invalidate("file:///routes/users.get.rs"));
        let second = cache.resolve("file:///routes/users.get.rs");
        assert_eq!(loads.load(Ordering::SeqCst), 2, "invalidation must force a reload");
        assert_eq!(status_of(&first).await, StatusCode::OK);
        assert_eq!(status_of(&second).await, StatusCode::OK);
    }
}
