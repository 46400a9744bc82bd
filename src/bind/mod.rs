//! Router binding: route table → live HTTP dispatch.
//!
//! # Responsibilities
//! - Translate route-table URLs into the dispatch layer's path syntax
//! - Bind each `(method, url)` pair to a wrapped handler
//! - Swap whole routers atomically when the table is replaced
//!
//! # Design Decisions
//! - The wrapped handler re-resolves from the handler cache on every request
//!   (cheap after the first resolution) and maps panics to 500 instead of
//!   letting them reach the HTTP layer's own error path
//! - Table replacement is a full re-bind: a fresh router is built from the
//!   new table and swapped in, so removed routes 404 immediately
//! - URL parameters use `:name` in the table and `{name}` at bind time

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Service, ServiceExt};

use crate::discovery::HttpMethod;
use crate::handler::HandlerCache;
use crate::table::RouteTable;

/// Convert a route-table URL (`/users/:id`) to the dispatch layer's
/// parameter syntax (`/users/{id}`).
pub fn axum_path(url: &str) -> String {
    if url == "/" {
        return url.to_string();
    }

    let converted: Vec<String> = url
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect();
    converted.join("/")
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Delete => MethodFilter::DELETE,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Head => MethodFilter::HEAD,
        HttpMethod::Options => MethodFilter::OPTIONS,
        HttpMethod::Trace => MethodFilter::TRACE,
        HttpMethod::Connect => MethodFilter::CONNECT,
    }
}

/// Erase parameter names so paths that collide at the dispatch layer
/// compare equal (`/users/{id}` and `/users/{name}` share a shape).
fn path_shape(path: &str) -> String {
    let erased: Vec<&str> = path
        .split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 1 {
                "{}"
            } else {
                segment
            }
        })
        .collect();
    erased.join("/")
}

/// Registration-failure fallback: bound in place of a handler whose route
/// could not be registered as declared.
async fn registration_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error: route registration failed",
    )
        .into_response()
}

/// One dispatch path and the methods bound under it.
struct BoundPath {
    shape: String,
    path: String,
    methods: Vec<HttpMethod>,
    router: MethodRouter,
}

/// Build a dispatch router for a route table.
///
/// Entries sharing a URL are merged into one method router. The duplicate
/// policy has already run when the table was assembled, but entries can
/// still collide at the dispatch layer: two URLs whose parameter names
/// differ at the same position map to the same match tree node, and
/// registering the second as declared would abort the bind. Such entries
/// get the registration-failure fallback under the first-bound path shape
/// instead.
pub fn build_router(table: &RouteTable, handlers: &Arc<HandlerCache>) -> Router {
    let mut bound: Vec<BoundPath> = Vec::new();

    for entry in table.entries() {
        let path = axum_path(&entry.url);
        let shape = path_shape(&path);
        let filter = method_filter(entry.method);

        let cache = handlers.clone();
        let module_ref = entry.handler_module.clone();
        let wrapped = move |req: Request<Body>| {
            let cache = cache.clone();
            let module_ref = module_ref.clone();
            async move {
                let handler = cache.resolve(&module_ref);
                match AssertUnwindSafe(handler(req)).catch_unwind().await {
                    Ok(response) => response,
                    Err(_) => {
                        tracing::error!(reference = %module_ref, "Handler panicked");
                        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                            .into_response()
                    }
                }
            }
        };

        match bound.iter_mut().find(|b| b.shape == shape) {
            Some(slot) => {
                if slot.methods.contains(&entry.method) {
                    tracing::warn!(
                        url = %entry.url,
                        method = %entry.method,
                        bound = %slot.path,
                        "Method already bound for this path shape; entry dropped"
                    );
                    continue;
                }
                slot.methods.push(entry.method);

                if slot.path == path {
                    slot.router = std::mem::take(&mut slot.router).on(filter, wrapped);
                } else {
                    tracing::warn!(
                        url = %entry.url,
                        method = %entry.method,
                        bound = %slot.path,
                        "Route parameter names conflict with a previously bound path; \
                         serving a registration-failure response"
                    );
                    slot.router =
                        std::mem::take(&mut slot.router).on(filter, registration_failed);
                }
            }
            None => bound.push(BoundPath {
                shape,
                path,
                methods: vec![entry.method],
                router: MethodRouter::new().on(filter, wrapped),
            }),
        }
    }

    let mut router = Router::new();
    for slot in bound {
        router = router.route(&slot.path, slot.router);
    }
    router
}

/// A dispatch service whose underlying router can be swapped at runtime.
///
/// Requests always see a complete router: either the one bound before the
/// swap or the one bound after, never a partial bind.
#[derive(Clone)]
pub struct HotRouter {
    inner: Arc<ArcSwap<Router>>,
}

impl HotRouter {
    /// Start with an empty router; everything 404s until the first rebind.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(Router::new())),
        }
    }

    /// Bind a table and swap the result in as the live router.
    pub fn rebind(&self, table: &RouteTable, handlers: &Arc<HandlerCache>) {
        let router = build_router(table, handlers);
        self.inner.store(Arc::new(router));
        tracing::info!(routes = table.len(), "Route table bound");
    }

    /// A clone of the currently live router.
    pub fn snapshot(&self) -> Router {
        (*self.inner.load_full()).clone()
    }
}

impl Default for HotRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for HotRouter {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let router = self.snapshot();
        Box::pin(router.oneshot(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_are_rewritten_for_the_dispatch_layer() {
        assert_eq!(axum_path("/users/:id"), "/users/{id}");
        assert_eq!(axum_path("/orgs/:teamId/members"), "/orgs/{teamId}/members");
        assert_eq!(axum_path("/plain/path"), "/plain/path");
        assert_eq!(axum_path("/"), "/");
    }

    #[test]
    fn shapes_ignore_parameter_names() {
        assert_eq!(path_shape("/users/{id}"), path_shape("/users/{name}"));
        assert_eq!(path_shape("/users/{id}/posts"), "/users/{}/posts");
        assert_ne!(path_shape("/users/{id}"), path_shape("/users/literal"));
        assert_ne!(path_shape("/users/{id}"), path_shape("/users/{id}/posts"));
    }
}
