//! # Hot Reload Module
//!
//! A frozen [`Router`] never changes. Changing the routing table at runtime
//! means building a new router and swapping it in; [`SharedRouter`] holds the
//! current one behind an `ArcSwap` so serving threads read it without
//! locking while a rebuild is installed.
//!
//! ## Usage
//!
//! ```rust
//! use groveroute::hot_reload::SharedRouter;
//! use groveroute::router::RouterBuilder;
//! use groveroute::request::RouteRequest;
//! use groveroute::dispatcher::HandlerResponse;
//! use http::Method;
//!
//! let shared = SharedRouter::new(RouterBuilder::new().build());
//!
//! let mut next = RouterBuilder::new();
//! next.get("/health", |_| Ok(HandlerResponse::json(200, serde_json::json!("ok"))))?;
//! shared.replace(next.build());
//!
//! let req = RouteRequest::new(Method::GET, "http", "localhost", "/health");
//! assert_eq!(shared.dispatch(&req)?.status, 200);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Semantics
//!
//! - Requests already in flight keep the router they loaded and finish on it
//! - Requests starting after [`SharedRouter::replace`] see the new router
//! - There is no partial state: a reader sees either the old table or the
//!   new one, never a mix

use crate::dispatcher::HandlerResponse;
use crate::request::RouteRequest;
use crate::router::Router;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

/// Atomically replaceable handle to the current [`Router`].
pub struct SharedRouter {
    current: ArcSwap<Router>,
}

impl SharedRouter {
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
        }
    }

    /// Snapshot of the router serving new requests.
    #[must_use]
    pub fn load(&self) -> Arc<Router> {
        self.current.load_full()
    }

    /// Install `router` for every request that starts from now on and
    /// return the one it replaced.
    pub fn replace(&self, router: Router) -> Arc<Router> {
        let routes_count = router.routes().len();
        let previous = self.current.swap(Arc::new(router));
        info!(
            routes_count = routes_count,
            previous_routes_count = previous.routes().len(),
            "hot-reload: router replaced"
        );
        previous
    }

    /// Dispatch on the current router.
    pub fn dispatch(&self, request: &RouteRequest) -> anyhow::Result<HandlerResponse> {
        self.current.load().dispatch(request)
    }
}

impl From<Router> for SharedRouter {
    fn from(router: Router) -> Self {
        Self::new(router)
    }
}

impl std::fmt::Debug for SharedRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRouter")
            .field("current", &self.current.load_full())
            .finish()
    }
}
