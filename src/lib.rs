//! # groveroute
//!
//! **groveroute** is a host-aware HTTP request router: it matches requests
//! against routes declared with URL templates, scoped by scheme, domain and
//! port through nested groups, runs group-scoped middleware and hands the
//! request to the bound handler.
//!
//! ## Overview
//!
//! The crate does not own a socket or parse HTTP. A transport (hyper, a
//! coroutine server, a test harness) converts its request into a
//! [`RouteRequest`](request::RouteRequest), calls
//! [`Router::dispatch`](router::Router::dispatch) and writes out the returned
//! [`HandlerResponse`](dispatcher::HandlerResponse).
//!
//! ## Architecture
//!
//! - **[`pattern`]** - Placeholder fragments and template compilation
//! - **[`router`]** - Route tree, groups, the registration builder and the frozen router
//! - **[`middleware`]** - Middleware trait, group-scoped tables and chain execution
//! - **[`dispatcher`]** - Handler bindings, not-found fallback, request context
//! - **[`request`]** - Inbound request abstraction
//! - **[`registry`]** - Name-based resolution of handlers and middleware
//! - **[`hot_reload`]** - Lock-free swapping of rebuilt routers
//! - **[`runtime_config`]** / **[`logging`]** - Environment-driven configuration and tracing setup
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Transport
//!     participant Router
//!     participant Tree as RouteTree
//!     participant Chain as Middleware Chain
//!     participant Dispatcher
//!     participant Handler
//!
//!     Transport->>Router: dispatch(RouteRequest)
//!     Router->>Tree: lookup(method, scheme, host, port, path)
//!     alt No match
//!         Tree-->>Router: None
//!         Router->>Dispatcher: execute(no node)
//!         Dispatcher-->>Transport: not-found response or RouteNotFoundError
//!     end
//!     Tree-->>Router: RouteMatch(node, params)
//!     Router->>Chain: call_middleware(global, group..., route)
//!     alt Short-circuit
//!         Chain-->>Transport: middleware response
//!     end
//!     Router->>Dispatcher: execute(node)
//!     Dispatcher->>Handler: call(RequestContext)
//!     Handler-->>Router: HandlerResponse
//!     Router->>Chain: after hooks (reverse order)
//!     Router-->>Transport: HandlerResponse
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use groveroute::dispatcher::HandlerResponse;
//! use groveroute::middleware::AuthMiddleware;
//! use groveroute::request::RouteRequest;
//! use groveroute::router::{GroupOptions, RouterBuilder};
//! use http::Method;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let mut builder = RouterBuilder::new();
//! builder.pattern("id", r"\d+");
//!
//! builder.get("/", |_| Ok(HandlerResponse::json(200, json!("home"))))?;
//!
//! builder.group(
//!     GroupOptions::new()
//!         .domain("{account}.example.com")
//!         .middleware(Arc::new(AuthMiddleware::new("secret"))),
//!     |r| {
//!         r.get("/orders/{id}", |ctx| {
//!             Ok(HandlerResponse::json(200, json!({
//!                 "account": ctx.param("account"),
//!                 "order": ctx.param("id"),
//!             })))
//!         })?
//!         .name("orders.show");
//!         Ok(())
//!     },
//! )?;
//!
//! let router = builder.build();
//!
//! let req = RouteRequest::new(Method::GET, "https", "acme.example.com", "/orders/7")
//!     .with_header("authorization", "Bearer secret");
//! let res = router.dispatch(&req)?;
//! assert_eq!(res.body["account"], "acme");
//! assert_eq!(router.url("orders.show", &[("id", "8")]).as_deref(), Some("/orders/8"));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Host-aware**: scheme, domain (with captures) and port constraints per group
//! - **Nested groups**: unset options are inherited; the group stack is
//!   restored even when a group closure fails
//! - **Middleware**: group-scoped and route-scoped, short-circuiting, with `after` hooks
//! - **Named routes**: reverse URL generation from a route name
//! - **Named handlers**: handlers and middleware referenced by name and
//!   resolved per request
//! - **Hot reload**: rebuild and swap a router without blocking readers
//!
//! ## Concurrency
//!
//! Registration is single-threaded and happens on a `RouterBuilder`. The
//! built `Router` is immutable and `Send + Sync`; every request gets its own
//! [`RequestContext`](dispatcher::RequestContext), so concurrent dispatches
//! never share parameter state.

pub mod dispatcher;
pub mod error;
pub mod hot_reload;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod pattern;
pub mod registry;
pub mod request;
pub mod router;
pub mod runtime_config;

pub use dispatcher::{Handler, HandlerResponse, RequestContext};
pub use error::{
    PatternCompileError, RouteNotFoundError, RouteRegistrationError, UnresolvedReferenceError,
};
pub use hot_reload::SharedRouter;
pub use middleware::{Middleware, MiddlewareRef};
pub use registry::{HandlerRegistry, Resolver};
pub use request::RouteRequest;
pub use router::{GroupOptions, RouteNode, Router, RouterBuilder};
pub use runtime_config::RouterConfig;
