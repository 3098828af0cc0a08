//! # Router Module
//!
//! Route registration, grouping and request matching.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Registering routes with their method sets and URL templates
//! - Scoping routes by scheme, domain and port through nested groups
//! - Matching incoming requests and extracting domain and path parameters
//! - Composing middleware chains and handing matched requests to handlers
//!
//! ## Architecture
//!
//! The router uses a two-phase approach, expressed in two types:
//!
//! 1. **Registration** ([`RouterBuilder`]): single-threaded, `&mut self`.
//!    Placeholder fragments are registered, routes are declared (optionally
//!    inside [`group`](RouterBuilder::group) closures that push a
//!    [`GroupOptions`] level), and each template is compiled once into a
//!    [`CompiledRule`](crate::pattern::CompiledRule).
//!
//! 2. **Serving** ([`Router`]): immutable and `Send + Sync`. For each
//!    request the leaves are tried in registration order; the first whose
//!    method, scheme, domain, port and path all accept the request wins.
//!
//! ## Example
//!
//! ```rust
//! use groveroute::router::{GroupOptions, RouterBuilder};
//! use groveroute::request::RouteRequest;
//! use groveroute::dispatcher::HandlerResponse;
//! use http::Method;
//! use serde_json::json;
//!
//! let mut builder = RouterBuilder::new();
//! builder.pattern("id", r"\d+");
//! builder.get("/users/{id}", |ctx| {
//!     Ok(HandlerResponse::json(200, json!({ "user": ctx.param("id") })))
//! })?;
//! builder.group(GroupOptions::new().schemes(["https"]), |r| {
//!     r.post("/login", |_| Ok(HandlerResponse::json(204, json!(null))))?;
//!     Ok(())
//! })?;
//! let router = builder.build();
//!
//! let req = RouteRequest::new(Method::GET, "http", "api.test", "/users/42");
//! let res = router.dispatch(&req)?;
//! assert_eq!(res.body["user"], "42");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Performance
//!
//! - Literal templates compare with string equality; only templates with
//!   placeholders evaluate a regex
//! - Parameters are collected into a [`ParamVec`] that stays on the stack
//!   for up to eight captures
//! - Lookup is linear in the number of routes, which keeps precedence
//!   equal to registration order

mod builder;
mod core;
mod group;
mod node;
mod tree;

pub use builder::{RouteHandle, RouterBuilder};
pub use core::Router;
pub use group::{GroupContext, GroupOptions};
pub use node::{MethodSet, ParamVec, PortRule, RouteMatch, RouteNode, SchemeRule, MAX_INLINE_PARAMS};
pub use tree::RouteTree;
