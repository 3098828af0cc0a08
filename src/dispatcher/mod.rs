//! # Dispatcher Module
//!
//! Binds handlers to route nodes and invokes the right one once a request
//! has been matched and its middleware chain has let it through.
//!
//! ## Overview
//!
//! - Each route node has at most one [`Handler`]; binding again replaces it.
//! - A single not-found handler covers requests no route accepts.
//! - With no match and no not-found handler, dispatch fails with
//!   [`RouteNotFoundError`](crate::error::RouteNotFoundError).
//! - Handler failures propagate unchanged: no retry, no recovery, no
//!   wrapping.
//!
//! ## Handlers
//!
//! A handler is either an inline callable or a name resolved through a
//! [`Resolver`](crate::registry::Resolver) when the request arrives:
//!
//! ```rust
//! use groveroute::dispatcher::{Handler, HandlerResponse};
//!
//! let inline = Handler::inline(|ctx| {
//!     Ok(HandlerResponse::json(200, serde_json::json!({ "id": ctx.param("id") })))
//! });
//! let named = Handler::named("users.show");
//! # let _ = (inline, named);
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::{
    Dispatcher, Handler, HandlerFn, HandlerResponse, HeaderVec, RequestContext, MAX_INLINE_HEADERS,
};
