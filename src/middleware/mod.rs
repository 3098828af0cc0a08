//! # Middleware Module
//!
//! Group-scoped middleware and its composition into per-route chains.
//!
//! Middleware registered while a group is open is stored under that
//! group's name in a [`MiddlewareTable`]. At dispatch time the chain for the
//! matched route is the concatenation of the lists of all its groups,
//! outermost first, followed by middleware attached to the route itself.
//! The chain runs left to right; the first middleware returning a response
//! short-circuits the rest of the chain and the handler.

mod auth;
mod core;
mod table;
mod tracing;

pub use auth::AuthMiddleware;
pub use core::{from_fn, FnMiddleware, Middleware, MiddlewareRef};
pub use table::{ChainOutcome, ChainRun, MiddlewareTable};
pub use tracing::TracingMiddleware;
