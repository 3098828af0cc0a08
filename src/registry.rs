//! Resolution of named handler and middleware references.
//!
//! Routes may be bound to `Handler::Named("users.show")` or use
//! `MiddlewareRef::Named("auth")` instead of inline callables. A
//! [`Resolver`] installed on the router turns those names into callables
//! when a request needs them. [`HandlerRegistry`] is the in-memory
//! implementation; applications with their own container implement the
//! trait directly.

use crate::dispatcher::{HandlerFn, HandlerResponse, RequestContext};
use crate::middleware::Middleware;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Looks up callables by name at dispatch time.
pub trait Resolver: Send + Sync {
    fn handler(&self, name: &str) -> Option<Arc<dyn HandlerFn>>;
    fn middleware(&self, name: &str) -> Option<Arc<dyn Middleware>>;
}

/// Name → callable tables for handlers and middleware.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn HandlerFn>>,
    middleware: HashMap<String, Arc<dyn Middleware>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous one.
    pub fn register_handler<F>(&mut self, name: &str, handler_fn: F) -> &mut Self
    where
        F: Fn(&RequestContext<'_>) -> anyhow::Result<HandlerResponse> + Send + Sync + 'static,
    {
        if self.handlers.insert(name.to_string(), Arc::new(handler_fn)).is_some() {
            warn!(handler_name = %name, "Replaced existing named handler");
        } else {
            info!(
                handler_name = %name,
                total_handlers = self.handlers.len(),
                "Named handler registered"
            );
        }
        self
    }

    /// Register middleware under `name`, replacing any previous one.
    pub fn register_middleware<M>(&mut self, name: &str, middleware: Arc<M>) -> &mut Self
    where
        M: Middleware + 'static,
    {
        if self.middleware.insert(name.to_string(), middleware).is_some() {
            warn!(middleware_name = %name, "Replaced existing named middleware");
        } else {
            info!(middleware_name = %name, "Named middleware registered");
        }
        self
    }

    #[must_use]
    pub fn handler_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Resolver for HandlerRegistry {
    fn handler(&self, name: &str) -> Option<Arc<dyn HandlerFn>> {
        self.handlers.get(name).cloned()
    }

    fn middleware(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.middleware.get(name).cloned()
    }
}
