//! Error types raised by route registration and dispatch.
//!
//! Handler and middleware failures are not represented here: they travel
//! as `anyhow::Error` straight from the callable to the caller of
//! [`Router::dispatch`](crate::router::Router::dispatch). Use
//! `err.downcast_ref::<RouteNotFoundError>()` to tell a missing route apart
//! from an application failure.

use std::fmt;

/// A URL or domain template could not be compiled into a regular expression.
///
/// Raised at registration time; the offending route is not added.
#[derive(Debug)]
pub struct PatternCompileError {
    /// The template as written by the caller (e.g. `/users/{id}`)
    pub template: String,
    /// The regex source that failed to compile
    pub pattern: String,
    pub source: regex::Error,
}

impl fmt::Display for PatternCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to compile route template '{}' (regex '{}'): {}",
            self.template, self.pattern, self.source
        )
    }
}

impl std::error::Error for PatternCompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// A route could not be added to the routing table.
#[derive(Debug)]
pub enum RouteRegistrationError {
    /// The route's path template did not compile
    Pattern(PatternCompileError),
    /// Every node id has been handed out; ids are never reused
    NodeLimit { limit: usize },
}

impl fmt::Display for RouteRegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteRegistrationError::Pattern(err) => err.fmt(f),
            RouteRegistrationError::NodeLimit { limit } => {
                write!(f, "route table is full: all {limit} node ids are in use")
            }
        }
    }
}

impl std::error::Error for RouteRegistrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteRegistrationError::Pattern(err) => Some(&err.source),
            RouteRegistrationError::NodeLimit { .. } => None,
        }
    }
}

impl From<PatternCompileError> for RouteRegistrationError {
    fn from(err: PatternCompileError) -> Self {
        RouteRegistrationError::Pattern(err)
    }
}

/// No route matched and no not-found handler was registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNotFoundError {
    pub method: String,
    pub host: String,
    pub path: String,
}

impl fmt::Display for RouteNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no route for {} {}{} and no not-found handler registered",
            self.method, self.host, self.path
        )
    }
}

impl std::error::Error for RouteNotFoundError {}

/// Which kind of named reference failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Handler,
    Middleware,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Handler => f.write_str("handler"),
            ReferenceKind::Middleware => f.write_str("middleware"),
        }
    }
}

/// A `Named` handler or middleware reference is unknown to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReferenceError {
    pub kind: ReferenceKind,
    pub name: String,
}

impl fmt::Display for UnresolvedReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' is not registered with the resolver", self.kind, self.name)
    }
}

impl std::error::Error for UnresolvedReferenceError {}
