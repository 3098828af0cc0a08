//! # Pattern Module
//!
//! Compiles URL and domain templates such as `/users/{id}` or
//! `{sub}.example.com` into matchable rules.
//!
//! ## Overview
//!
//! A [`PatternRegistry`] maps placeholder names to regular-expression
//! fragments (`id` → `\d+`). Compiling a template substitutes every
//! `{name}` token with its fragment wrapped in a named capture group and
//! anchors the result so it matches the whole input, never a substring.
//! Placeholders without a registered fragment fall back to the registry's
//! default, "any non-slash segment" (`[^/]+`).
//!
//! Templates without any placeholder compile to a literal rule and are
//! matched with plain string equality instead of a regex evaluation.
//!
//! ## Lifecycle
//!
//! The registry is an explicit value owned by the
//! [`RouterBuilder`](crate::router::RouterBuilder). It is consulted only while
//! routes are registered; the frozen [`Router`](crate::router::Router) keeps
//! the already-compiled rules and never touches the registry again.
//!
//! ## Example
//!
//! ```rust
//! use groveroute::pattern::PatternRegistry;
//! use groveroute::router::ParamVec;
//!
//! let mut patterns = PatternRegistry::new();
//! patterns.register("id", r"\d+");
//!
//! let compiled = patterns.compile("/users/{id}").unwrap();
//! assert!(!compiled.rule.is_literal());
//!
//! let mut params = ParamVec::new();
//! assert!(compiled.rule.matches("/users/42", &mut params));
//! assert_eq!(params[0].1, "42");
//! ```

mod core;

pub use core::{
    expand_template, placeholder_names, CompiledRule, CompiledTemplate, PatternRegistry,
    DEFAULT_PARAM_PATTERN,
};
