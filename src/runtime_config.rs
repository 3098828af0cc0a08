//! # Runtime Configuration Module
//!
//! Environment-driven settings that change how the router matches requests.
//!
//! ## Environment Variables
//!
//! ### `ROUTER_DEFAULT_PARAM_PATTERN`
//!
//! Regex fragment for placeholders that have no registered pattern.
//! Default: `[^/]+` (one path segment).
//!
//! ### `ROUTER_STRICT_TRAILING_SLASH`
//!
//! `true` (default) matches paths exactly. `false` retries a request path
//! that ends in a single `/` without it, so `/users/` reaches `/users`.
//!
//! ### `ROUTER_SLOW_LOOKUP_US`
//!
//! Lookup duration in microseconds above which a successful match is
//! logged at `warn` instead of `info`. Default: `1000`.
//!
//! ## Usage
//!
//! ```rust
//! use groveroute::runtime_config::RouterConfig;
//! use groveroute::router::RouterBuilder;
//!
//! let config = RouterConfig::from_env();
//! let builder = RouterBuilder::with_config(config);
//! ```
//!
//! Unparseable values fall back to the defaults.

use crate::pattern::DEFAULT_PARAM_PATTERN;
use std::env;
use std::time::Duration;

const DEFAULT_SLOW_LOOKUP_US: u64 = 1000;

/// Router behaviour knobs, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Fragment used for `{name}` placeholders without a registered pattern
    pub default_param_pattern: String,
    /// Match request paths exactly, trailing slash included
    pub strict_trailing_slash: bool,
    /// Lookups slower than this are logged at warn level
    pub slow_lookup_threshold: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_param_pattern: DEFAULT_PARAM_PATTERN.to_string(),
            strict_trailing_slash: true,
            slow_lookup_threshold: Duration::from_micros(DEFAULT_SLOW_LOOKUP_US),
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_param_pattern = lookup("ROUTER_DEFAULT_PARAM_PATTERN")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.default_param_pattern);

        let strict_trailing_slash = lookup("ROUTER_STRICT_TRAILING_SLASH")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.strict_trailing_slash);

        let slow_lookup_threshold = lookup("ROUTER_SLOW_LOOKUP_US")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map_or(defaults.slow_lookup_threshold, Duration::from_micros);

        RouterConfig {
            default_param_pattern,
            strict_trailing_slash,
            slow_lookup_threshold,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> RouterConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RouterConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config_from(&[]), RouterConfig::default());
    }

    #[test]
    fn test_values_are_read() {
        let config = config_from(&[
            ("ROUTER_DEFAULT_PARAM_PATTERN", "[A-Za-z0-9]+"),
            ("ROUTER_STRICT_TRAILING_SLASH", "off"),
            ("ROUTER_SLOW_LOOKUP_US", "250"),
        ]);
        assert_eq!(config.default_param_pattern, "[A-Za-z0-9]+");
        assert!(!config.strict_trailing_slash);
        assert_eq!(config.slow_lookup_threshold, Duration::from_micros(250));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("ROUTER_DEFAULT_PARAM_PATTERN", "  "),
            ("ROUTER_STRICT_TRAILING_SLASH", "maybe"),
            ("ROUTER_SLOW_LOOKUP_US", "fast"),
        ]);
        assert_eq!(config, RouterConfig::default());
    }
}
