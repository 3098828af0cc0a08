//! Inbound request abstraction.
//!
//! The router never parses wire bytes. A transport hands it a
//! [`RouteRequest`] carrying method, scheme, host, optional explicit port,
//! path and headers; conversion from an [`http::Request`] is provided.

use crate::dispatcher::HeaderVec;
use http::Method;
use std::sync::Arc;

pub const SCHEME_HTTP: &str = "http";
pub const SCHEME_HTTPS: &str = "https";

/// Request data the router needs to pick a route.
///
/// Host and scheme are normalized to lowercase on construction; an empty
/// path becomes `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub method: Method,
    pub scheme: String,
    pub host: String,
    /// Port given explicitly by the transport, if any
    pub port: Option<u16>,
    pub path: String,
    /// Header names are kept as received; lookups are case-insensitive
    pub headers: HeaderVec,
}

impl RouteRequest {
    #[must_use]
    pub fn new(
        method: Method,
        scheme: impl AsRef<str>,
        host: impl AsRef<str>,
        path: impl Into<String>,
    ) -> Self {
        let path = path.into();
        Self {
            method,
            scheme: scheme.as_ref().to_ascii_lowercase(),
            host: host.as_ref().to_ascii_lowercase(),
            port: None,
            path: if path.is_empty() { "/".to_string() } else { path },
            headers: HeaderVec::new(),
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Explicit port, or the scheme's well-known port (80 / 443).
    ///
    /// `None` for an unknown scheme without an explicit port.
    #[must_use]
    pub fn effective_port(&self) -> Option<u16> {
        self.port.or_else(|| {
            if self.scheme.eq_ignore_ascii_case(SCHEME_HTTP) {
                Some(80)
            } else if self.scheme.eq_ignore_ascii_case(SCHEME_HTTPS) {
                Some(443)
            } else {
                None
            }
        })
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl<B> From<&http::Request<B>> for RouteRequest {
    /// Scheme, host and port come from the request URI when it is absolute;
    /// otherwise the `Host` header supplies host and port and the scheme
    /// defaults to `http`.
    fn from(req: &http::Request<B>) -> Self {
        let uri = req.uri();
        let scheme = uri.scheme_str().unwrap_or(SCHEME_HTTP);

        let (host, port) = match uri.host() {
            Some(host) => (host.to_string(), uri.port_u16()),
            None => req
                .headers()
                .get(http::header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(split_host_port)
                .unwrap_or_default(),
        };

        let mut route_req = RouteRequest::new(req.method().clone(), scheme, host, uri.path());
        route_req.port = port;
        for (name, value) in req.headers() {
            if let Ok(value) = value.to_str() {
                route_req.headers.push((Arc::from(name.as_str()), value.to_string()));
            }
        }
        route_req
    }
}

/// Split a `Host` header value into host and optional port.
fn split_host_port(value: &str) -> (String, Option<u16>) {
    match value.parse::<http::uri::Authority>() {
        Ok(authority) => (authority.host().to_string(), authority.port_u16()),
        Err(_) => (value.to_string(), None),
    }
}
