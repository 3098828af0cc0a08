#![allow(dead_code)]

pub mod requests {
    use groveroute::RouteRequest;
    use http::Method;

    pub fn get(host: &str, path: &str) -> RouteRequest {
        RouteRequest::new(Method::GET, "http", host, path)
    }

    pub fn post(host: &str, path: &str) -> RouteRequest {
        RouteRequest::new(Method::POST, "http", host, path)
    }

    pub fn https_get(host: &str, path: &str) -> RouteRequest {
        RouteRequest::new(Method::GET, "https", host, path)
    }
}

pub mod handlers {
    use groveroute::{HandlerResponse, RequestContext};
    use serde_json::json;

    /// Responds 200 with the matched template and every captured parameter.
    pub fn echo(ctx: &RequestContext<'_>) -> anyhow::Result<HandlerResponse> {
        Ok(HandlerResponse::json(
            200,
            json!({
                "route": ctx.route_template(),
                "params": ctx.params_map(),
            }),
        ))
    }

    /// Responds 200 with a fixed `tag` body so tests can tell routes apart.
    pub fn tagged(
        tag: &'static str,
    ) -> impl Fn(&RequestContext<'_>) -> anyhow::Result<HandlerResponse> + Send + Sync + 'static
    {
        move |_| Ok(HandlerResponse::json(200, json!({ "tag": tag })))
    }
}

pub mod recording {
    use groveroute::{HandlerResponse, Middleware, RequestContext};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Shared, ordered record of middleware activity.
    #[derive(Clone, Default)]
    pub struct EventLog(Arc<Mutex<Vec<String>>>);

    impl EventLog {
        pub fn push(&self, event: impl Into<String>) {
            self.0.lock().unwrap().push(event.into());
        }

        pub fn events(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    /// Middleware that logs `before:<tag>` and `after:<tag>`, optionally
    /// answering with `status` from `before`.
    pub struct RecordingMiddleware {
        pub tag: &'static str,
        pub log: EventLog,
        pub respond_with: Option<u16>,
    }

    impl RecordingMiddleware {
        pub fn pass(tag: &'static str, log: &EventLog) -> Arc<Self> {
            Arc::new(Self {
                tag,
                log: log.clone(),
                respond_with: None,
            })
        }

        pub fn deny(tag: &'static str, log: &EventLog, status: u16) -> Arc<Self> {
            Arc::new(Self {
                tag,
                log: log.clone(),
                respond_with: Some(status),
            })
        }
    }

    impl Middleware for RecordingMiddleware {
        fn before(&self, _ctx: &RequestContext<'_>) -> anyhow::Result<Option<HandlerResponse>> {
            self.log.push(format!("before:{}", self.tag));
            Ok(self
                .respond_with
                .map(|status| HandlerResponse::error(status, self.tag)))
        }

        fn after(&self, _ctx: &RequestContext<'_>, _res: &mut HandlerResponse, _latency: Duration) {
            self.log.push(format!("after:{}", self.tag));
        }
    }
}

pub mod logging {
    /// Route tracing output through the test harness writer (best effort;
    /// only the first call in a test binary installs the subscriber).
    pub fn init() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}
