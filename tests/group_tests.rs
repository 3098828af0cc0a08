mod common;

use common::handlers::{echo, tagged};
use common::recording::{EventLog, RecordingMiddleware};
use common::requests::{get, https_get};
use groveroute::router::{GroupOptions, RouterBuilder};
use groveroute::RouteRequest;
use http::Method;

#[test]
fn test_group_middleware_applies_only_inside() {
    common::logging::init();
    let log = EventLog::default();

    let mut builder = RouterBuilder::new();
    builder.get("/outside", tagged("outside")).unwrap();
    builder
        .group(
            GroupOptions::new().middleware(RecordingMiddleware::pass("m", &log)),
            |r| {
                r.get("/inside", tagged("inside"))?;
                Ok(())
            },
        )
        .unwrap();
    let router = builder.build();

    router.dispatch(&get("h", "/outside")).unwrap();
    assert!(log.events().is_empty());

    router.dispatch(&get("h", "/inside")).unwrap();
    assert_eq!(log.events(), vec!["before:m", "after:m"]);
}

#[test]
fn test_register_middleware_targets_current_group() {
    let log = EventLog::default();

    let mut builder = RouterBuilder::new();
    builder.register_middleware(RecordingMiddleware::pass("global", &log));
    builder
        .group(GroupOptions::new().name("admin"), |r| {
            r.register_middleware(RecordingMiddleware::pass("admin", &log));
            r.get("/admin", tagged("admin"))?;
            Ok(())
        })
        .unwrap();
    builder.get("/public", tagged("public")).unwrap();
    let router = builder.build();

    router.dispatch(&get("h", "/public")).unwrap();
    assert_eq!(log.events(), vec!["before:global", "after:global"]);

    let log_after_public = log.events().len();
    router.dispatch(&get("h", "/admin")).unwrap();
    assert_eq!(
        log.events()[log_after_public..],
        ["before:global", "before:admin", "after:admin", "after:global"]
    );
}

#[test]
fn test_global_middleware_registered_late_still_applies() {
    let log = EventLog::default();
    let mut builder = RouterBuilder::new();
    builder.get("/early", tagged("early")).unwrap();
    builder.register_middleware(RecordingMiddleware::pass("late", &log));
    let router = builder.build();

    router.dispatch(&get("h", "/early")).unwrap();
    assert_eq!(log.events(), vec!["before:late", "after:late"]);
}

#[test]
fn test_group_state_restored_after_closure_error() {
    let mut builder = RouterBuilder::new();
    let result = builder.group(
        GroupOptions::new().domain("internal.test").scheme("https"),
        |r| {
            r.get("/before-error", tagged("inner"))?;
            Err(anyhow::anyhow!("configuration missing"))
        },
    );
    assert_eq!(result.unwrap_err().to_string(), "configuration missing");

    // sibling registered after the failure must not inherit the constraints
    builder.get("/sibling", tagged("sibling")).unwrap();
    let router = builder.build();

    assert!(router.lookup(&get("anything.test", "/sibling")).is_some());
    assert!(router.lookup(&get("internal.test", "/before-error")).is_none());
    assert!(router
        .lookup(&https_get("internal.test", "/before-error"))
        .is_some());
}

#[test]
fn test_group_middleware_not_registered_when_closure_fails() {
    let log = EventLog::default();
    let mut builder = RouterBuilder::new();
    let result = builder.group(
        GroupOptions::new().middleware(RecordingMiddleware::pass("lost", &log)),
        |r| {
            r.get("/partial", tagged("partial"))?;
            anyhow::bail!("abort");
        },
    );
    assert!(result.is_err());
    let router = builder.build();

    router.dispatch(&get("h", "/partial")).unwrap();
    assert!(log.events().is_empty());
}

#[test]
fn test_nested_groups_inherit_and_override() {
    let mut builder = RouterBuilder::new();
    builder
        .group(
            GroupOptions::new()
                .domain("{region}.api.test")
                .scheme("https"),
            |r| {
                r.get("/outer", echo)?;
                r.group(GroupOptions::new().port(8443), |r| {
                    r.get("/inner", echo)?;
                    Ok(())
                })?;
                r.group(GroupOptions::new().scheme("http"), |r| {
                    r.get("/plain", echo)?;
                    Ok(())
                })?;
                Ok(())
            },
        )
        .unwrap();
    let router = builder.build();

    let inner = router.lookup(
        &RouteRequest::new(Method::GET, "https", "eu.api.test", "/inner").with_port(8443),
    );
    let inner = inner.unwrap();
    assert_eq!(inner.get_param("region"), Some("eu"));
    assert_eq!(inner.node.group_names().len(), 3);

    // inherited scheme and domain still apply to the inner group
    assert!(router
        .lookup(&RouteRequest::new(Method::GET, "http", "eu.api.test", "/inner").with_port(8443))
        .is_none());
    assert!(router
        .lookup(&RouteRequest::new(Method::GET, "https", "eu.other.test", "/inner").with_port(8443))
        .is_none());
    // port set by the inner group only
    assert!(router
        .lookup(&https_get("eu.api.test", "/inner"))
        .is_none());
    assert!(router.lookup(&https_get("eu.api.test", "/outer")).is_some());

    // overridden scheme
    assert!(router.lookup(&get("us.api.test", "/plain")).is_some());
    assert!(router.lookup(&https_get("us.api.test", "/plain")).is_none());
}

#[test]
fn test_nested_group_middleware_order() {
    let log = EventLog::default();
    let mut builder = RouterBuilder::new();
    builder.register_middleware(RecordingMiddleware::pass("global", &log));
    builder
        .group(
            GroupOptions::new().middleware(RecordingMiddleware::pass("outer", &log)),
            |r| {
                r.group(
                    GroupOptions::new().middleware(RecordingMiddleware::pass("inner", &log)),
                    |r| {
                        r.get("/deep", tagged("deep"))?
                            .middleware(RecordingMiddleware::pass("route", &log));
                        Ok(())
                    },
                )?;
                Ok(())
            },
        )
        .unwrap();
    let router = builder.build();

    router.dispatch(&get("h", "/deep")).unwrap();
    assert_eq!(
        log.events(),
        vec![
            "before:global",
            "before:outer",
            "before:inner",
            "before:route",
            "after:route",
            "after:inner",
            "after:outer",
            "after:global",
        ]
    );
}

#[test]
fn test_port_alternation() {
    let mut builder = RouterBuilder::new();
    builder
        .group(GroupOptions::new().ports([8080, 8081]), |r| {
            r.get("/metrics", tagged("metrics"))?;
            Ok(())
        })
        .unwrap();
    let router = builder.build();

    for port in [8080, 8081] {
        assert!(router.lookup(&get("h", "/metrics").with_port(port)).is_some());
    }
    assert!(router.lookup(&get("h", "/metrics").with_port(9000)).is_none());
}
