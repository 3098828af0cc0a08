mod common;

use common::handlers::echo;
use common::requests::get;
use groveroute::router::{GroupOptions, RouterBuilder};
use groveroute::{Handler, HandlerRegistry, HandlerResponse, RouteNotFoundError, Router};
use http::Method;
use serde_json::json;
use std::sync::Arc;
use std::thread;

#[test]
fn test_not_found_handler_response() {
    common::logging::init();
    let mut builder = RouterBuilder::new();
    builder.get("/known", echo).unwrap();
    builder.not_found(|ctx| {
        Ok(HandlerResponse::json(
            404,
            json!({ "missing": ctx.request.path, "route": ctx.route_template() }),
        ))
    });
    let router = builder.build();

    let res = router.dispatch(&get("h", "/unknown")).unwrap();
    assert_eq!(res.status, 404);
    assert_eq!(res.body["missing"], "/unknown");
    assert!(res.body["route"].is_null());
}

#[test]
fn test_not_found_skips_middleware() {
    let mut builder = RouterBuilder::new();
    builder.register_middleware(groveroute::middleware::from_fn(|_| {
        Ok(Some(HandlerResponse::error(500, "middleware must not run")))
    }));
    builder.not_found(|_| Ok(HandlerResponse::error(404, "Not Found")));
    let router = builder.build();

    assert_eq!(router.dispatch(&get("h", "/nothing")).unwrap().status, 404);
}

#[test]
fn test_route_not_found_error_fields() {
    let router = RouterBuilder::new().build();
    let err = router
        .dispatch(&groveroute::RouteRequest::new(
            Method::DELETE,
            "https",
            "api.test",
            "/users/1",
        ))
        .unwrap_err();
    let not_found = err.downcast::<RouteNotFoundError>().unwrap();
    assert_eq!(
        not_found,
        RouteNotFoundError {
            method: "DELETE".to_string(),
            host: "api.test".to_string(),
            path: "/users/1".to_string(),
        }
    );
}

#[test]
fn test_handler_response_returned_verbatim() {
    let mut builder = RouterBuilder::new();
    builder
        .get("/custom", |_| {
            let mut res = HandlerResponse::json(207, json!({ "parts": [1, 2, 3] }));
            res.set_header("x-custom", "yes".to_string());
            Ok(res)
        })
        .unwrap();
    let router = builder.build();

    let res = router.dispatch(&get("h", "/custom")).unwrap();
    assert_eq!(res.status, 207);
    assert_eq!(res.body, json!({ "parts": [1, 2, 3] }));
    assert_eq!(res.get_header("x-custom"), Some("yes"));
}

#[test]
fn test_named_handlers_via_registry() {
    let mut registry = HandlerRegistry::new();
    registry
        .register_handler("users.index", |_| Ok(HandlerResponse::json(200, json!([]))))
        .register_handler("users.show", |ctx| {
            Ok(HandlerResponse::json(200, json!({ "id": ctx.param("id") })))
        });
    assert_eq!(registry.handler_names(), vec!["users.index", "users.show"]);

    let mut builder = RouterBuilder::new();
    builder.resolver(Arc::new(registry));
    builder
        .route(&[Method::GET], "/users", Handler::named("users.index"))
        .unwrap();
    builder
        .route(&[Method::GET], "/users/{id}", "users.show".into())
        .unwrap();
    builder.not_found_handler(Handler::named("errors.missing"));
    let router = builder.build();

    assert_eq!(router.dispatch(&get("h", "/users")).unwrap().body, json!([]));
    assert_eq!(
        router.dispatch(&get("h", "/users/9")).unwrap().body["id"],
        "9"
    );
    // the not-found handler itself is a name the registry does not know
    let err = router.dispatch(&get("h", "/nope")).unwrap_err();
    assert!(err
        .downcast_ref::<groveroute::UnresolvedReferenceError>()
        .is_some());
}

#[test]
fn test_router_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Router>();
    assert_send_sync::<groveroute::SharedRouter>();
}

#[test]
fn test_concurrent_dispatch_keeps_params_isolated() {
    let mut builder = RouterBuilder::new();
    builder.pattern("id", r"\d+");
    builder
        .group(GroupOptions::new().domain("{tenant}.app.test"), |r| {
            r.get("/items/{id}", echo)?;
            Ok(())
        })
        .unwrap();
    let router = builder.build();

    thread::scope(|scope| {
        for worker in 0..8 {
            let router = &router;
            scope.spawn(move || {
                for i in 0..200 {
                    let tenant = format!("t{worker}");
                    let id = (worker * 1000 + i).to_string();
                    let res = router
                        .dispatch(&get(&format!("{tenant}.app.test"), &format!("/items/{id}")))
                        .unwrap();
                    assert_eq!(res.body["params"]["tenant"], tenant.as_str());
                    assert_eq!(res.body["params"]["id"], id.as_str());
                }
            });
        }
    });
}
