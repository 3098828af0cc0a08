use super::{Dispatcher, Handler, HandlerResponse, RequestContext};
use crate::error::{ReferenceKind, RouteNotFoundError, UnresolvedReferenceError};
use crate::ids::NodeId;
use crate::registry::HandlerRegistry;
use crate::request::RouteRequest;
use crate::router::{ParamVec, RouterBuilder};
use http::Method;
use serde_json::json;
use smallvec::smallvec;
use std::sync::Arc;

fn request(path: &str) -> RouteRequest {
    RouteRequest::new(Method::GET, "http", "api.test", path)
}

#[test]
fn test_handler_response_headers() {
    let mut res = HandlerResponse::json(201, json!({ "ok": true }));
    assert_eq!(res.get_header("Content-Type"), Some("application/json"));

    res.set_header("content-type", "text/plain".to_string());
    res.set_header("X-Trace", "abc".to_string());
    assert_eq!(res.headers.len(), 2);
    assert_eq!(res.get_header("CONTENT-TYPE"), Some("text/plain"));
    assert_eq!(res.get_header("x-trace"), Some("abc"));

    let err = HandlerResponse::error(418, "teapot");
    assert_eq!(err.status, 418);
    assert_eq!(err.body, json!({ "error": "teapot" }));
}

#[test]
fn test_context_param_last_write_wins() {
    let router = RouterBuilder::new().build();
    let req = request("/");
    let params: ParamVec = smallvec![
        (Arc::from("id"), "domain".to_string()),
        (Arc::from("id"), "path".to_string()),
        (Arc::from("slug"), "x".to_string()),
    ];
    let ctx = RequestContext::new(&router, &req, None, params);

    assert_eq!(ctx.param("id"), Some("path"));
    assert_eq!(ctx.param_or("missing", "fallback"), "fallback");
    assert_eq!(ctx.params_map().len(), 2);
    assert_eq!(ctx.route_template(), None);
}

#[test]
fn test_context_request_id_from_header() {
    let router = RouterBuilder::new().build();
    let id = "01ARZ3NDEKTSV4RRFFQ69G5FAV";
    let req = request("/").with_header("X-Request-Id", id);
    let ctx = RequestContext::new(&router, &req, None, ParamVec::new());
    assert_eq!(ctx.request_id.to_string(), id);

    let fresh = request("/");
    let a = RequestContext::new(&router, &fresh, None, ParamVec::new());
    let b = RequestContext::new(&router, &fresh, None, ParamVec::new());
    assert_ne!(a.request_id, b.request_id);
}

#[test]
fn test_execute_without_handlers_is_route_not_found() {
    let router = RouterBuilder::new().build();
    let req = request("/nowhere");
    let ctx = RequestContext::new(&router, &req, None, ParamVec::new());

    let err = Dispatcher::new().execute(&ctx, None).unwrap_err();
    let not_found = err.downcast_ref::<RouteNotFoundError>().unwrap();
    assert_eq!(not_found.method, "GET");
    assert_eq!(not_found.host, "api.test");
    assert_eq!(not_found.path, "/nowhere");
}

#[test]
fn test_execute_falls_back_to_not_found_handler() {
    let router = RouterBuilder::new().build();
    let req = request("/nowhere");
    let ctx = RequestContext::new(&router, &req, None, ParamVec::new());

    let mut dispatcher = Dispatcher::new();
    dispatcher.add_not_found_dispatch(Handler::inline(|ctx| {
        Ok(HandlerResponse::json(404, json!({ "path": ctx.request.path })))
    }));
    assert!(dispatcher.has_not_found());

    let res = dispatcher.execute(&ctx, None).unwrap();
    assert_eq!(res.status, 404);
    assert_eq!(res.body["path"], "/nowhere");
}

#[test]
fn test_add_dispatch_rebinding_replaces() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_dispatch(NodeId(1), Handler::named("first"));
    dispatcher.add_dispatch(NodeId(1), Handler::named("second"));

    assert_eq!(dispatcher.len(), 1);
    match dispatcher.handler_for(NodeId(1)) {
        Some(Handler::Named(name)) => assert_eq!(name.as_ref(), "second"),
        other => panic!("unexpected binding: {other:?}"),
    }
    assert!(dispatcher.handler_for(NodeId(2)).is_none());
}

#[test]
fn test_handler_error_passes_through() {
    let mut builder = RouterBuilder::new();
    builder
        .get("/fail", |_| Err(anyhow::anyhow!("database unavailable")))
        .unwrap();
    let router = builder.build();

    let err = router.dispatch(&request("/fail")).unwrap_err();
    assert_eq!(err.to_string(), "database unavailable");
    assert!(err.downcast_ref::<RouteNotFoundError>().is_none());
}

#[test]
fn test_named_handler_resolution() {
    let mut registry = HandlerRegistry::new();
    registry.register_handler("users.show", |ctx| {
        Ok(HandlerResponse::json(200, json!({ "id": ctx.param("id") })))
    });

    let mut builder = RouterBuilder::new();
    builder.resolver(Arc::new(registry));
    builder
        .route(&[Method::GET], "/users/{id}", Handler::from("users.show"))
        .unwrap();
    builder
        .route(&[Method::GET], "/ghost", Handler::named("ghost.show"))
        .unwrap();
    let router = builder.build();

    let res = router.dispatch(&request("/users/5")).unwrap();
    assert_eq!(res.body["id"], "5");

    let err = router.dispatch(&request("/ghost")).unwrap_err();
    let unresolved = err.downcast_ref::<UnresolvedReferenceError>().unwrap();
    assert_eq!(unresolved.kind, ReferenceKind::Handler);
    assert_eq!(unresolved.name, "ghost.show");
}

#[test]
fn test_named_handler_without_resolver() {
    let mut builder = RouterBuilder::new();
    builder
        .route(&[Method::GET], "/x", Handler::named("x"))
        .unwrap();
    let router = builder.build();

    let err = router.dispatch(&request("/x")).unwrap_err();
    assert!(err.downcast_ref::<UnresolvedReferenceError>().is_some());
}
