use criterion::{criterion_group, criterion_main, Criterion};
use groveroute::router::{GroupOptions, Router, RouterBuilder};
use groveroute::{HandlerResponse, RequestContext, RouteRequest};
use http::Method;
use std::hint::black_box;

fn noop(_: &RequestContext<'_>) -> anyhow::Result<HandlerResponse> {
    Ok(HandlerResponse::json(200, serde_json::Value::Null))
}

fn build_router(resources: usize) -> Router {
    let mut builder = RouterBuilder::new();
    builder.pattern("id", r"\d+");

    builder.get("/", noop).expect("root");
    builder.get("/zoo/health", noop).expect("health");
    for i in 0..resources {
        builder
            .get(&format!("/zoo/resource{i}"), noop)
            .expect("literal route");
        builder
            .get(&format!("/zoo/resource{i}/{{id}}"), noop)
            .expect("pattern route");
    }
    builder
        .group(GroupOptions::new().domain("{tenant}.zoo.test"), |r| {
            r.get("/animals/{id}/toys/{toy_id}", noop)?;
            r.get("/complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}", noop)?;
            Ok(())
        })
        .expect("tenant group");
    builder.build()
}

fn bench_lookup(c: &mut Criterion) {
    let router = build_router(50);
    let requests = [
        RouteRequest::new(Method::GET, "http", "zoo.test", "/zoo/health"),
        RouteRequest::new(Method::GET, "http", "zoo.test", "/zoo/resource25"),
        RouteRequest::new(Method::GET, "http", "zoo.test", "/zoo/resource49/123"),
        RouteRequest::new(Method::GET, "http", "acme.zoo.test", "/animals/1/toys/2"),
        RouteRequest::new(Method::GET, "http", "acme.zoo.test", "/complex/1/2/3/4/5/6/7/8/9"),
        RouteRequest::new(Method::GET, "http", "zoo.test", "/does/not/exist"),
    ];

    c.bench_function("route_lookup", |b| {
        b.iter(|| {
            for req in &requests {
                let res = router.lookup(req);
                black_box(&res);
            }
        })
    });

    c.bench_function("route_dispatch", |b| {
        b.iter(|| {
            for req in &requests[..5] {
                let res = router.dispatch(req);
                black_box(&res);
            }
        })
    });
}

fn bench_table_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_last_route");
    for size in [10, 100, 500] {
        let router = build_router(size);
        let req = RouteRequest::new(
            Method::GET,
            "http",
            "zoo.test",
            format!("/zoo/resource{}/7", size - 1),
        );
        group.bench_function(format!("{size}_resources"), |b| {
            b.iter(|| black_box(router.lookup(&req).is_some()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lookup, bench_table_size);
criterion_main!(benches);
