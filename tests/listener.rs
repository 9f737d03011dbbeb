//! Listener tests over real sockets.

use std::time::Duration;

use forest::{http_status, json_result, raw_result, AppContext, LifecycleState, Route, ServeError, Shutdown};
use tokio::net::TcpListener;

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn serves_registered_routes() {
    let ctx = common::context_with(vec![
        Route::get("/ping", "ping", |_, _| raw_result("pong", http_status(200))),
        Route::get("/data", "data", |_, _| {
            json_result(&serde_json::json!({ "a": 1 }), http_status(200))
        }),
    ]);
    let (handle, shutdown, base) = common::start(&ctx).await;
    let client = client();

    let res = client.get(format!("{base}/ping")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "pong");

    let res = client.get(format!("{base}/data")).send().await.unwrap();
    assert_eq!(res.headers()["content-type"], "application/json;charset=utf-8");
    let value: serde_json::Value = res.json().await.unwrap();
    assert_eq!(value, serde_json::json!({ "a": 1 }));

    let res = client.get(format!("{base}/missing")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "404 Not Found");

    shutdown.trigger();
    handle.join().await.unwrap();
}

#[tokio::test]
async fn handles_concurrent_requests() {
    let ctx = common::context_with(vec![Route::get("/n/{n}", "n", |req, _| {
        raw_result(req.param("n").unwrap_or_default(), http_status(200))
    })]);
    let (handle, shutdown, base) = common::start(&ctx).await;
    let client = client();

    let tasks: Vec<_> = (0..32)
        .map(|n| {
            let client = client.clone();
            let url = format!("{base}/n/{n}");
            tokio::spawn(async move { client.get(url).send().await.unwrap().text().await.unwrap() })
        })
        .collect();

    for (n, task) in tasks.into_iter().enumerate() {
        assert_eq!(task.await.unwrap(), n.to_string());
    }

    shutdown.trigger();
    handle.join().await.unwrap();
}

#[tokio::test]
async fn late_registrations_never_reach_the_listener() {
    let ctx = common::context_with(vec![Route::get("/early", "early", |_, _| {
        raw_result("early", http_status(200))
    })]);
    let (handle, shutdown, base) = common::start(&ctx).await;
    assert_eq!(ctx.state(), LifecycleState::Serving);

    let late = Route::get("/late", "late", |_, _| raw_result("late", http_status(200)));
    assert!(ctx.register(late).is_err());

    let res = client().get(format!("{base}/late")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
    handle.join().await.unwrap();
}

#[tokio::test]
async fn listen_and_serve_reports_bind_failure() {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = taken.local_addr().unwrap().to_string();

    let ctx = AppContext::new();
    let err = ctx.listen_and_serve(&address).await.unwrap_err();
    assert!(matches!(err, ServeError::Bind { .. }));
    assert_eq!(ctx.state(), LifecycleState::Uninitialised);
}

#[tokio::test]
async fn route_conflicts_fail_before_serving() {
    let ctx = common::context_with(vec![
        Route::get("/users/{id}", "by-id", |_, _| raw_result("", http_status(200))),
        Route::get("/users/{name}", "by-name", |_, _| raw_result("", http_status(200))),
    ]);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let err = ctx.spawn(listener, &Shutdown::new()).unwrap_err();
    assert!(matches!(err, ServeError::RouteConflict { .. }));
    assert_ne!(ctx.state(), LifecycleState::Serving);
}

#[tokio::test]
async fn serve_stops_on_shutdown_future() {
    let ctx = common::context_with(vec![Route::get("/ping", "ping", |_, _| {
        raw_result("pong", http_status(200))
    })]);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

    let served = ctx.serve(listener, tokio::time::sleep(Duration::from_millis(50)));
    tokio::time::timeout(Duration::from_secs(5), served)
        .await
        .expect("serve should return after shutdown")
        .unwrap();
}
