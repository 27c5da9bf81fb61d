//! Echo and user-store server example
//!
//! Demonstrates route registration, path parameters, authorization tags and
//! hosting the router in axum.
//!
//! Run with: RUST_LOG=debug cargo run --example echo_server

use parking_lot::Mutex;
use routewire::protocol::parse_basic_auth;
use routewire::server::{authorizer_fn, handler_fn, BadRequest, BoundRequest};
use routewire::{Response, Router};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct User {
    name: String,
    email: String,
}

type Users = Arc<Mutex<BTreeMap<u64, User>>>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Routewire Echo Server Example");
    println!("=============================\n");
    println!("Starting server on http://localhost:3000");
    println!("  curl http://localhost:3000/echo/hello");
    println!("  curl -X PUT -d '{{\"name\":\"Ada\",\"email\":\"ada@example.com\"}}' http://localhost:3000/users/1");
    println!("  curl -u admin:secret -X DELETE http://localhost:3000/users/1\n");

    // "admin" routes need Basic credentials admin:secret; untagged routes are open.
    let router = Router::with_authorizer(Arc::new(authorizer_fn(|request: &BoundRequest, tag: &str| {
        match tag {
            "" => true,
            "admin" => request
                .header("Authorization")
                .and_then(parse_basic_auth)
                .is_some_and(|(user, password)| user == "admin" && password == "secret"),
            _ => false,
        }
    })));

    router
        .get("/echo/{word}", "", handler_fn(|request: BoundRequest| async move {
            Ok(Response::ok().with_text(request.require_param("word")?))
        }))
        .unwrap();

    router
        .post("/echo", "", handler_fn(|request: BoundRequest| async move {
            Ok(Response::ok().with_text(&request.text()))
        }))
        .unwrap();

    let users: Users = Arc::default();

    let store = users.clone();
    router
        .get("/users/{id}", "", handler_fn(move |request: BoundRequest| {
            let store = store.clone();
            async move {
                let id = user_id(&request)?;
                let user = store.lock().get(&id).cloned();
                match user {
                    Some(user) => Ok(Response::ok().with_json(&user)?),
                    None => Ok(Response::new(404).with_text("no such user")),
                }
            }
        }))
        .unwrap();

    let store = users.clone();
    router
        .put("/users/{id}", "", handler_fn(move |request: BoundRequest| {
            let store = store.clone();
            async move {
                let id = user_id(&request)?;
                let user: User = request.json()?;
                store.lock().insert(id, user.clone());
                Ok(Response::new(201).with_json(&user)?)
            }
        }))
        .unwrap();

    let store = users;
    router
        .delete("/users/{id}", "admin", handler_fn(move |request: BoundRequest| {
            let store = store.clone();
            async move {
                let id = user_id(&request)?;
                let removed = store.lock().remove(&id).is_some();
                Ok(Response::new(if removed { 204 } else { 404 }))
            }
        }))
        .unwrap();

    for route in router.routes() {
        let method = route.method.map_or("*", |m| m.as_str());
        println!("  {:<6} {:<16} auth={:?}", method, route.template, route.auth_tag);
    }

    let app = router.into_axum().layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}

fn user_id(request: &BoundRequest) -> Result<u64, BadRequest> {
    request
        .require_param("id")?
        .parse()
        .map_err(|_| BadRequest::new("user id must be a number"))
}
