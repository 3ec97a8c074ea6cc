use std::net::SocketAddr;

use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use server::routes;
use server::state::ServerState;
use service::crud::Variant;

struct TestApp {
    base_url: String,
    client: reqwest::Client,
}

async fn start_server(variant: Variant) -> anyhow::Result<TestApp> {
    let app = routes::build_router(ServerState::for_variant(variant, true), CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, client: reqwest::Client::new() })
}

#[tokio::test]
async fn health_and_metrics_are_public() -> anyhow::Result<()> {
    let app = start_server(Variant::ItemsAdvanced).await?;

    let res = app.client.get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"status": "ok"}));

    let res = app.client.get(format!("{}/metrics", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let text = res.text().await?;
    assert!(text.contains("crud_requests_total"));
    assert!(text.contains("variant=\"items-advanced\""));
    Ok(())
}

#[tokio::test]
async fn users_lifecycle_over_http() -> anyhow::Result<()> {
    let app = start_server(Variant::UsersIntermediate).await?;
    let user_url = format!("{}/users/10", app.base_url);

    let res = app
        .client
        .post(format!("{}/users", app.base_url))
        .json(&json!({"user_id": "10", "name": "Flow User", "email": "flow@test.com"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = app.client.get(&user_url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["name"], "Flow User");

    let res = app.client.put(&user_url).json(&json!({"name": "Updated Flow"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["user"]["name"], "Updated Flow");
    assert_eq!(body["user"]["email"], "flow@test.com");

    let res = app.client.delete(&user_url).send().await?;
    assert!(res.status().is_success());

    let res = app.client.get(&user_url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn malformed_user_body_is_missing_data() -> anyhow::Result<()> {
    let app = start_server(Variant::UsersIntermediate).await?;
    let res = app
        .client
        .put(format!("{}/users/1", app.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "Missing JSON data");
    Ok(())
}
