use std::{sync::Arc, time::Duration as StdDuration};

use axum::{Json, Router, http::StatusCode, routing::get};
use chrono::Duration;
use sea_orm::Database;

use engine::{Engine, EngineError, IdentityVerifier, TokenKeys};
use migration::MigratorTrait;
use server::GoogleVerifier;

async fn engine_with(identity: Option<Arc<dyn IdentityVerifier>>) -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let mut builder = Engine::builder()
        .database(db)
        .tokens(TokenKeys::from_secret(b"listener-secret", Duration::hours(1)));
    if let Some(identity) = identity {
        builder = builder.identity_verifier(identity);
    }
    builder.build().await.unwrap()
}

/// Serves a fake tokeninfo endpoint and returns its base URL.
async fn tokeninfo_stub() -> String {
    let app = Router::new()
        .route(
            "/tokeninfo",
            get(|| async {
                Json(serde_json::json!({
                    "aud": "app",
                    "email": "ana@example.com",
                    "email_verified": "true",
                    "name": "Ana"
                }))
            }),
        )
        .route("/broken", get(|| async { StatusCode::BAD_REQUEST }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn verifier(client_id: &str, url: String) -> Arc<dyn IdentityVerifier> {
    Arc::new(
        GoogleVerifier::new(Some(client_id.to_string()), StdDuration::from_secs(2))
            .unwrap()
            .endpoint(url),
    )
}

#[tokio::test]
async fn google_login_uses_tokeninfo_response() {
    let base = tokeninfo_stub().await;
    let engine = engine_with(Some(verifier("app", format!("{base}/tokeninfo")))).await;

    let (token, user) = engine.google_login("id-token").await.unwrap();
    assert_eq!(user.email, "ana@example.com");
    assert_eq!(user.name, "Ana");
    assert_eq!(engine.authenticate(&token).await.unwrap().user_id, user.id);

    // Same identity logs into the same account.
    let (_, again) = engine.google_login("id-token").await.unwrap();
    assert_eq!(again.id, user.id);
}

#[tokio::test]
async fn google_login_fails_closed() {
    let base = tokeninfo_stub().await;

    let wrong_audience = engine_with(Some(verifier("other", format!("{base}/tokeninfo")))).await;
    assert!(matches!(
        wrong_audience.google_login("id-token").await,
        Err(EngineError::Unauthorized(_))
    ));

    let error_status = engine_with(Some(verifier("app", format!("{base}/broken")))).await;
    assert!(matches!(
        error_status.google_login("id-token").await,
        Err(EngineError::Unauthorized(_))
    ));

    // Nothing listens on the port once the listener is dropped.
    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_addr = closed.local_addr().unwrap();
    drop(closed);
    let unreachable =
        engine_with(Some(verifier("app", format!("http://{closed_addr}/tokeninfo")))).await;
    assert!(matches!(
        unreachable.google_login("id-token").await,
        Err(EngineError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn spawned_server_answers_with_cors_headers() {
    let engine = engine_with(None).await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(
        engine,
        listener,
        vec!["http://localhost:3000".to_string()],
    )
    .unwrap();

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/health"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("http://localhost:3000")
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}
