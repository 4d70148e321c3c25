use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt;
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

use api_ingress::{serve_listener, ApiIngress, ApiIngressConfig};

const KEY: &str = "test-key";

fn config() -> ApiIngressConfig {
    let mut cfg = ApiIngressConfig::default();
    cfg.auth.api_key = KEY.into();
    cfg
}

fn doc() -> OpenApi {
    OpenApiBuilder::new()
        .info(InfoBuilder::new().title("Users API").version("0.1.0").build())
        .build()
}

fn routes() -> Router {
    Router::new()
        .route("/ping", get(|| async { "pong" }))
        .route("/upload", post(|body: axum::body::Bytes| async move { body.len().to_string() }))
}

async fn get_status(app: Router, uri: &str) -> StatusCode {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn health_needs_no_key() {
    let app = ApiIngress::new(config())
        .build_router(routes(), None, Duration::from_secs(5))
        .unwrap();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn docs_are_public_and_module_routes_are_not() {
    let app = ApiIngress::new(config())
        .build_router(routes(), Some(doc()), Duration::from_secs(5))
        .unwrap();

    assert_eq!(get_status(app.clone(), "/docs").await, StatusCode::OK);
    assert_eq!(get_status(app.clone(), "/openapi.json").await, StatusCode::OK);
    assert_eq!(get_status(app, "/ping").await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn openapi_document_includes_security_scheme() {
    let app = ApiIngress::new(config())
        .build_router(routes(), Some(doc()), Duration::from_secs(5))
        .unwrap();

    let response = app
        .oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["info"]["title"], "Users API");
    assert_eq!(
        json["components"]["securitySchemes"]["api_key"]["name"],
        "x-api-key"
    );
}

#[tokio::test]
async fn docs_can_be_disabled() {
    let mut cfg = config();
    cfg.enable_docs = false;
    let app = ApiIngress::new(cfg)
        .build_router(routes(), Some(doc()), Duration::from_secs(5))
        .unwrap();

    // Still inside the bypass list, so the router answers 404 rather than 401.
    assert_eq!(get_status(app.clone(), "/docs").await, StatusCode::NOT_FOUND);
    assert_eq!(get_status(app, "/openapi.json").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let mut cfg = config();
    cfg.body_limit_bytes = 8;
    let app = ApiIngress::new(cfg)
        .build_router(routes(), None, Duration::from_secs(5))
        .unwrap();

    let response = app
        .oneshot(
            Request::post("/upload")
                .header("x-api-key", KEY)
                .header("content-length", "64")
                .body(Body::from(vec![b'x'; 64]))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn server_stops_on_cancellation() {
    let app = ApiIngress::new(config())
        .build_router(routes(), None, Duration::from_secs(5))
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let cancel = CancellationToken::new();
    let server = tokio::spawn(serve_listener(listener, app, cancel.clone()));

    cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after cancellation")
        .unwrap();
    assert!(result.is_ok());
}
