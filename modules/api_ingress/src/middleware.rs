//! Request pipeline middleware: access logging and the static API key gate.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{info, info_span, warn, Instrument};

use crate::config::AuthConfig;
use crate::error::IngressError;
use crate::request_id;

/// Log every request on the way in and its status and latency on the way out.
///
/// Handler logs are emitted inside the `http_request` span opened here.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let rid = request_id::current(&req);

    let span = info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %rid,
    );

    async move {
        info!("Handling request");
        let started = Instant::now();
        let response = next.run(req).await;
        let latency_ms = started.elapsed().as_millis() as u64;
        info!(
            status = response.status().as_u16(),
            latency_ms, "Finished request"
        );
        response
    }
    .instrument(span)
    .await
}

/// Shared state of [`require_api_key`], built once from [`AuthConfig`].
#[derive(Clone, Debug)]
pub struct ApiKeyAuth {
    header: HeaderName,
    api_key: Arc<str>,
    bypass_prefixes: Arc<[String]>,
}

impl ApiKeyAuth {
    pub fn from_config(cfg: &AuthConfig) -> anyhow::Result<Self> {
        cfg.validate()?;
        Ok(Self {
            header: HeaderName::try_from(cfg.header_name.as_str())?,
            api_key: Arc::from(cfg.api_key.as_str()),
            bypass_prefixes: cfg.bypass_prefixes.clone().into(),
        })
    }

    /// `/docs` covers `/docs` and `/docs/...` but not `/docsx`.
    pub fn is_bypassed(&self, path: &str) -> bool {
        self.bypass_prefixes.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            match path.strip_prefix(prefix) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            }
        })
    }

    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|key| key == &*self.api_key)
    }
}

/// Reject requests without the configured key before they reach any handler.
pub async fn require_api_key(State(auth): State<ApiKeyAuth>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if auth.is_bypassed(path) || auth.is_authorized(req.headers()) {
        return next.run(req).await;
    }

    warn!(path = %path, header = %auth.header, "Rejected request with missing or invalid API key");
    IngressError::Unauthorized.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::{from_fn, from_fn_with_state},
        routing::get,
        Router,
    };
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn auth() -> ApiKeyAuth {
        ApiKeyAuth::from_config(&AuthConfig {
            header_name: "x-api-key".into(),
            api_key: "secret".into(),
            bypass_prefixes: vec!["/docs".into(), "/openapi.json".into()],
        })
        .unwrap()
    }

    fn app() -> Router {
        Router::new()
            .route("/users", get(|| async { "users" }))
            .route("/docs", get(|| async { "docs" }))
            .route("/docs/index.html", get(|| async { "docs index" }))
            .route("/docsx", get(|| async { "not docs" }))
            .layer(from_fn_with_state(auth(), require_api_key))
            .layer(from_fn(log_requests))
    }

    async fn status_of(req: Request<Body>) -> StatusCode {
        app().oneshot(req).await.unwrap().status()
    }

    #[test]
    fn root_bypass_cannot_disable_the_gate() {
        let res = ApiKeyAuth::from_config(&AuthConfig {
            header_name: "x-api-key".into(),
            api_key: "secret".into(),
            bypass_prefixes: vec!["/".into()],
        });
        assert!(res.is_err());
    }

    #[test]
    fn bypass_matches_whole_segments() {
        let auth = auth();
        assert!(auth.is_bypassed("/docs"));
        assert!(auth.is_bypassed("/docs/index.html"));
        assert!(auth.is_bypassed("/openapi.json"));
        assert!(!auth.is_bypassed("/docsx"));
        assert!(!auth.is_bypassed("/users"));
    }

    #[tokio::test]
    async fn missing_key_is_unauthorized() {
        let resp = app()
            .oneshot(Request::get("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Unauthorized: missing or invalid API key.");
    }

    #[tokio::test]
    async fn wrong_key_is_unauthorized() {
        let req = Request::get("/users")
            .header("x-api-key", "guess")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(req).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn matching_key_passes() {
        let req = Request::get("/users")
            .header("x-api-key", "secret")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(req).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn docs_prefix_skips_the_check() {
        for path in ["/docs", "/docs/index.html"] {
            let req = Request::get(path).body(Body::empty()).unwrap();
            assert_eq!(status_of(req).await, StatusCode::OK, "{path}");
        }
        let req = Request::get("/docsx").body(Body::empty()).unwrap();
        assert_eq!(status_of(req).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[traced_test]
    async fn logs_request_and_outcome() {
        let req = Request::get("/users")
            .header("x-api-key", "secret")
            .body(Body::empty())
            .unwrap();
        let _ = app().oneshot(req).await.unwrap();

        assert!(logs_contain("Handling request"));
        assert!(logs_contain("Finished request"));
        assert!(logs_contain("status=200"));
    }

    #[tokio::test]
    #[traced_test]
    async fn rejected_requests_are_still_logged() {
        let _ = app()
            .oneshot(Request::get("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(logs_contain("Rejected request with missing or invalid API key"));
        assert!(logs_contain("status=401"));
    }
}
