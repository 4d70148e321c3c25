//! HTTP host for the users service.
//!
//! Owns the outer request pipeline (request id, access log, CORS, API key gate,
//! timeout, body limit), the host endpoints (`/health`, `/openapi.json`, `/docs`)
//! and the listener lifecycle.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::{
    security::{ApiKey, ApiKeyValue, SecurityRequirement, SecurityScheme},
    Components, OpenApi,
};

mod config;
pub mod error;
pub mod middleware;
pub mod request_id;
pub mod shutdown;
mod web;

pub use config::{ApiIngressConfig, AuthConfig, DEV_API_KEY};
pub use error::{ErrorResponse, IngressError};

const API_KEY_SCHEME: &str = "api_key";

/// Main API ingress: wraps module routes in the shared pipeline and serves them.
pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Finalize `routes` into the served router.
    ///
    /// Layers run outermost first: request id, access log, CORS, API key,
    /// timeout, body limit. Docs are only mounted when `openapi` is given
    /// and `enable_docs` is set.
    pub fn build_router(
        &self,
        routes: Router,
        openapi: Option<OpenApi>,
        request_timeout: Duration,
    ) -> Result<Router> {
        let cfg = &self.config;
        let auth = middleware::ApiKeyAuth::from_config(&cfg.auth)?;

        let mut router = routes.route("/health", get(web::health_check));

        if let Some(doc) = openapi.filter(|_| cfg.enable_docs) {
            let doc = Arc::new(serde_json::to_value(self.document(doc))?);
            router = router
                .route(
                    "/openapi.json",
                    get(move || web::serve_openapi(doc.clone())),
                )
                .route("/docs", get(web::serve_docs));
            tracing::debug!("OpenAPI document mounted at /openapi.json");
        }

        // axum applies the last added layer first
        router = router
            .layer(DefaultBodyLimit::max(cfg.body_limit_bytes))
            .layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(from_fn_with_state(auth, middleware::require_api_key));

        if cfg.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        let x_request_id = request_id::header();
        router = router
            .layer(from_fn(middleware::log_requests))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// Attach the API key security scheme so the docs UI can send the header.
    fn document(&self, mut doc: OpenApi) -> OpenApi {
        let components = doc.components.get_or_insert_with(Components::new);
        components.add_security_scheme(
            API_KEY_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                self.config.auth.header_name.clone(),
            ))),
        );
        doc.security = Some(vec![SecurityRequirement::new(
            API_KEY_SCHEME,
            Vec::<String>::new(),
        )]);
        doc
    }

    /// Bind `addr` and serve until `cancel` fires.
    pub async fn serve(
        &self,
        addr: &str,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        serve_listener(listener, router, cancel).await
    }
}

/// Serve on an already bound listener with graceful shutdown on cancellation.
pub async fn serve_listener(
    listener: TcpListener,
    router: Router,
    cancel: CancellationToken,
) -> Result<()> {
    tracing::info!("HTTP server bound on {}", listener.local_addr()?);

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully (cancellation)");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
