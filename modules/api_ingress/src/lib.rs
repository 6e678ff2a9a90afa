use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{middleware::from_fn, routing::get, Extension, Router};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::OpenApi;

mod assets;
mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

#[derive(OpenApi)]
#[openapi(paths(web::health_check), components(schemas(web::HealthStatus)))]
struct HostApiDoc;

/// HTTP host: owns the listener, the shared middleware stack and the
/// endpoints that do not belong to any module.
pub struct ApiIngress {
    config: ApiIngressConfig,
    assets_dir: PathBuf,
    request_timeout: Duration,
}

impl ApiIngress {
    /// `assets_dir` is the already-resolved form of `config.assets_dir`.
    pub fn new(config: ApiIngressConfig, assets_dir: PathBuf, request_timeout: Duration) -> Self {
        Self {
            config,
            assets_dir,
            request_timeout,
        }
    }

    /// Wrap module routes with the host endpoints and middleware.
    ///
    /// `api` is the module's OpenAPI document; host paths are merged into it
    /// before it is served from `/openapi.json`.
    pub fn build_router(&self, routes: Router, api: utoipa::openapi::OpenApi) -> Router {
        let mut doc = api;
        doc.merge(HostApiDoc::openapi());
        let doc = Arc::new(doc);

        tracing::debug!("Building router");
        let mut router = routes
            .route("/health", get(web::health_check))
            .route(
                "/openapi.json",
                get(web::openapi_json).layer(Extension(doc)),
            )
            .nest_service("/images", assets::image_service(&self.assets_dir));

        // Layers are listed innermost first; each `.layer` wraps everything above it.
        // Request path: SetRequestId -> PropagateRequestId -> Trace -> push_req_id
        //   -> Timeout -> CORS -> BodyLimit -> handler

        // 1. Body limit
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        // 2. CORS layer (if enabled)
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        // 3. Timeout for handlers
        router = router.layer(TimeoutLayer::new(self.request_timeout));

        // 4. Put request_id into extensions and span
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));

        // 5. Trace with request_id/status/latency
        router = router.layer(request_id::create_trace_layer());

        // 6. Echo x-request-id on the response
        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));

        // 7. Generate x-request-id when missing
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        router
    }

    /// Bind and serve until `cancel` fires.
    pub async fn serve(
        &self,
        router: Router,
        addr: SocketAddr,
        cancel: CancellationToken,
    ) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
        tracing::info!("HTTP server bound on {}", addr);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
