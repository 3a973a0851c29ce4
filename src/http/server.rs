//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, metrics)
//! - Serve on a bound listener until shutdown

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigStore, MachineSettings};
use crate::http::handlers;
use crate::http::middleware::metrics::track_metrics;
use crate::http::middleware::timeout::timeout_as_json;
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::lifecycle::signals::shutdown_signal;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
}

/// HTTP server for the greeting API.
pub struct HttpServer {
    router: Router,
    settings: MachineSettings,
}

impl HttpServer {
    /// Create a new HTTP server reading configuration from `store`.
    pub fn new(store: Arc<ConfigStore>, settings: MachineSettings) -> Self {
        let state = AppState { store };
        let router = Self::build_router(&settings, state);
        Self { router, settings }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(settings: &MachineSettings, state: AppState) -> Router {
        let routes = Router::new()
            .route("/hello", get(handlers::hello))
            .route("/health", get(handlers::health))
            .fallback(handlers::not_found);

        Self::per_route_layers(routes, settings.request_timeout)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// Layers applied around every route and the fallback.
    ///
    /// Metrics sit outside the timeout so that 404s and 408s are counted,
    /// and inside the router so the matched route template is known.
    #[allow(deprecated)]
    fn per_route_layers<S>(routes: Router<S>, request_timeout: Duration) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        routes
            .layer(TimeoutLayer::new(request_timeout))
            .layer(middleware::from_fn(timeout_as_json))
            .layer(middleware::from_fn(track_metrics))
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns after a shutdown signal (Ctrl+C, SIGTERM, or `shutdown`) once
    /// in-flight requests have drained.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            production = self.settings.production,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving requests without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        HttpServer::new(Arc::new(ConfigStore::new()), MachineSettings::default())
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = server()
            .into_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_hello_without_machine_configuration_is_500() {
        let response = server()
            .into_router()
            .oneshot(Request::get("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "configuration unavailable");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = server()
            .into_router()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_timeout_answers_json_408() {
        let routes: Router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let response = HttpServer::per_route_layers(routes, Duration::from_millis(20))
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "request timed out"}));
    }

    #[test]
    fn test_unmatched_and_timed_out_requests_are_counted() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let routes: Router = Router::new()
                    .route(
                        "/slow",
                        get(|| async {
                            tokio::time::sleep(Duration::from_secs(5)).await;
                            "late"
                        }),
                    )
                    .fallback(handlers::not_found);
                let router = HttpServer::per_route_layers(routes, Duration::from_millis(20));

                for uri in ["/slow", "/nope"] {
                    router
                        .clone()
                        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                        .await
                        .unwrap();
                }
            });
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"route="/slow",status="408""#), "{rendered}");
        assert!(rendered.contains(r#"route="unmatched",status="404""#), "{rendered}");
    }

    #[tokio::test]
    async fn test_client_request_id_is_echoed() {
        let response = server()
            .into_router()
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "trace-me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "trace-me");
    }
}
