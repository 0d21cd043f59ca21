//! HTTP listener, middleware stack and graceful shutdown

use axum::{extract::DefaultBodyLimit, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::{Config, CorsMode},
    error::Result,
    middleware::{correlation_id_layer, correlation_id_propagation_layer, sensitive_headers_layer},
};

/// Runs a router behind the service middleware until a shutdown signal
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Bind `0.0.0.0:{port}` and serve `app` until SIGINT or SIGTERM.
    ///
    /// In-flight requests are drained before this returns.
    pub async fn serve(self, app: Router) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));
        let app = self.apply_middleware(app);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            service = %self.config.service.name,
            environment = %self.config.service.environment,
            %addr,
            "metadata service listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!(service = %self.config.service.name, "metadata service stopped");
        Ok(())
    }

    /// Wrap `app` in the service middleware, outermost first:
    /// CORS, compression, timeout, body limit, correlation id assignment and
    /// echo, header masking, request tracing, panic recovery.
    ///
    /// The body limit is enforced by the body extractors, so an oversized
    /// body reaches the handler as a rejection it can answer itself.
    pub fn apply_middleware(&self, app: Router) -> Router {
        let middleware = &self.config.middleware;
        let timeout = Duration::from_secs(self.config.service.timeout_secs);

        tracing::debug!(
            cors_mode = %middleware.cors_mode,
            body_limit_mb = middleware.body_limit_mb,
            timeout_secs = self.config.service.timeout_secs,
            default_limit = self.config.query.default_limit,
            max_result_count = self.config.query.max_result_count,
            allow_unbounded_limit = self.config.query.allow_unbounded_limit,
            "applying middleware"
        );

        // Applied in two steps so the inner stack's response body is boxed
        // back into `axum::body::Body` (which `TimeoutLayer` requires to be
        // `Default`); the resulting order is unchanged.
        app.layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(middleware.body_limit_bytes()))
                .layer(correlation_id_layer())
                .layer(correlation_id_propagation_layer())
                .layer(sensitive_headers_layer())
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().include_headers(true))
                        .on_response(DefaultOnResponse::new().include_headers(true)),
                )
                .layer(CatchPanicLayer::new()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(middleware.cors_mode))
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::with_status_code(
                    http::StatusCode::REQUEST_TIMEOUT,
                    timeout,
                )),
        )
    }
}

fn cors_layer(mode: CorsMode) -> CorsLayer {
    match mode {
        CorsMode::Permissive => CorsLayer::permissive(),
        CorsMode::Restrictive | CorsMode::Disabled => CorsLayer::new(),
    }
}

/// Resolves on the first of SIGINT or SIGTERM.
///
/// A handler that cannot be installed never resolves, leaving the other.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };

    tracing::info!(signal, "shutting down, draining in-flight requests");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    fn ok_app(config: Config) -> Router {
        Server::new(config).apply_middleware(Router::new().route("/", get(|| async { "ok" })))
    }

    #[tokio::test]
    async fn test_middleware_assigns_correlation_id() {
        let response = ok_app(Config::default())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let id = response.headers()["x-correlation-id"].to_str().unwrap();
        assert!(id.starts_with("corr_"));
    }

    fn echo_len_app(body_limit_mb: usize) -> Router {
        let mut config = Config::default();
        config.middleware.body_limit_mb = body_limit_mb;
        Server::new(config).apply_middleware(Router::new().route(
            "/",
            axum::routing::post(|body: axum::body::Bytes| async move { body.len().to_string() }),
        ))
    }

    fn post_bytes(len: usize) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-length", len)
            .body(Body::from(vec![b'x'; len]))
            .unwrap()
    }

    #[tokio::test]
    async fn test_body_limit_rejects_oversized_requests() {
        let response = echo_len_app(1)
            .oneshot(post_bytes(2 * 1024 * 1024))
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_configured_body_limit_replaces_extractor_default() {
        let len = 3 * 1024 * 1024;
        let response = echo_len_app(10).oneshot(post_bytes(len)).await.unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, len.to_string());
    }

    #[tokio::test]
    async fn test_permissive_cors_allows_any_origin() {
        let response = ok_app(Config::default())
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_restrictive_cors_sends_no_allow_origin() {
        let mut config = Config::default();
        config.middleware.cors_mode = CorsMode::Restrictive;

        let response = ok_app(config)
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }
}
