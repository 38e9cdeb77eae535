//! Application startup and lifecycle management.

use crate::config::{AnalysisConfig, ProviderConfig, ProviderKind};
use crate::handlers;
use crate::services::extractor::TextExtractor;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::mock::MockTextProvider;
use crate::services::providers::TextProvider;
use crate::services::Analyzer;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    make_request_span, metrics_middleware, request_id_middleware, security_headers_middleware,
    REQUEST_ID_HEADER,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Multipart framing allowance on top of the file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AnalysisConfig,
    pub analyzer: Analyzer,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the provider named in the configuration.
    pub async fn build(config: AnalysisConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config.provider)?;
        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: AnalysisConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        tracing::info!(provider = provider.name(), "Initialized analysis provider");

        let extractor = TextExtractor::new(&config.extraction, &config.limits);
        let analyzer = Analyzer::new(provider, extractor, config.limits.clone());

        let state = AppState {
            config: config.clone(),
            analyzer,
        };

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Analysis service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router: router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until the process is killed.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn run_with_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}

fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    match config.kind {
        ProviderKind::Gemini => {
            let provider = GeminiTextProvider::new(GeminiConfig::from(config)).map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to initialize Gemini provider: {}", e))
            })?;
            tracing::info!(model = %config.model, "Initialized Gemini text provider");
            Ok(Arc::new(provider))
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock analysis provider; results are canned");
            Ok(Arc::new(MockTextProvider::new()))
        }
    }
}

/// Build the HTTP router with all routes and middleware.
///
/// Other methods on the JSON endpoints answer like unknown routes, with a
/// JSON 404 rather than an empty 405.
pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.limits.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let cors = cors_layer(&state.config.allowed_origins);

    let uploads = Router::new()
        .route(
            "/upload",
            post(handlers::upload_document).fallback(handlers::not_found),
        )
        .route("/app/upload", post(handlers::upload_page))
        .layer(DefaultBodyLimit::max(upload_limit));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/analyze",
            post(handlers::analyze_text).fallback(handlers::not_found),
        )
        .route("/app", get(handlers::index_page))
        .route("/app/analyze", post(handlers::analyze_page))
        .merge(uploads)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            make_request_span(request)
        }))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    layer.allow_origin(
        origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                    None
                }
            })
            .collect::<Vec<HeaderValue>>(),
    )
}
