//! Glossify HTTP API
//!
//! Router, shared state and handlers. The binary in `main.rs` wires these
//! to configuration, the database and the Prometheus recorder.

pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use glossify_common::{config::AppConfig, FileStore, LanguageModel, Repository};
use glossify_explain::{TermExplainer, TermResolver};
use glossify_ingestion::{DocumentAnalyzer, IngestionProcessor};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Repository,
    pub files: FileStore,
    pub processor: IngestionProcessor,
    pub resolver: TermResolver,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, repo: Repository, model: Arc<dyn LanguageModel>) -> Self {
        let files = FileStore::from_config(&config.storage);
        let processor = IngestionProcessor::new(
            repo.clone(),
            files.clone(),
            DocumentAnalyzer::new(model.clone()),
        );
        let resolver = TermResolver::new(TermExplainer::new(model));

        Self {
            config,
            repo,
            files,
            processor,
            resolver,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))

        // Ingestion and term lookup
        .route("/upload", post(handlers::upload::upload))
        .route("/explain", post(handlers::explain::explain))

        // Paper endpoints
        .route(
            "/papers/{id}",
            get(handlers::papers::get_paper).delete(handlers::papers::delete_paper),
        )
        .route("/papers/{id}/glossary", get(handlers::papers::get_glossary))
        .route("/papers/{id}/file", get(handlers::papers::get_file))

        // User endpoints
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/users/{id}", axum::routing::delete(handlers::users::delete_user))
        .route("/users/{id}/papers", get(handlers::users::list_user_papers))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes));

    let routes = match config.request_timeout() {
        Some(timeout) => routes.layer(TimeoutLayer::new(timeout)),
        None => routes,
    };

    routes
        .layer(ConcurrencyLimitLayer::new(config.server.max_concurrent_requests.max(1)))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}
