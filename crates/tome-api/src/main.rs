//! tome API server: book catalog, reviews, recommendations, and the
//! asynchronous summarization pipeline behind them.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tome_core::{defaults, JobRepository};
use tome_db::{Database, PoolConfig};
use tome_inference::OllamaBackend;
use tome_jobs::{JobWorker, SummarizeUploadHandler, WorkerConfig};

mod auth;
mod error;
mod handlers;
mod services;
mod state;

use state::AppState;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically and stay easy
/// to correlate across log lines.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// ROOT
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the Intelligent Book Management System",
    }))
}

/// Liveness with a queue-depth probe; doubles as a database connectivity
/// check since the count is a real query.
async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<impl IntoResponse, error::ApiError> {
    tome_db::log_pool_metrics(state.db.pool());
    let pending_jobs = state.db.jobs.pending_count().await?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "pending_jobs": pending_jobs,
    })))
}

// =============================================================================
// STARTUP
// =============================================================================

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter (default: "tome_api=debug,tower_http=debug")
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tome_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("tome-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );
    guard
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/register", post(handlers::users::register))
        .route("/auth/token", post(handlers::users::login))
        .route(
            "/books/",
            post(handlers::books::add_book).get(handlers::books::get_all_books),
        )
        .route("/books/:book_id", get(handlers::books::get_book))
        .route(
            "/books/:book_id/summary/status",
            get(handlers::books::get_summary_status),
        )
        .route("/books/:book_id/summary", get(handlers::books::get_summary))
        .route(
            "/books/:book_id/reviews",
            post(handlers::reviews::add_review).get(handlers::reviews::get_reviews),
        )
        .route("/preferences", post(handlers::users::save_preferences))
        .route(
            "/recommendations",
            get(handlers::recommendations::get_recommendations),
        )
        .layer(DefaultBodyLimit::max(defaults::MAX_BODY_SIZE_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/tome".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults::SERVER_PORT);

    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(tome_db::pool::DEFAULT_MAX_CONNECTIONS);

    info!("Connecting to database...");
    let db = Database::connect_with_config(
        &database_url,
        PoolConfig::default().max_connections(max_connections),
    )
    .await?;
    info!("Database connected");

    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    let scratch_dir = std::env::var("SCRATCH_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("tome-uploads"));
    tokio::fs::create_dir_all(&scratch_dir).await?;
    info!(scratch_dir = %scratch_dir.display(), "Scratch storage ready");

    let backend: Arc<dyn tome_core::GenerationBackend> = Arc::new(OllamaBackend::from_env());

    let pipeline_timeout_secs = std::env::var("JOB_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(defaults::JOB_TIMEOUT_SECS);

    let mut worker = JobWorker::new(db.clone(), WorkerConfig::from_env());
    worker.register_handler(
        SummarizeUploadHandler::new(Arc::new(db.books.clone()), backend.clone())
            .with_timeout_secs(pipeline_timeout_secs),
    );
    let _worker_handle = worker.start();
    info!("Job worker started");

    let state = AppState {
        db,
        backend,
        scratch_dir,
    };

    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    info!(%addr, "tome API server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
