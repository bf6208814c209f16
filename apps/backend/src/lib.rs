pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::{ProgressEngine, RetryPolicy};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub engine: Arc<ProgressEngine>,
}

impl AppState {
    pub fn new(db: Database, retry: RetryPolicy) -> Self {
        let db = Arc::new(db);
        let engine = Arc::new(ProgressEngine::new(db.clone(), retry));
        Self { db, engine }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // Learner routes
        .route("/api/learners/me", get(routes::learners::me))
        // Flashcard routes
        .route(
            "/api/flashcards",
            get(routes::flashcards::list).post(routes::flashcards::create),
        )
        // Lesson routes
        .route(
            "/api/lessons",
            get(routes::lessons::list).post(routes::lessons::create),
        )
        // Practice routes
        .route("/api/practice/queue", get(routes::practice::queue))
        .route("/api/practice/review", post(routes::practice::review))
        // Progress routes
        .route("/api/progress", delete(routes::progress::reset))
        .route("/api/progress/stats", get(routes::progress::stats))
        .route("/api/progress/words", get(routes::progress::words))
        // Settings routes
        .route(
            "/api/settings/thresholds",
            get(routes::settings::get_thresholds).put(routes::settings::update_thresholds),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/learners/register", post(routes::learners::register))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    if db.seed_default_thresholds().await? {
        tracing::info!("Seeded default state thresholds");
    }

    let app = build_router(AppState::new(db, config.retry));

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
