//! Axum router assembly: plan routes, health, frontend entry redirect and
//! optional static file serving, wrapped in CORS and request tracing.

use std::path::Path;
use std::sync::Arc;

use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::plan::{PlanRouteState, PlanService, plan_routes};

/// Build the complete application router.
///
/// Files under `web_dir` are served as a fallback when the directory exists.
pub fn build_router(service: Arc<PlanService>, web_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(index_redirect))
        .route("/health", get(health))
        .merge(plan_routes(PlanRouteState { service }));

    if web_dir.is_dir() {
        router = router.fallback_service(ServeDir::new(web_dir));
        tracing::info!(path = %web_dir.display(), "Static file serving enabled");
    }

    router.layer(cors).layer(TraceLayer::new_for_http())
}

async fn index_redirect() -> Redirect {
    Redirect::to("/index.html")
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "habit-coach",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
