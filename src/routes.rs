// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, dashboard, students, submissions},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (batches, problems, contests, submissions, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store handle and config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.cors_origins.clone())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let batch_routes = Router::new().route("/{batch}/students", get(students::list_batch_students));

    let problem_routes = Router::new()
        .route("/{id}/submissions", get(submissions::list_problem_submissions))
        .route("/{id}/submissions/best", get(submissions::list_best_submissions))
        .route("/{id}/analytics", get(dashboard::problem_analytics));

    let contest_routes = Router::new()
        .route("/{id}/dashboard", get(dashboard::contest_rankings))
        .route("/{id}/export", get(dashboard::export_contest));

    let admin_routes = Router::new()
        .route("/students", post(admin::create_student))
        .route("/problems", post(admin::create_problem))
        .route("/contests", post(admin::create_contest));

    Router::new()
        .nest("/api/batches", batch_routes)
        .nest("/api/problems", problem_routes)
        .nest("/api/contests", contest_routes)
        .nest("/api/admin", admin_routes)
        .route("/api/submissions", post(submissions::create_submission))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
