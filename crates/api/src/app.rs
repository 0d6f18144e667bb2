use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::services::{NotificationService, PlatformPublisher};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{content, health, templates, workflow};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub publisher: Arc<dyn PlatformPublisher>,
    pub notifier: Arc<dyn NotificationService>,
}

pub fn create_app(
    config: Config,
    pool: PgPool,
    publisher: Arc<dyn PlatformPublisher>,
    notifier: Arc<dyn NotificationService>,
) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        publisher,
        notifier,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Tenant-scoped API routes under /api/v1
    let api_routes = Router::new()
        // Template routes
        .route(
            "/api/v1/locations/:location_id/templates",
            post(templates::create_template).get(templates::list_templates),
        )
        .route(
            "/api/v1/locations/:location_id/templates/:template_id",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        // Content routes
        .route(
            "/api/v1/locations/:location_id/content",
            post(content::create_content).get(content::list_content),
        )
        .route(
            "/api/v1/locations/:location_id/content/quick",
            post(content::quick_create),
        )
        .route(
            "/api/v1/locations/:location_id/content/calendar",
            get(content::calendar_view),
        )
        .route(
            "/api/v1/locations/:location_id/content/pending-approvals",
            get(content::pending_approvals),
        )
        .route(
            "/api/v1/locations/:location_id/content/:content_id",
            get(content::get_content)
                .put(content::update_content)
                .delete(content::delete_content),
        )
        // Workflow action routes
        .route(
            "/api/v1/locations/:location_id/content/:content_id/approve",
            post(workflow::approve),
        )
        .route(
            "/api/v1/locations/:location_id/content/:content_id/reject",
            post(workflow::reject),
        )
        .route(
            "/api/v1/locations/:location_id/content/:content_id/request-revision",
            post(workflow::request_revision),
        )
        .route(
            "/api/v1/locations/:location_id/content/:content_id/resubmit",
            post(workflow::resubmit),
        )
        .route(
            "/api/v1/locations/:location_id/content/:content_id/publish",
            post(workflow::publish),
        );

    // Public routes (health and metrics)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
