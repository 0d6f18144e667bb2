use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use content_engine_api::{app, config, jobs, middleware, services};
use domain::services::NotificationService;
use persistence::repositories::ContentRepository;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging and metrics
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting Content Engine API v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let db_config = persistence::db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        connect_timeout_secs: config.database.connect_timeout_secs,
        idle_timeout_secs: config.database.idle_timeout_secs,
    };
    let pool = persistence::db::create_pool(&db_config).await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // Seed built-in templates
    let template_repo = persistence::repositories::TemplateRepository::new(pool.clone());
    let seeded = services::seed_system_templates(&template_repo).await?;
    if seeded > 0 {
        info!(seeded, "System templates seeded");
    }

    // Outbound adapters
    let publisher = Arc::new(services::HttpPublisher::new(&config.publishers)?);
    let notifier: Arc<dyn NotificationService> =
        if config.telegram.enabled && !config.telegram.bot_token.is_empty() {
            Arc::new(services::TelegramNotifier::new(&config.telegram.bot_token)?)
        } else {
            Arc::new(services::DisabledNotifier)
        };

    // Background jobs
    let mut scheduler = jobs::JobScheduler::new();
    if config.jobs.enabled {
        let repo = ContentRepository::new(pool.clone());
        let dispatcher =
            services::PublishDispatcher::new(repo.clone(), publisher.clone(), notifier.clone());
        scheduler.register(jobs::PublishDueJob::new(
            repo,
            dispatcher,
            config.jobs.dispatch_interval_secs,
            config.jobs.dispatch_batch_size,
        ));
        scheduler.register(jobs::PoolMetricsJob::new(pool.clone()));
        scheduler.start();
    }

    // Build application
    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool, publisher, notifier);

    // Start server
    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain background jobs
    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
