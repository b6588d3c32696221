use std::sync::Arc;

use doclens_crawler::ContentStore;
use doclens_pipeline::categories::seed_categories;
use doclens_pipeline::{create_pool, run_migrations, Classifier, ClassifierConfig, IngestContext, PipelineConfig};
use tracing_subscriber::EnvFilter;

use doclens_api::{router, AppConfig, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app_config = AppConfig::from_env();

    let pipeline_config = PipelineConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "invalid database configuration");
        std::process::exit(1);
    });

    tracing::info!(url = %pipeline_config.database_url, "connecting to database...");
    let pool = create_pool(&pipeline_config).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to open database");
        std::process::exit(1);
    });

    tracing::info!("running database migrations...");
    if let Err(e) = run_migrations(&pool).await {
        tracing::error!(error = %e, "failed to run migrations");
        std::process::exit(1);
    }
    if let Err(e) = seed_categories(&pool).await {
        tracing::error!(error = %e, "failed to seed categories");
        std::process::exit(1);
    }
    tracing::info!("database ready");

    let classifier = ClassifierConfig::from_env()
        .and_then(|config| Classifier::from_config(&config))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to configure classifier");
            std::process::exit(1);
        });

    let store = ContentStore::open(&app_config.data_dir).unwrap_or_else(|e| {
        tracing::error!(error = %e, dir = %app_config.data_dir.display(), "cannot open content store");
        std::process::exit(1);
    });

    let ingest = IngestContext::new(pool, Arc::new(classifier), store);
    let state = AppState::new(ingest, app_config.crawler_config());
    let app = router(state, &app_config);

    let addr = app_config.bind_addr;
    tracing::info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to bind on {addr}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
