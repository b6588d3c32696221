use clap::Parser;
use doclens_pipeline::categories::seed_categories;
use doclens_pipeline::documents::delete_all_documents;
use doclens_pipeline::{create_pool, run_migrations, PipelineConfig};
use tracing_subscriber::EnvFilter;

/// Apply database migrations, optionally seeding categories or clearing documents.
#[derive(Parser)]
#[command(name = "doclens-db-migrate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Insert any missing classification categories
    #[arg(long)]
    seed_categories: bool,

    /// Delete every stored document row
    #[arg(long)]
    reset_documents: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match PipelineConfig::from_env() {
        Ok(config) => config.with_max_connections(2),
        Err(e) => {
            tracing::error!(error = %e, "invalid database configuration");
            std::process::exit(1);
        }
    };

    tracing::info!("connecting to database...");

    let pool = match create_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to database");
            std::process::exit(1);
        }
    };

    tracing::info!("running migrations...");

    if let Err(e) = run_migrations(&pool).await {
        tracing::error!(error = %e, "failed to run migrations");
        std::process::exit(1);
    }

    tracing::info!("migrations completed successfully");

    if args.seed_categories {
        match seed_categories(&pool).await {
            Ok(inserted) => tracing::info!(inserted, "categories seeded"),
            Err(e) => {
                tracing::error!(error = %e, "failed to seed categories");
                std::process::exit(1);
            }
        }
    }

    if args.reset_documents {
        match delete_all_documents(&pool).await {
            Ok(deleted) => tracing::info!(deleted, "documents reset"),
            Err(e) => {
                tracing::error!(error = %e, "failed to reset documents");
                std::process::exit(1);
            }
        }
    }

    pool.close().await;
}
