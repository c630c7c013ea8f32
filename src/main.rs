use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use utility_advisor::advisor::Advisor;
use utility_advisor::api::build_router;
use utility_advisor::completion::{OpenAiCompletionClient, TextCompletion};
use utility_advisor::config::Config;
use utility_advisor::db::Database;
use utility_advisor::directory::DirectorySource;
use utility_advisor::handlers::AppState;
use utility_advisor::responder::ResponseGenerator;
use utility_advisor::source::{PgProviderSource, ProviderSource};

/// Main entry point for the application.
///
/// Initializes tracing and configuration, picks the provider source
/// (Postgres when `DATABASE_URL` is set, otherwise the built-in directory)
/// and the completion delegate (when `OPENAI_API_KEY` is set), then starts
/// the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "utility_advisor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let source: Arc<dyn ProviderSource> = match config.database_url {
        Some(ref url) => {
            let db = Database::new(url).await?;
            tracing::info!("Database connection pool established");
            Arc::new(PgProviderSource::new(db.pool))
        }
        None => Arc::new(DirectorySource),
    };

    let delegate: Option<Arc<dyn TextCompletion>> = match config.openai_api_key {
        Some(ref key) => match OpenAiCompletionClient::new(
            config.openai_base_url.clone(),
            key.clone(),
            config.completion.clone(),
        ) {
            Ok(client) => {
                tracing::info!("✓ Completion client initialized: {}", config.openai_base_url);
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::error!("Failed to initialize completion client: {}", e);
                None
            }
        },
        None => None,
    };

    let advisor = Advisor::new(source, ResponseGenerator::new(delegate));
    let app_state = Arc::new(AppState {
        config: config.clone(),
        advisor,
    });

    let app = build_router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
