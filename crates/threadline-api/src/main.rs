use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use threadline_api::{
    app::build_router,
    config::{Config, EstimatorKind, StorageBackend},
    state::AppState,
};
use threadline_chat::{ConversationPipeline, LoggingSummarizationQueue};
use threadline_context::{CharRatioEstimator, PromptAssembler, TokenEstimator};
use threadline_llm::{ModelClient, OllamaClient};
use threadline_persist::{InMemoryPersistenceClient, PersistenceClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Threadline API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let model_config = config.model_config();
    tracing::info!(
        base_url = %model_config.base_url,
        model = %model_config.model,
        "Initializing model client"
    );
    let model: Arc<dyn ModelClient> = Arc::new(OllamaClient::new(model_config)?);

    let persist = connect_storage(&config).await?;

    let assembler = PromptAssembler::new(build_estimator(&config)?, config.context.token_budget)
        .with_system_prompt(config.system_prompt());
    tracing::info!(
        budget = assembler.budget(),
        system_prompt = assembler.system_prompt().is_some(),
        "Prompt assembler ready"
    );

    let pipeline = ConversationPipeline::builder()
        .persistence(Arc::clone(&persist))
        .model(model)
        .assembler(assembler)
        .config(config.pipeline_config())
        .build()?;

    let state = Arc::new(AppState::new(
        config.clone(),
        persist,
        pipeline,
        Arc::new(LoggingSummarizationQueue::new()),
    ));

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn connect_storage(config: &Config) -> anyhow::Result<Arc<dyn PersistenceClient>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; threads are lost on restart");
            Ok(Arc::new(InMemoryPersistenceClient::new()))
        }
        #[cfg(feature = "mongodb")]
        StorageBackend::Mongodb => {
            tracing::info!("Connecting to MongoDB");
            let client = threadline_persist::MongoPersistenceClient::connect(
                &config.mongodb_uri,
                &config.storage.database,
            )
            .await?;
            tracing::info!(database = %config.storage.database, "MongoDB connected");
            Ok(Arc::new(client))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageBackend::Mongodb => Err(anyhow::anyhow!(
            "storage.backend = \"mongodb\" requires building with the `mongodb` feature"
        )),
    }
}

fn build_estimator(config: &Config) -> anyhow::Result<Arc<dyn TokenEstimator>> {
    match config.context.estimator {
        EstimatorKind::Chars => Ok(Arc::new(CharRatioEstimator::default())),
        #[cfg(feature = "tiktoken")]
        EstimatorKind::Tiktoken => Ok(Arc::new(threadline_context::TiktokenEstimator::new()?)),
        #[cfg(not(feature = "tiktoken"))]
        EstimatorKind::Tiktoken => Err(anyhow::anyhow!(
            "context.estimator = \"tiktoken\" requires building with the `tiktoken` feature"
        )),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
