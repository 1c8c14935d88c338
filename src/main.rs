use std::sync::Arc;
use tokio::net::TcpListener;
use arxiv_analyzer::{
    config::Config,
    api::routes::create_router,
    llm::OpenRouterClient,
    logging,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;

    if config.openrouter_api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY not configured; analyses will fail until it is set");
    }

    let client = OpenRouterClient::from_config(&config)?;
    tracing::info!(
        model = client.model(),
        cache_policy = ?config.cache_policy,
        "starting analyzer service on {}",
        server_addr
    );

    // Create application state
    let app_state = AppState::new(config, Arc::new(client));

    // Build the router with routes
    let app = create_router(app_state);

    // Create the listener
    let listener = TcpListener::bind(server_addr).await?;

    // Start the server
    tracing::info!("listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
