mod configuration;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use parlance::chat::ChatService;
use parlance::providers::factory;
use parlance::store::memory::MemoryStore;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::configuration::Settings;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;
    let addr = settings.server.socket_addr();
    let api_token = settings.server.api_token.clone();

    let provider = factory::get_provider(settings.provider.into_config())?;
    let chat = ChatService::new(provider, settings.chat.into_config());
    let state = AppState::new(chat, Arc::new(MemoryStore::new()), api_token);

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
