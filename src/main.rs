use clap::Parser;
use r2d2::Pool;
use std::sync::Arc;
use tracing::{error, info};

mod chart;
mod config;
mod db;
mod llm;
mod prompt;
mod speech;
mod util;
mod web;

use crate::config::{AppConfig, CliArgs};
use crate::db::db_pool::DuckDbConnectionManager;
use crate::llm::LlmManager;
use crate::prompt::PromptRenderer;
use crate::speech::SpeechManager;
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Initializing DuckDB connection pool for {}",
        config.database.connection_string
    );
    let db_manager = DuckDbConnectionManager::new(config.database.connection_string.clone());
    let pool = Pool::builder()
        .max_size(config.database.pool_size as u32)
        .build(db_manager)?;

    // Initialize LLM manager
    info!("Initializing LLM manager with backend: {}", config.llm.backend);
    let llm_manager = LlmManager::new(&config.llm)?;

    // Initialize speech-to-text manager
    info!(
        "Initializing speech manager with backend: {}",
        config.speech.backend
    );
    let speech_manager = SpeechManager::new(&config.speech)?;

    // The prompt template itself is read fresh on every query
    let prompt_renderer = PromptRenderer::new(&config.prompt.template_path);

    let app_state = Arc::new(AppState::new(
        config.clone(),
        pool,
        llm_manager,
        speech_manager,
        prompt_renderer,
    ));

    // Start the web server
    info!(
        "Starting SpeakQL server on {}:{}",
        config.web.host, config.web.port
    );
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(Box::new(std::io::Error::other(e.to_string())) as Box<dyn std::error::Error>);
        }
    }

    Ok(())
}
