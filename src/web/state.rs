use crate::config::AppConfig;
use crate::db::db_pool::DuckDbConnectionManager;
use crate::db::introspect;
use crate::llm::LlmManager;
use crate::prompt::PromptRenderer;
use crate::speech::SpeechManager;
use r2d2::Pool;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub db_pool: Pool<DuckDbConnectionManager>,
    pub llm_manager: Arc<Mutex<LlmManager>>,
    pub speech_manager: SpeechManager,
    pub prompt_renderer: PromptRenderer,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db_pool: Pool<DuckDbConnectionManager>,
        llm_manager: LlmManager,
        speech_manager: SpeechManager,
        prompt_renderer: PromptRenderer,
    ) -> Self {
        Self {
            config,
            db_pool,
            llm_manager: Arc::new(Mutex::new(llm_manager)),
            speech_manager,
            prompt_renderer,
            startup_time: chrono::Utc::now(),
        }
    }

    /// Produces the textual schema description for the prompt. DuckDB work
    /// happens on a blocking task; the pool connection is held only for the
    /// duration of the introspection queries.
    pub async fn describe_schema(
        &self,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let pool = self.db_pool.clone();

        let description = tokio::task::spawn_blocking(
            move || -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
                let conn = pool.get()?;
                Ok(introspect::describe_schema(&conn)?)
            },
        )
        .await??;

        Ok(description)
    }

    /// Counts user tables, for the status endpoint.
    pub async fn table_count(&self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let pool = self.db_pool.clone();

        let count = tokio::task::spawn_blocking(
            move || -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
                let conn = pool.get()?;
                Ok(introspect::list_tables(&conn)?.len())
            },
        )
        .await??;

        Ok(count)
    }
}
