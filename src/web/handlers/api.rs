use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::chart::{self, ChartSelection};
use crate::db::{guard, query};
use crate::speech::{languages, SpeechError};
use crate::web::state::AppState;

// Query types

#[derive(Debug, Deserialize)]
pub struct ExecuteQueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NlQueryRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub sql: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
    pub execution_time_ms: u64,
}

// Speech types

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
}

// Chart types

#[derive(Debug, Deserialize)]
pub struct ChartRequest {
    #[serde(flatten)]
    pub selection: ChartSelection,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

// System status

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub table_count: usize,
    pub max_record_secs: u64,
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

// API Implementations

/// Natural language query: question -> schema -> prompt -> LLM -> guard ->
/// execute. Nothing downstream runs for a blank question.
pub async fn nl_query(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<NlQueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, String)> {
    if is_blank(&payload.question) {
        return Err((StatusCode::BAD_REQUEST, "Question must not be empty".into()));
    }

    debug!("NL-query: {}", payload.question);

    let schema = app_state.describe_schema().await.map_err(|e| {
        error!("Failed to introspect schema: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Schema introspection failed: {}", e))
    })?;

    let prompt = app_state
        .prompt_renderer
        .render(&schema, &payload.question)
        .map_err(|e| {
            error!("Prompt rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    // Generate SQL using the configured LLM backend
    let llm = Arc::clone(&app_state.llm_manager);
    let raw_sql = {
        let mgr = llm.lock().await;
        mgr.generate_sql(&prompt).await.map_err(|e| {
            error!("LLM error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("LLM error: {}", e))
        })?
    };

    let sql = guard::sanitize(&raw_sql);
    guard::check(&sql, app_state.config.database.allow_mutations)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    info!("Generated SQL: {}", sql);

    run_sql(&app_state, sql).await.map(Json)
}

/// Direct SQL execution, for re-running the shown statement after edits.
/// Goes through the same guard as generated SQL.
pub async fn execute_query(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ExecuteQueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, String)> {
    if is_blank(&payload.query) {
        return Err((StatusCode::BAD_REQUEST, "Query must not be empty".into()));
    }

    let sql = guard::sanitize(&payload.query);
    guard::check(&sql, app_state.config.database.allow_mutations)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    info!("Executing SQL query: {}", sql);

    run_sql(&app_state, sql).await.map(Json)
}

/// Executes on a blocking task with a fresh connection per submission. Any
/// driver error comes back as a message for the user, never a crash.
async fn run_sql(
    app_state: &Arc<AppState>,
    sql: String,
) -> Result<QueryResponse, (StatusCode, String)> {
    let connection_string = app_state.config.database.connection_string.clone();
    let sql_for_task = sql.clone();

    let task = tokio::task::spawn_blocking(move || query::execute(&connection_string, &sql_for_task));

    let output = match task.await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            error!("Database query error: {}", e);
            return Err((StatusCode::BAD_REQUEST, format!("Error running query: {}", e)));
        }
        Err(join_err) => {
            error!("Task join error: {}", join_err);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database task execution failed: {}", join_err),
            ));
        }
    };

    info!(
        "Query executed successfully. Row count: {}, Execution time: {}ms",
        output.row_count, output.execution_time_ms
    );

    Ok(QueryResponse {
        sql,
        columns: output.columns,
        rows: output.rows,
        row_count: output.row_count,
        execution_time_ms: output.execution_time_ms,
    })
}

/// Voice input: multipart upload of captured audio plus the locale code.
pub async fn transcribe(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, (StatusCode, String)> {
    let mut locale_code = None;
    let mut audio = None;
    let mut mime_type = "audio/webm".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Malformed upload: {}", e)))?
    {
        let field_name = field.name().map(|name| name.to_string());
        match field_name.as_deref() {
            Some("language") => {
                locale_code = Some(field.text().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Malformed upload: {}", e))
                })?);
            }
            Some("audio") => {
                if let Some(content_type) = field.content_type() {
                    mime_type = content_type.to_string();
                }
                audio = Some(field.bytes().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Malformed upload: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let locale_code =
        locale_code.ok_or((StatusCode::BAD_REQUEST, "Missing language field".to_string()))?;
    let audio = audio.ok_or((StatusCode::BAD_REQUEST, "Missing audio field".to_string()))?;

    info!("Transcribing {} bytes in {}", audio.len(), locale_code);

    let transcript = app_state
        .speech_manager
        .transcribe(&audio, &mime_type, &locale_code)
        .await
        .map_err(|e| match e {
            SpeechError::Unintelligible => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            SpeechError::ServiceError(_) => (StatusCode::BAD_GATEWAY, e.to_string()),
            SpeechError::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        })?;

    info!("Transcript: {}", transcript);

    Ok(Json(TranscribeResponse { transcript }))
}

// Languages
pub async fn list_languages() -> Json<Vec<languages::LanguageEntry>> {
    Json(languages::all())
}

// Schema
pub async fn get_schema(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<String>, (StatusCode, String)> {
    let description = app_state.describe_schema().await.map_err(|e| {
        error!("Failed to get schema description: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;

    Ok(Json(description))
}

// Chart building
pub async fn build_chart(
    Json(payload): Json<ChartRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let spec = chart::build_spec(&payload.selection, &payload.columns, &payload.rows)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(spec))
}

// System status
pub async fn system_status(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<SystemStatus>, (StatusCode, String)> {
    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(app_state.startup_time).num_seconds();

    let table_count = app_state.table_count().await.map_err(|e| {
        error!("Failed to count tables: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
    })?;

    Ok(Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        table_count,
        max_record_secs: app_state.config.speech.max_record_secs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_questions_are_rejected_before_any_work() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(is_blank("\n\t"));
        assert!(!is_blank("show all orders"));
    }

    #[test]
    fn chart_request_flattens_the_selection() {
        let request: ChartRequest = serde_json::from_str(
            r#"{
                "kind": "bar",
                "x_column": "city",
                "y_column": "population",
                "columns": ["city", "population"],
                "rows": [["Lyon", 522969]]
            }"#,
        )
        .expect("deserialize");

        assert_eq!(request.selection.x_column, "city");
        assert_eq!(request.columns.len(), 2);
        assert_eq!(request.rows[0][1], serde_json::json!(522969));
    }
}
