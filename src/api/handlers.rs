use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::tool::{ToolDefinition, ToolRegistry};

pub struct AppState {
    pub registry: Arc<ToolRegistry>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// List the declared tools
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<Vec<ToolDefinition>> {
    Json(state.registry.definitions())
}

/// Run a tool with the JSON body as its arguments; the answer is plain text
pub async fn invoke_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    let Some(tool) = state.registry.get(&name) else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Unknown tool '{name}'"),
            }),
        ));
    };

    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Request body is not valid JSON: {e}"),
                }),
            )
        })?
    };

    Ok(tool.invoke(arguments).await)
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
