//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::common::time::timestamp_to_rfc3339;
use crate::domain::DEFAULT_LANGUAGE;
use crate::suggest::{Suggestion, SuggestionRequest, suggest};

use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateRoomResponse {
    pub room_id: String,
}

#[derive(Debug, Serialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub code: String,
    pub language: String,
    pub created_at: String,
    pub active_users: u32,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a new coding room; returns the id clients use to join it.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), StatusCode> {
    let language = request
        .language
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    match state.store.create_room(&language).await {
        Ok(record) => Ok((
            StatusCode::CREATED,
            Json(CreateRoomResponse { room_id: record.id }),
        )),
        Err(e) => {
            tracing::error!("Failed to create room: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get the persisted state of a room.
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    match state.store.get_room(&room_id).await {
        Ok(Some(record)) => Ok(Json(RoomDetailDto {
            id: record.id,
            code: record.code,
            language: record.language,
            created_at: timestamp_to_rfc3339(record.created_at),
            active_users: record.active_users,
        })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load room {}: {}", room_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a rule-based autocomplete suggestion for the current cursor position.
pub async fn autocomplete(Json(request): Json<SuggestionRequest>) -> Json<Suggestion> {
    Json(suggest(&request))
}
