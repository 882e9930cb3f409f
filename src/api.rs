//! HTTP API endpoints.
//!
//! Room creation and joining are also available here so a client can get a
//! seat before opening its WebSocket and then `resume` it there.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::RoomError;
use crate::state::{AppState, Seat};
use crate::view::RoomView;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}

/// `RoomError` as an HTTP response
pub struct ApiError(RoomError);

impl From<RoomError> for ApiError {
    fn from(e: RoomError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RoomError::NotFound(_) | RoomError::UnknownPlayer(_) => StatusCode::NOT_FOUND,
            RoomError::RoomFull(_) | RoomError::GameInProgress => StatusCode::CONFLICT,
            RoomError::InvalidName(_) => StatusCode::BAD_REQUEST,
            RoomError::NoFreeCode | RoomError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorBody {
            code: self.0.code().to_string(),
            msg: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Liveness probe.
///
/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

/// Categories players can pick from.
///
/// GET /api/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.words.categories().map(str::to_string).collect(),
    })
}

/// Create a room; the caller becomes its host.
///
/// POST /api/rooms
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NameRequest>,
) -> Result<(StatusCode, Json<Seat>), ApiError> {
    let seat = state.create_room(&req.name).await?;
    Ok((StatusCode::CREATED, Json(seat)))
}

/// Join a room in its lobby.
///
/// POST /api/rooms/{code}/join
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(req): Json<NameRequest>,
) -> Result<Json<Seat>, ApiError> {
    Ok(Json(state.join_room(&code, &req.name).await?))
}

/// Spectator view of a room: no word, no roles, no votes before results.
///
/// GET /api/rooms/{code}
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<RoomView>, ApiError> {
    let room = state.snapshot(&code).await?;
    Ok(Json(RoomView::public(&room)))
}
