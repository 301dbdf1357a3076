//! Note API Endpoints
//! All routes here sit behind the auth gate and the rate limiter.

use crate::app::AppState;
use crate::auth::models::Claims;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::notes::models::{CreateNoteRequest, NoteLookup, NoteResponse, UpdateNoteRequest};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

/// POST /notes/create
pub async fn create_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<CreateNoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = state
        .notes
        .create(&claims, &payload.title, &payload.body)?;

    Ok(Json(NoteResponse {
        msg: "A new note has been added",
        note,
    }))
}

/// GET /notes
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<NoteLookup>, ApiError> {
    Ok(Json(state.notes.get(None, &claims)?))
}

/// GET /notes/:noteid
pub async fn get_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(note_id): Path<String>,
) -> Result<Json<NoteLookup>, ApiError> {
    Ok(Json(state.notes.get(Some(&note_id), &claims)?))
}

/// PATCH /notes/update/:id
pub async fn update_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(note_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateNoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = state.notes.update(&note_id, &payload, &claims)?;

    Ok(Json(NoteResponse {
        msg: "Note has been updated",
        note,
    }))
}

/// DELETE /notes/delete/:id
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(note_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.notes.delete(&note_id, &claims)?;
    Ok(Json(json!({ "msg": "Note has been deleted" })))
}
