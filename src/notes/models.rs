//! Note Models

use serde::{Deserialize, Serialize};

/// A personal note. `username` is the owner and is never client-writable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
}

/// POST /notes/create body. Any `username` sent by older clients is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub body: String,
}

/// PATCH /notes/update/:id body
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl UpdateNoteRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}

/// Result of GET /notes[/:noteid]
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum NoteLookup {
    One(Note),
    Many(Vec<Note>),
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub msg: &'static str,
    pub note: Note,
}
