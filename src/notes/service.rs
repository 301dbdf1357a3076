//! Note Service
//! Mission: CRUD over notes, with every read-by-id and mutation gated on ownership

use crate::auth::models::Claims;
use crate::error::ApiError;
use crate::notes::{
    models::{Note, NoteLookup, UpdateNoteRequest},
    store::NoteStore,
};
use std::sync::Arc;
use tracing::{info, warn};

const NOTE_NOT_FOUND: &str = "Note not found";

pub struct NoteService {
    store: Arc<NoteStore>,
}

impl NoteService {
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, caller: &Claims, title: &str, body: &str) -> Result<Note, ApiError> {
        let note = self.store.insert(title, body, &caller.username)?;
        info!("🗒️  Note {} created by {}", note.id, caller.username);
        Ok(note)
    }

    /// One note by id, or every note the caller owns when `id` is `None`
    pub fn get(&self, id: Option<&str>, caller: &Claims) -> Result<NoteLookup, ApiError> {
        match id {
            Some(id) => self.owned_note(id, caller, "read").map(NoteLookup::One),
            None => Ok(NoteLookup::Many(
                self.store.list_by_owner(&caller.username)?,
            )),
        }
    }

    pub fn update(
        &self,
        id: &str,
        fields: &UpdateNoteRequest,
        caller: &Claims,
    ) -> Result<Note, ApiError> {
        let note = self.owned_note(id, caller, "update")?;
        if fields.is_empty() {
            return Ok(note);
        }

        let updated = self
            .store
            .update(id, fields.title.as_deref(), fields.body.as_deref())?
            .ok_or_else(|| ApiError::NotFound(NOTE_NOT_FOUND.to_string()))?;

        info!("✏️  Note {} updated by {}", id, caller.username);
        Ok(updated)
    }

    pub fn delete(&self, id: &str, caller: &Claims) -> Result<(), ApiError> {
        self.owned_note(id, caller, "delete")?;

        if !self.store.delete(id)? {
            return Err(ApiError::NotFound(NOTE_NOT_FOUND.to_string()));
        }

        info!("🗑️  Note {} deleted by {}", id, caller.username);
        Ok(())
    }

    fn owned_note(&self, id: &str, caller: &Claims, action: &str) -> Result<Note, ApiError> {
        let note = self
            .store
            .get(id)?
            .ok_or_else(|| ApiError::NotFound(NOTE_NOT_FOUND.to_string()))?;

        if note.username != caller.username {
            warn!(
                "{} tried to {} note {} owned by {}",
                caller.username, action, id, note.username
            );
            return Err(ApiError::Forbidden(format!(
                "You are not authorized to {} this note",
                action
            )));
        }

        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_for(username: &str) -> Claims {
        Claims {
            username: username.to_string(),
            user_id: format!("{}-id", username),
            iat: 0,
            exp: i64::MAX,
        }
    }

    fn create_service() -> (NoteService, Arc<NoteStore>) {
        let store = Arc::new(NoteStore::in_memory().unwrap());
        (NoteService::new(store.clone()), store)
    }

    #[test]
    fn test_create_uses_verified_owner() {
        let (service, _) = create_service();
        let note = service.create(&claims_for("alice"), "T", "B").unwrap();
        assert_eq!(note.username, "alice");
    }

    #[test]
    fn test_get_without_id_lists_only_own_notes() {
        let (service, _) = create_service();
        let alice = claims_for("alice");
        service.create(&alice, "a1", "x").unwrap();
        service.create(&claims_for("bob"), "b1", "y").unwrap();

        match service.get(None, &alice).unwrap() {
            NoteLookup::Many(notes) => {
                assert_eq!(notes.len(), 1);
                assert_eq!(notes[0].title, "a1");
            }
            NoteLookup::One(_) => panic!("expected a list"),
        }
    }

    #[test]
    fn test_get_by_id_checks_owner() {
        let (service, _) = create_service();
        let note = service.create(&claims_for("alice"), "T", "B").unwrap();

        assert!(matches!(
            service.get(Some(&note.id), &claims_for("alice")).unwrap(),
            NoteLookup::One(n) if n.id == note.id
        ));
        assert!(matches!(
            service.get(Some(&note.id), &claims_for("bob")),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            service.get(Some("missing"), &claims_for("alice")),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_non_owner_update_does_not_mutate() {
        let (service, store) = create_service();
        let note = service.create(&claims_for("alice"), "T", "B").unwrap();

        let fields = UpdateNoteRequest {
            title: Some("hacked".to_string()),
            body: None,
        };
        let err = service.update(&note.id, &fields, &claims_for("bob")).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(store.get(&note.id).unwrap().unwrap().title, "T");

        let updated = service.update(&note.id, &fields, &claims_for("alice")).unwrap();
        assert_eq!(updated.title, "hacked");
        assert_eq!(updated.body, "B");
    }

    #[test]
    fn test_update_missing_note() {
        let (service, _) = create_service();
        let err = service
            .update("missing", &UpdateNoteRequest::default(), &claims_for("alice"))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_delete_is_owner_only_and_not_repeatable() {
        let (service, store) = create_service();
        let note = service.create(&claims_for("alice"), "T", "B").unwrap();

        assert!(matches!(
            service.delete(&note.id, &claims_for("bob")),
            Err(ApiError::Forbidden(_))
        ));
        assert!(store.get(&note.id).unwrap().is_some());

        service.delete(&note.id, &claims_for("alice")).unwrap();
        assert!(matches!(
            service.delete(&note.id, &claims_for("alice")),
            Err(ApiError::NotFound(_))
        ));
    }
}
