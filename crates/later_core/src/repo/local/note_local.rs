//! Local note repository.

use super::store::LocalStore;
use super::{local_call, KvResultExt};
use crate::model::note::{Note, NoteId};
use crate::model::now_epoch_ms;
use crate::model::space::SpaceId;
use crate::model::UserId;
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::note_repo::NoteRepository;
use crate::repo::ordering::{next_sort_order, positions};
use std::cmp::Reverse;

/// Note repository over the `notes` box.
pub struct LocalNoteRepository<'conn> {
    store: LocalStore<'conn>,
    owner: UserId,
}

impl<'conn> LocalNoteRepository<'conn> {
    pub fn new(store: LocalStore<'conn>, owner: UserId) -> Self {
        Self { store, owner }
    }

    fn ensure_space_exists(&self, space_id: SpaceId) -> RepoResult<()> {
        if !self
            .store
            .spaces()
            .contains_key(space_id)
            .context("load space")?
        {
            return Err(RepoError::not_found(EntityKind::Space, space_id));
        }
        Ok(())
    }

    fn next_order_in(&self, space_id: SpaceId) -> RepoResult<i64> {
        let notes = self.store.notes().values().context("load notes")?;
        Ok(next_sort_order(
            notes
                .iter()
                .filter(|note| note.space_id == space_id)
                .map(|note| note.sort_order),
        ))
    }

    fn filtered(&self, keep: impl Fn(&Note) -> bool) -> RepoResult<Vec<Note>> {
        let mut notes = self.store.notes().values().context("load notes")?;
        notes.retain(|note| keep(note));
        notes.sort_by_key(|note| (Reverse(note.updated_at), note.id));
        Ok(notes)
    }
}

impl NoteRepository for LocalNoteRepository<'_> {
    fn create_note(&self, note: &Note) -> RepoResult<Note> {
        local_call("note_create", || {
            note.validate()?;
            self.ensure_space_exists(note.space_id)?;
            let now = now_epoch_ms();
            let stored = Note {
                user_id: self.owner,
                sort_order: self.next_order_in(note.space_id)?,
                created_at: now,
                updated_at: now,
                ..note.clone()
            };
            self.store
                .notes()
                .put(stored.id, &stored)
                .context("save note")?;
            Ok(stored)
        })
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        local_call("note_get", || self.store.notes().get(id).context("load note"))
    }

    fn list_notes(&self, space_id: SpaceId) -> RepoResult<Vec<Note>> {
        local_call("note_list", || {
            let mut notes = self.store.notes().values().context("load notes")?;
            notes.retain(|note| note.space_id == space_id);
            notes.sort_by_key(|note| (note.sort_order, note.id));
            Ok(notes)
        })
    }

    fn update_note(&self, note: &Note) -> RepoResult<Option<Note>> {
        local_call("note_update", || {
            note.validate()?;
            let notes = self.store.notes();
            let existing = notes
                .get(note.id)
                .context("load note")?
                .ok_or_else(|| RepoError::not_found(EntityKind::Note, note.id))?;
            let stored = Note {
                title: note.title.clone(),
                content: note.content.clone(),
                tags: note.tags.clone(),
                updated_at: now_epoch_ms(),
                ..existing
            };
            notes.put(stored.id, &stored).context("save note")?;
            Ok(Some(stored))
        })
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        local_call("note_delete", || {
            self.store.notes().delete(id).context("delete note")?;
            Ok(())
        })
    }

    fn reorder_notes(&self, space_id: SpaceId, ordered_ids: &[NoteId]) -> RepoResult<()> {
        local_call("note_reorder", || {
            let notes = self.store.notes();
            let now = now_epoch_ms();
            for (id, position) in positions(ordered_ids) {
                match notes.get(id).context("load note")? {
                    Some(mut note) if note.space_id == space_id => {
                        note.sort_order = position;
                        note.updated_at = now;
                        notes.put(id, &note).context("save note")?;
                    }
                    _ => {}
                }
            }
            Ok(())
        })
    }

    fn move_note_to_space(&self, id: NoteId, space_id: SpaceId) -> RepoResult<Option<Note>> {
        local_call("note_move", || {
            self.ensure_space_exists(space_id)?;
            let notes = self.store.notes();
            let existing = notes
                .get(id)
                .context("load note")?
                .ok_or_else(|| RepoError::not_found(EntityKind::Note, id))?;
            let stored = Note {
                space_id,
                sort_order: self.next_order_in(space_id)?,
                updated_at: now_epoch_ms(),
                ..existing
            };
            notes.put(id, &stored).context("save note")?;
            Ok(Some(stored))
        })
    }

    fn search_notes(&self, text: &str) -> RepoResult<Vec<Note>> {
        local_call("note_search", || {
            let needle = text.trim().to_lowercase();
            if needle.is_empty() {
                return Ok(Vec::new());
            }
            self.filtered(|note| note.matches_text(&needle))
        })
    }

    fn list_notes_by_tag(&self, tag: &str) -> RepoResult<Vec<Note>> {
        local_call("note_list_by_tag", || self.filtered(|note| note.has_tag(tag)))
    }
}
