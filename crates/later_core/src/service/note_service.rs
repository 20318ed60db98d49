//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/update/get/list APIs scoped to a space.
//! - Normalize tags and expose search and by-tag listings.
//! - Move notes within and across spaces.
//!
//! # Invariants
//! - Tag names are trimmed, lowercase and deduplicated.
//! - Search and by-tag results are sorted by `updated_at DESC, id ASC`.

use super::reorder::{reorder_optimistically, ReorderOutcome};
use super::{normalize_optional, normalize_title, ServiceError, ServiceResult};
use crate::model::note::{Note, NoteId};
use crate::model::space::SpaceId;
use crate::repo::error::EntityKind;
use crate::repo::note_repo::NoteRepository;
use std::collections::BTreeSet;

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one note at the end of `space_id`.
    pub fn create_note(
        &self,
        space_id: SpaceId,
        title: &str,
        content: Option<String>,
        tags: &[String],
    ) -> ServiceResult<Note> {
        let mut note = Note::new(space_id, normalize_title(title)?);
        note.content = normalize_optional(content);
        note.tags = normalize_tags(tags)?;
        Ok(self.repo.create_note(&note)?)
    }

    pub fn get_note(&self, id: NoteId) -> ServiceResult<Note> {
        self.repo
            .get_note(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Note, id))
    }

    pub fn list_notes(&self, space_id: SpaceId) -> ServiceResult<Vec<Note>> {
        Ok(self.repo.list_notes(space_id)?)
    }

    /// Replaces title and content fully; tags are kept.
    pub fn update_note(
        &self,
        id: NoteId,
        title: &str,
        content: Option<String>,
    ) -> ServiceResult<Note> {
        let title = normalize_title(title)?;
        let mut note = self.get_note(id)?;
        note.title = title;
        note.content = normalize_optional(content);
        self.save(note)
    }

    /// Replaces the full tag set of one note.
    pub fn set_note_tags(&self, id: NoteId, tags: &[String]) -> ServiceResult<Note> {
        let tags = normalize_tags(tags)?;
        let mut note = self.get_note(id)?;
        note.tags = tags;
        self.save(note)
    }

    pub fn delete_note(&self, id: NoteId) -> ServiceResult<()> {
        Ok(self.repo.delete_note(id)?)
    }

    /// Drags one note within its space.
    pub fn move_note(
        &self,
        space_id: SpaceId,
        from: usize,
        to: usize,
    ) -> ServiceResult<ReorderOutcome> {
        let current: Vec<NoteId> = self
            .repo
            .list_notes(space_id)?
            .into_iter()
            .map(|note| note.id)
            .collect();
        reorder_optimistically(EntityKind::Note, &current, from, to, |order| {
            self.repo.reorder_notes(space_id, order)
        })
    }

    /// Re-parents a note and appends it to the end of `space_id`.
    pub fn move_note_to_space(&self, id: NoteId, space_id: SpaceId) -> ServiceResult<Note> {
        let note = self.get_note(id)?;
        if note.space_id == space_id {
            return Err(ServiceError::InvalidMove(format!(
                "note {id} is already in space {space_id}"
            )));
        }
        self.repo
            .move_note_to_space(id, space_id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Note, id))
    }

    /// Case-insensitive substring search over titles and contents.
    pub fn search_notes(&self, text: &str) -> ServiceResult<Vec<Note>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.repo.search_notes(trimmed)?)
    }

    pub fn notes_with_tag(&self, tag: &str) -> ServiceResult<Vec<Note>> {
        let tag = normalize_tag(tag).ok_or_else(|| ServiceError::InvalidTag(tag.to_string()))?;
        Ok(self.repo.list_notes_by_tag(&tag)?)
    }

    fn save(&self, note: Note) -> ServiceResult<Note> {
        self.repo
            .update_note(&note)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Note, note.id))
    }
}

/// Normalizes one tag; blank input yields `None`.
pub fn normalize_tag(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Normalizes a tag list into a deduplicated set.
///
/// # Errors
/// - `InvalidTag` when any tag is blank.
pub fn normalize_tags(values: &[String]) -> ServiceResult<BTreeSet<String>> {
    values
        .iter()
        .map(|value| normalize_tag(value).ok_or_else(|| ServiceError::InvalidTag(value.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag, normalize_tags};
    use crate::service::ServiceError;

    #[test]
    fn tags_are_lowercased_and_deduplicated() {
        let tags = normalize_tags(&[
            "Work".to_string(),
            " work ".to_string(),
            "Ideas".to_string(),
        ])
        .unwrap();
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec!["ideas".to_string(), "work".to_string()]
        );
    }

    #[test]
    fn blank_tags_are_rejected() {
        assert_eq!(normalize_tag("   "), None);
        let err = normalize_tags(&["ok".to_string(), " ".to_string()]).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTag(_)));
    }
}
