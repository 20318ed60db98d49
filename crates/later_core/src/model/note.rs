//! Note domain model.

use super::space::SpaceId;
use super::{ensure_sort_order, ensure_title, UserId, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type NoteId = Uuid;

/// Free-form note stored inside one space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub user_id: UserId,
    pub space_id: SpaceId,
    pub title: String,
    pub content: Option<String>,
    /// Lowercase tag set; ordering is alphabetical.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Position inside the parent space.
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Note {
    /// Creates an unsaved note inside `space_id`.
    pub fn new(space_id: SpaceId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            space_id,
            title: title.into(),
            content: None,
            tags: BTreeSet::new(),
            sort_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Case-insensitive substring match on title or content.
    pub fn matches_text(&self, needle_lowercase: &str) -> bool {
        self.title.to_lowercase().contains(needle_lowercase)
            || self
                .content
                .as_deref()
                .is_some_and(|content| content.to_lowercase().contains(needle_lowercase))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_title(&self.title)?;
        ensure_sort_order(self.sort_order)
    }
}
