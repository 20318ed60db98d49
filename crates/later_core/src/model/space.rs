//! Space domain model.
//!
//! # Invariants
//! - Archiving is the default removal path; archived spaces keep their content.
//! - `color`, when set, is a `#RRGGBB` or `#RRGGBBAA` hex string.

use super::{ensure_name, ensure_sort_order, UserId, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}([0-9A-Fa-f]{2})?$").expect("valid hex color regex")
});

pub type SpaceId = Uuid;

/// Top-level container owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: SpaceId,
    pub user_id: UserId,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_archived: bool,
    /// Position among the owner's spaces.
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Number of content records stored under one space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceContentCounts {
    pub notes: i64,
    pub todo_lists: i64,
    pub lists: i64,
}

impl SpaceContentCounts {
    pub fn total(&self) -> i64 {
        self.notes + self.todo_lists + self.lists
    }
}

impl Space {
    /// Creates an unsaved space with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.into(),
            icon: None,
            color: None,
            is_archived: false,
            sort_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn archive(&mut self) {
        self.is_archived = true;
    }

    pub fn unarchive(&mut self) {
        self.is_archived = false;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_name(&self.name)?;
        if let Some(color) = self.color.as_deref() {
            if !is_valid_color(color) {
                return Err(ValidationError::InvalidColor(color.to_string()));
            }
        }
        ensure_sort_order(self.sort_order)
    }
}

/// Returns whether `value` is a `#RRGGBB` or `#RRGGBBAA` color.
pub fn is_valid_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_color, Space};
    use crate::model::ValidationError;

    #[test]
    fn color_accepts_rgb_and_rgba_hex() {
        assert!(is_valid_color("#1A2b3C"));
        assert!(is_valid_color("#1A2b3Cff"));
        assert!(!is_valid_color("1A2B3C"));
        assert!(!is_valid_color("#12345"));
        assert!(!is_valid_color("#GGGGGG"));
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_color() {
        let blank = Space::new("   ");
        assert_eq!(blank.validate(), Err(ValidationError::BlankName));

        let mut colored = Space::new("Work");
        colored.color = Some("red".to_string());
        assert!(matches!(
            colored.validate(),
            Err(ValidationError::InvalidColor(_))
        ));
    }

    #[test]
    fn archive_and_unarchive_toggle_flag() {
        let mut space = Space::new("Home");
        space.archive();
        assert!(space.is_archived);
        space.unarchive();
        assert!(!space.is_archived);
    }
}
