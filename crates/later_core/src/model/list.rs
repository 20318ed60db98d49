//! Custom list domain model (bullets, numbered, checkboxes).

use super::space::SpaceId;
use super::{ensure_name, ensure_sort_order, ensure_title, UserId, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ListId = Uuid;
pub type ListItemId = Uuid;

/// How list items are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    #[default]
    Bullets,
    Numbered,
    Checkboxes,
}

impl ListStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullets => "bullets",
            Self::Numbered => "numbered",
            Self::Checkboxes => "checkboxes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bullets" => Some(Self::Bullets),
            "numbered" => Some(Self::Numbered),
            "checkboxes" => Some(Self::Checkboxes),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModel {
    pub id: ListId,
    pub user_id: UserId,
    pub space_id: SpaceId,
    pub name: String,
    pub style: ListStyle,
    pub icon: Option<String>,
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ListModel {
    pub fn new(space_id: SpaceId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            space_id,
            name: name.into(),
            style: ListStyle::default(),
            icon: None,
            sort_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_name(&self.name)?;
        ensure_sort_order(self.sort_order)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: ListItemId,
    pub user_id: UserId,
    pub list_id: ListId,
    pub title: String,
    pub notes: Option<String>,
    pub is_checked: bool,
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ListItem {
    pub fn new(list_id: ListId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            list_id,
            title: title.into(),
            notes: None,
            is_checked: false,
            sort_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.is_checked = !self.is_checked;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_title(&self.title)?;
        ensure_sort_order(self.sort_order)
    }
}
