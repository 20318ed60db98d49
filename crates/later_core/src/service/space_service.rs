//! Space use-case service.
//!
//! # Responsibility
//! - Create, rename, restyle, archive and reorder spaces.
//! - Validate names and hex colors before they reach storage.
//!
//! # Invariants
//! - Space names are trimmed and non-empty.
//! - Colors are `#RRGGBB` / `#RRGGBBAA`, stored uppercase; blank means none.

use super::reorder::{reorder_optimistically, ReorderOutcome};
use super::{normalize_name, normalize_optional, ServiceError, ServiceResult};
use crate::model::space::{is_valid_color, Space, SpaceContentCounts, SpaceId};
use crate::repo::error::EntityKind;
use crate::repo::ordering::merge_into_slots;
use crate::repo::space_repo::SpaceRepository;

/// Space service facade over repository implementations.
pub struct SpaceService<R: SpaceRepository> {
    repo: R,
}

impl<R: SpaceRepository> SpaceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_space(
        &self,
        name: &str,
        icon: Option<String>,
        color: Option<String>,
    ) -> ServiceResult<Space> {
        let mut space = Space::new(normalize_name(name)?);
        space.icon = normalize_optional(icon);
        space.color = normalize_color(color)?;
        Ok(self.repo.create_space(&space)?)
    }

    pub fn get_space(&self, id: SpaceId) -> ServiceResult<Space> {
        self.repo
            .get_space(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Space, id))
    }

    pub fn list_spaces(&self, include_archived: bool) -> ServiceResult<Vec<Space>> {
        Ok(self.repo.list_spaces(include_archived)?)
    }

    pub fn rename_space(&self, id: SpaceId, name: &str) -> ServiceResult<Space> {
        let name = normalize_name(name)?;
        let mut space = self.get_space(id)?;
        space.name = name;
        self.save(space)
    }

    /// Replaces icon and color; `None` clears either.
    pub fn set_space_appearance(
        &self,
        id: SpaceId,
        icon: Option<String>,
        color: Option<String>,
    ) -> ServiceResult<Space> {
        let color = normalize_color(color)?;
        let mut space = self.get_space(id)?;
        space.icon = normalize_optional(icon);
        space.color = color;
        self.save(space)
    }

    pub fn archive_space(&self, id: SpaceId) -> ServiceResult<Space> {
        self.repo
            .archive_space(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Space, id))
    }

    pub fn unarchive_space(&self, id: SpaceId) -> ServiceResult<Space> {
        self.repo
            .unarchive_space(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Space, id))
    }

    /// Deletes the space and everything it contains.
    pub fn delete_space(&self, id: SpaceId) -> ServiceResult<()> {
        Ok(self.repo.delete_space(id)?)
    }

    pub fn content_counts(&self, id: SpaceId) -> ServiceResult<SpaceContentCounts> {
        Ok(self.repo.count_space_content(id)?)
    }

    /// Drags one space within the active (non-archived) listing.
    ///
    /// Archived spaces keep their slots; the whole sequence is rewritten so
    /// orders stay unique across both listings.
    pub fn move_space(&self, from: usize, to: usize) -> ServiceResult<ReorderOutcome> {
        let all = self.repo.list_spaces(true)?;
        let all_ids: Vec<SpaceId> = all.iter().map(|space| space.id).collect();
        let active: Vec<SpaceId> = all
            .iter()
            .filter(|space| !space.is_archived)
            .map(|space| space.id)
            .collect();
        reorder_optimistically(EntityKind::Space, &active, from, to, |order| {
            self.repo.reorder_spaces(&merge_into_slots(&all_ids, order))
        })
    }

    fn save(&self, space: Space) -> ServiceResult<Space> {
        self.repo
            .update_space(&space)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Space, space.id))
    }
}

/// Trims and uppercases a hex color; blank becomes `None`.
pub fn normalize_color(value: Option<String>) -> ServiceResult<Option<String>> {
    let Some(color) = normalize_optional(value) else {
        return Ok(None);
    };
    if !is_valid_color(&color) {
        return Err(ServiceError::InvalidColor(color));
    }
    Ok(Some(color.to_ascii_uppercase()))
}
