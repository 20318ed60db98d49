//! List use-case service.

use super::reorder::{reorder_optimistically, ReorderOutcome};
use super::{normalize_name, normalize_optional, normalize_title, ServiceError, ServiceResult};
use crate::model::list::{ListId, ListItem, ListItemId, ListModel, ListStyle};
use crate::model::space::SpaceId;
use crate::repo::error::EntityKind;
use crate::repo::list_repo::ListRepository;

pub struct ListService<R: ListRepository> {
    repo: R,
}

impl<R: ListRepository> ListService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_list(
        &self,
        space_id: SpaceId,
        name: &str,
        style: ListStyle,
        icon: Option<String>,
    ) -> ServiceResult<ListModel> {
        let mut list = ListModel::new(space_id, normalize_name(name)?);
        list.style = style;
        list.icon = normalize_optional(icon);
        Ok(self.repo.create_list(&list)?)
    }

    pub fn get_list(&self, id: ListId) -> ServiceResult<ListModel> {
        self.repo
            .get_list(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::List, id))
    }

    pub fn list_lists(&self, space_id: SpaceId) -> ServiceResult<Vec<ListModel>> {
        Ok(self.repo.list_lists(space_id)?)
    }

    pub fn update_list(
        &self,
        id: ListId,
        name: &str,
        style: ListStyle,
        icon: Option<String>,
    ) -> ServiceResult<ListModel> {
        let name = normalize_name(name)?;
        let mut list = self.get_list(id)?;
        list.name = name;
        list.style = style;
        list.icon = normalize_optional(icon);
        self.repo
            .update_list(&list)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::List, id))
    }

    pub fn delete_list(&self, id: ListId) -> ServiceResult<()> {
        Ok(self.repo.delete_list(id)?)
    }

    pub fn move_list(
        &self,
        space_id: SpaceId,
        from: usize,
        to: usize,
    ) -> ServiceResult<ReorderOutcome> {
        let current: Vec<ListId> = self
            .repo
            .list_lists(space_id)?
            .into_iter()
            .map(|list| list.id)
            .collect();
        reorder_optimistically(EntityKind::List, &current, from, to, |order| {
            self.repo.reorder_lists(space_id, order)
        })
    }

    pub fn move_list_to_space(&self, id: ListId, space_id: SpaceId) -> ServiceResult<ListModel> {
        let list = self.get_list(id)?;
        if list.space_id == space_id {
            return Err(ServiceError::InvalidMove(format!(
                "list {id} is already in space {space_id}"
            )));
        }
        self.repo
            .move_list_to_space(id, space_id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::List, id))
    }

    pub fn add_item(
        &self,
        list_id: ListId,
        title: &str,
        notes: Option<String>,
    ) -> ServiceResult<ListItem> {
        let mut item = ListItem::new(list_id, normalize_title(title)?);
        item.notes = normalize_optional(notes);
        Ok(self.repo.create_list_item(&item)?)
    }

    pub fn items(&self, list_id: ListId) -> ServiceResult<Vec<ListItem>> {
        Ok(self.repo.get_list_items(list_id)?)
    }

    /// Rewrites title and notes of `item`; the check state is taken as given.
    pub fn edit_item(&self, item: &ListItem) -> ServiceResult<ListItem> {
        let edited = ListItem {
            title: normalize_title(&item.title)?,
            notes: normalize_optional(item.notes.clone()),
            ..item.clone()
        };
        self.repo
            .update_list_item(&edited)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::ListItem, item.id))
    }

    pub fn toggle_item(&self, id: ListItemId) -> ServiceResult<ListItem> {
        self.repo
            .toggle_list_item(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::ListItem, id))
    }

    pub fn delete_item(&self, id: ListItemId) -> ServiceResult<()> {
        Ok(self.repo.delete_list_item(id)?)
    }

    pub fn move_item(
        &self,
        list_id: ListId,
        from: usize,
        to: usize,
    ) -> ServiceResult<ReorderOutcome> {
        let current: Vec<ListItemId> = self
            .repo
            .get_list_items(list_id)?
            .into_iter()
            .map(|item| item.id)
            .collect();
        reorder_optimistically(EntityKind::ListItem, &current, from, to, |order| {
            self.repo.reorder_list_items(list_id, order)
        })
    }
}
