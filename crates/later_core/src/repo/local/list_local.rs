//! Local list repository.

use super::store::LocalStore;
use super::{local_call, KvResultExt};
use crate::model::list::{ListId, ListItem, ListItemId, ListModel};
use crate::model::now_epoch_ms;
use crate::model::space::SpaceId;
use crate::model::UserId;
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::list_repo::ListRepository;
use crate::repo::ordering::{next_sort_order, positions};

/// List repository over the `lists` and `list_items` boxes.
pub struct LocalListRepository<'conn> {
    store: LocalStore<'conn>,
    owner: UserId,
}

impl<'conn> LocalListRepository<'conn> {
    pub fn new(store: LocalStore<'conn>, owner: UserId) -> Self {
        Self { store, owner }
    }

    fn items_of(&self, list_id: ListId) -> RepoResult<Vec<ListItem>> {
        let mut items = self.store.list_items().values().context("load list items")?;
        items.retain(|item| item.list_id == list_id);
        items.sort_by_key(|item| (item.sort_order, item.id));
        Ok(items)
    }

    fn next_list_order(&self, space_id: SpaceId) -> RepoResult<i64> {
        let lists = self.store.lists().values().context("load lists")?;
        Ok(next_sort_order(
            lists
                .iter()
                .filter(|list| list.space_id == space_id)
                .map(|list| list.sort_order),
        ))
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
}

/// Removes a list and all of its items.
pub(crate) fn delete_list_cascade(store: &LocalStore<'_>, list_id: ListId) -> RepoResult<()> {
    let items = store.list_items();
    for item in items.values().context("load list items")? {
        if item.list_id == list_id {
            items.delete(item.id).context("delete list item")?;
        }
    }
    store.lists().delete(list_id).context("delete list")?;
    Ok(())
}

impl ListRepository for LocalListRepository<'_> {
    fn create_list(&self, list: &ListModel) -> RepoResult<ListModel> {
        local_call("list_create", || {
            list.validate()?;
            self.ensure_space_exists(list.space_id)?;
            let now = now_epoch_ms();
            let stored = ListModel {
                user_id: self.owner,
                sort_order: self.next_list_order(list.space_id)?,
                created_at: now,
                updated_at: now,
                ..list.clone()
            };
            self.store
                .lists()
                .put(stored.id, &stored)
                .context("save list")?;
            Ok(stored)
        })
    }

    fn get_list(&self, id: ListId) -> RepoResult<Option<ListModel>> {
        local_call("list_get", || self.store.lists().get(id).context("load list"))
    }

    fn list_lists(&self, space_id: SpaceId) -> RepoResult<Vec<ListModel>> {
        local_call("list_list", || {
            let mut lists = self.store.lists().values().context("load lists")?;
            lists.retain(|list| list.space_id == space_id);
            lists.sort_by_key(|list| (list.sort_order, list.id));
            Ok(lists)
        })
    }

    fn update_list(&self, list: &ListModel) -> RepoResult<Option<ListModel>> {
        local_call("list_update", || {
            list.validate()?;
            let lists = self.store.lists();
            let existing = lists
                .get(list.id)
                .context("load list")?
                .ok_or_else(|| RepoError::not_found(EntityKind::List, list.id))?;
            let stored = ListModel {
                name: list.name.clone(),
                style: list.style,
                icon: list.icon.clone(),
                updated_at: now_epoch_ms(),
                ..existing
            };
            lists.put(stored.id, &stored).context("save list")?;
            Ok(Some(stored))
        })
    }

    fn delete_list(&self, id: ListId) -> RepoResult<()> {
        local_call("list_delete", || delete_list_cascade(&self.store, id))
    }

    fn reorder_lists(&self, space_id: SpaceId, ordered_ids: &[ListId]) -> RepoResult<()> {
        local_call("list_reorder", || {
            let lists = self.store.lists();
            let now = now_epoch_ms();
            for (id, position) in positions(ordered_ids) {
                match lists.get(id).context("load list")? {
                    Some(mut list) if list.space_id == space_id => {
                        list.sort_order = position;
                        list.updated_at = now;
                        lists.put(id, &list).context("save list")?;
                    }
                    _ => {}
                }
            }
            Ok(())
        })
    }

    fn move_list_to_space(
        &self,
        id: ListId,
        space_id: SpaceId,
    ) -> RepoResult<Option<ListModel>> {
        local_call("list_move", || {
            self.ensure_space_exists(space_id)?;
            let lists = self.store.lists();
            let existing = lists
                .get(id)
                .context("load list")?
                .ok_or_else(|| RepoError::not_found(EntityKind::List, id))?;
            let stored = ListModel {
                space_id,
                sort_order: self.next_list_order(space_id)?,
                updated_at: now_epoch_ms(),
                ..existing
            };
            lists.put(id, &stored).context("save list")?;
            Ok(Some(stored))
        })
    }

    fn create_list_item(&self, item: &ListItem) -> RepoResult<ListItem> {
        local_call("list_item_create", || {
            item.validate()?;
            if !self
                .store
                .lists()
                .contains_key(item.list_id)
                .context("load list")?
            {
                return Err(RepoError::not_found(EntityKind::List, item.list_id));
            }
            let siblings = self.items_of(item.list_id)?;
            let now = now_epoch_ms();
            let stored = ListItem {
                user_id: self.owner,
                sort_order: next_sort_order(siblings.iter().map(|item| item.sort_order)),
                created_at: now,
                updated_at: now,
                ..item.clone()
            };
            self.store
                .list_items()
                .put(stored.id, &stored)
                .context("save list item")?;
            Ok(stored)
        })
    }

    fn get_list_items(&self, list_id: ListId) -> RepoResult<Vec<ListItem>> {
        local_call("list_item_list", || self.items_of(list_id))
    }

    fn update_list_item(&self, item: &ListItem) -> RepoResult<Option<ListItem>> {
        local_call("list_item_update", || {
            item.validate()?;
            let items = self.store.list_items();
            let existing = items
                .get(item.id)
                .context("load list item")?
                .ok_or_else(|| RepoError::not_found(EntityKind::ListItem, item.id))?;
            let stored = ListItem {
                title: item.title.clone(),
                notes: item.notes.clone(),
                is_checked: item.is_checked,
                updated_at: now_epoch_ms(),
                ..existing
            };
            items.put(stored.id, &stored).context("save list item")?;
            Ok(Some(stored))
        })
    }

    fn toggle_list_item(&self, id: ListItemId) -> RepoResult<Option<ListItem>> {
        local_call("list_item_toggle", || {
            let items = self.store.list_items();
            let mut item = items
                .get(id)
                .context("load list item")?
                .ok_or_else(|| RepoError::not_found(EntityKind::ListItem, id))?;
            item.toggle();
            item.updated_at = now_epoch_ms();
            items.put(id, &item).context("save list item")?;
            Ok(Some(item))
        })
    }

    fn delete_list_item(&self, id: ListItemId) -> RepoResult<()> {
        local_call("list_item_delete", || {
            self.store
                .list_items()
                .delete(id)
                .context("delete list item")?;
            Ok(())
        })
    }

    fn reorder_list_items(&self, list_id: ListId, ordered_ids: &[ListItemId]) -> RepoResult<()> {
        local_call("list_item_reorder", || {
            let items = self.store.list_items();
            let now = now_epoch_ms();
            for (id, position) in positions(ordered_ids) {
                match items.get(id).context("load list item")? {
                    Some(mut item) if item.list_id == list_id => {
                        item.sort_order = position;
                        item.updated_at = now;
                        items.put(id, &item).context("save list item")?;
                    }
                    _ => {}
                }
            }
            Ok(())
        })
    }
}
