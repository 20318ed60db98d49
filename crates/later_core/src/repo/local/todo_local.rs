//! Local todo list repository.

use super::store::LocalStore;
use super::{local_call, KvResultExt};
use crate::model::now_epoch_ms;
use crate::model::space::SpaceId;
use crate::model::todo::{TodoItem, TodoItemId, TodoList, TodoListId};
use crate::model::UserId;
use crate::repo::aggregate::{completion_changed, TodoCounts};
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::ordering::{next_sort_order, positions};
use crate::repo::todo_repo::TodoListRepository;

/// Todo repository over the `todo_lists` and `todo_items` boxes.
pub struct LocalTodoListRepository<'conn> {
    store: LocalStore<'conn>,
    owner: UserId,
}

impl<'conn> LocalTodoListRepository<'conn> {
    pub fn new(store: LocalStore<'conn>, owner: UserId) -> Self {
        Self { store, owner }
    }

    fn items_of(&self, todo_list_id: TodoListId) -> RepoResult<Vec<TodoItem>> {
        let mut items = self.store.todo_items().values().context("load todo items")?;
        items.retain(|item| item.todo_list_id == todo_list_id);
        items.sort_by_key(|item| (item.sort_order, item.id));
        Ok(items)
    }

    fn next_list_order(&self, space_id: SpaceId) -> RepoResult<i64> {
        let lists = self.store.todo_lists().values().context("load todo lists")?;
        Ok(next_sort_order(
            lists
                .iter()
                .filter(|list| list.space_id == space_id)
                .map(|list| list.sort_order),
        ))
    }

    /// Overwrites the parent's counts from its current items.
    fn recount(&self, todo_list_id: TodoListId) -> RepoResult<TodoCounts> {
        let counts = TodoCounts::tally(&self.items_of(todo_list_id)?);
        let lists = self.store.todo_lists();
        if let Some(mut list) = lists.get(todo_list_id).context("load todo list")? {
            counts.apply_to(&mut list);
            list.updated_at = now_epoch_ms();
            lists.put(todo_list_id, &list).context("save todo list")?;
        }
        Ok(counts)
    }
}

/// Removes a todo list and all of its items.
pub(crate) fn delete_todo_list_cascade(
    store: &LocalStore<'_>,
    todo_list_id: TodoListId,
) -> RepoResult<()> {
    let items = store.todo_items();
    for item in items.values().context("load todo items")? {
        if item.todo_list_id == todo_list_id {
            items.delete(item.id).context("delete todo item")?;
        }
    }
    store
        .todo_lists()
        .delete(todo_list_id)
        .context("delete todo list")?;
    Ok(())
}

impl TodoListRepository for LocalTodoListRepository<'_> {
    fn create_todo_list(&self, list: &TodoList) -> RepoResult<TodoList> {
        local_call("todo_list_create", || {
            list.validate()?;
            if !self
                .store
                .spaces()
                .contains_key(list.space_id)
                .context("load space")?
            {
                return Err(RepoError::not_found(EntityKind::Space, list.space_id));
            }
            let now = now_epoch_ms();
            let stored = TodoList {
                user_id: self.owner,
                total_item_count: 0,
                completed_item_count: 0,
                sort_order: self.next_list_order(list.space_id)?,
                created_at: now,
                updated_at: now,
                ..list.clone()
            };
            self.store
                .todo_lists()
                .put(stored.id, &stored)
                .context("save todo list")?;
            Ok(stored)
        })
    }

    fn get_todo_list(&self, id: TodoListId) -> RepoResult<Option<TodoList>> {
        local_call("todo_list_get", || {
            self.store.todo_lists().get(id).context("load todo list")
        })
    }

    fn list_todo_lists(&self, space_id: SpaceId) -> RepoResult<Vec<TodoList>> {
        local_call("todo_list_list", || {
            let mut lists = self.store.todo_lists().values().context("load todo lists")?;
            lists.retain(|list| list.space_id == space_id);
            lists.sort_by_key(|list| (list.sort_order, list.id));
            Ok(lists)
        })
    }

    fn update_todo_list(&self, list: &TodoList) -> RepoResult<Option<TodoList>> {
        local_call("todo_list_update", || {
            list.validate()?;
            let lists = self.store.todo_lists();
            let existing = lists
                .get(list.id)
                .context("load todo list")?
                .ok_or_else(|| RepoError::not_found(EntityKind::TodoList, list.id))?;
            let stored = TodoList {
                name: list.name.clone(),
                description: list.description.clone(),
                updated_at: now_epoch_ms(),
                ..existing
            };
            lists.put(stored.id, &stored).context("save todo list")?;
            Ok(Some(stored))
        })
    }

    fn delete_todo_list(&self, id: TodoListId) -> RepoResult<()> {
        local_call("todo_list_delete", || {
            delete_todo_list_cascade(&self.store, id)
        })
    }

    fn reorder_todo_lists(
        &self,
        space_id: SpaceId,
        ordered_ids: &[TodoListId],
    ) -> RepoResult<()> {
        local_call("todo_list_reorder", || {
            let lists = self.store.todo_lists();
            let now = now_epoch_ms();
            for (id, position) in positions(ordered_ids) {
                match lists.get(id).context("load todo list")? {
                    Some(mut list) if list.space_id == space_id => {
                        list.sort_order = position;
                        list.updated_at = now;
                        lists.put(id, &list).context("save todo list")?;
                    }
                    _ => {}
                }
            }
            Ok(())
        })
    }

    fn move_todo_list_to_space(
        &self,
        id: TodoListId,
        space_id: SpaceId,
    ) -> RepoResult<Option<TodoList>> {
        local_call("todo_list_move", || {
            if !self
                .store
                .spaces()
                .contains_key(space_id)
                .context("load space")?
            {
                return Err(RepoError::not_found(EntityKind::Space, space_id));
            }
            let lists = self.store.todo_lists();
            let existing = lists
                .get(id)
                .context("load todo list")?
                .ok_or_else(|| RepoError::not_found(EntityKind::TodoList, id))?;
            let stored = TodoList {
                space_id,
                sort_order: self.next_list_order(space_id)?,
                updated_at: now_epoch_ms(),
                ..existing
            };
            lists.put(id, &stored).context("save todo list")?;
            Ok(Some(stored))
        })
    }

    fn create_todo_item(&self, item: &TodoItem) -> RepoResult<TodoItem> {
        local_call("todo_item_create", || {
            item.validate()?;
            if !self
                .store
                .todo_lists()
                .contains_key(item.todo_list_id)
                .context("load todo list")?
            {
                return Err(RepoError::not_found(
                    EntityKind::TodoList,
                    item.todo_list_id,
                ));
            }
            let siblings = self.items_of(item.todo_list_id)?;
            let now = now_epoch_ms();
            let stored = TodoItem {
                user_id: self.owner,
                sort_order: next_sort_order(siblings.iter().map(|item| item.sort_order)),
                created_at: now,
                updated_at: now,
                ..item.clone()
            };
            self.store
                .todo_items()
                .put(stored.id, &stored)
                .context("save todo item")?;
            self.recount(stored.todo_list_id)?;
            Ok(stored)
        })
    }

    fn get_todo_item(&self, id: TodoItemId) -> RepoResult<Option<TodoItem>> {
        local_call("todo_item_get", || {
            self.store.todo_items().get(id).context("load todo item")
        })
    }

    fn get_todo_items(&self, todo_list_id: TodoListId) -> RepoResult<Vec<TodoItem>> {
        local_call("todo_item_list", || self.items_of(todo_list_id))
    }

    fn update_todo_item(&self, item: &TodoItem) -> RepoResult<Option<TodoItem>> {
        local_call("todo_item_update", || {
            item.validate()?;
            let items = self.store.todo_items();
            let existing = items
                .get(item.id)
                .context("load todo item")?
                .ok_or_else(|| RepoError::not_found(EntityKind::TodoItem, item.id))?;
            let recount_needed = completion_changed(&existing, item);
            let stored = TodoItem {
                title: item.title.clone(),
                description: item.description.clone(),
                is_completed: item.is_completed,
                due_date: item.due_date,
                priority: item.priority,
                updated_at: now_epoch_ms(),
                ..existing
            };
            items.put(stored.id, &stored).context("save todo item")?;
            if recount_needed {
                self.recount(stored.todo_list_id)?;
            }
            Ok(Some(stored))
        })
    }

    fn toggle_todo_item(&self, id: TodoItemId) -> RepoResult<Option<TodoItem>> {
        local_call("todo_item_toggle", || {
            let items = self.store.todo_items();
            let mut item = items
                .get(id)
                .context("load todo item")?
                .ok_or_else(|| RepoError::not_found(EntityKind::TodoItem, id))?;
            item.toggle();
            item.updated_at = now_epoch_ms();
            items.put(id, &item).context("save todo item")?;
            self.recount(item.todo_list_id)?;
            Ok(Some(item))
        })
    }

    fn delete_todo_item(&self, id: TodoItemId) -> RepoResult<()> {
        local_call("todo_item_delete", || {
            let items = self.store.todo_items();
            let Some(item) = items.get(id).context("load todo item")? else {
                return Ok(());
            };
            items.delete(id).context("delete todo item")?;
            self.recount(item.todo_list_id)?;
            Ok(())
        })
    }

    fn reorder_todo_items(
        &self,
        todo_list_id: TodoListId,
        ordered_ids: &[TodoItemId],
    ) -> RepoResult<()> {
        local_call("todo_item_reorder", || {
            let items = self.store.todo_items();
            let now = now_epoch_ms();
            for (id, position) in positions(ordered_ids) {
                match items.get(id).context("load todo item")? {
                    Some(mut item) if item.todo_list_id == todo_list_id => {
                        item.sort_order = position;
                        item.updated_at = now;
                        items.put(id, &item).context("save todo item")?;
                    }
                    _ => {}
                }
            }
            Ok(())
        })
    }
}
