//! Todo list use-case service.
//!
//! # Responsibility
//! - Manage todo lists inside a space and the items inside each list.
//! - Expose completion toggling; counts are maintained by the repository.

use super::reorder::{reorder_optimistically, ReorderOutcome};
use super::{normalize_name, normalize_optional, normalize_title, ServiceError, ServiceResult};
use crate::model::space::SpaceId;
use crate::model::todo::{TodoItem, TodoItemId, TodoList, TodoListId, TodoPriority};
use crate::repo::error::EntityKind;
use crate::repo::todo_repo::TodoListRepository;

/// Editable fields of a todo item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoItemInput {
    pub title: String,
    pub description: Option<String>,
    /// Due date in epoch milliseconds.
    pub due_date: Option<i64>,
    pub priority: Option<TodoPriority>,
}

impl TodoItemInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

pub struct TodoService<R: TodoListRepository> {
    repo: R,
}

impl<R: TodoListRepository> TodoService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_todo_list(
        &self,
        space_id: SpaceId,
        name: &str,
        description: Option<String>,
    ) -> ServiceResult<TodoList> {
        let mut list = TodoList::new(space_id, normalize_name(name)?);
        list.description = normalize_optional(description);
        Ok(self.repo.create_todo_list(&list)?)
    }

    pub fn get_todo_list(&self, id: TodoListId) -> ServiceResult<TodoList> {
        self.repo
            .get_todo_list(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::TodoList, id))
    }

    pub fn list_todo_lists(&self, space_id: SpaceId) -> ServiceResult<Vec<TodoList>> {
        Ok(self.repo.list_todo_lists(space_id)?)
    }

    pub fn update_todo_list(
        &self,
        id: TodoListId,
        name: &str,
        description: Option<String>,
    ) -> ServiceResult<TodoList> {
        let name = normalize_name(name)?;
        let mut list = self.get_todo_list(id)?;
        list.name = name;
        list.description = normalize_optional(description);
        self.repo
            .update_todo_list(&list)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::TodoList, id))
    }

    pub fn delete_todo_list(&self, id: TodoListId) -> ServiceResult<()> {
        Ok(self.repo.delete_todo_list(id)?)
    }

    pub fn move_todo_list(
        &self,
        space_id: SpaceId,
        from: usize,
        to: usize,
    ) -> ServiceResult<ReorderOutcome> {
        let current: Vec<TodoListId> = self
            .repo
            .list_todo_lists(space_id)?
            .into_iter()
            .map(|list| list.id)
            .collect();
        reorder_optimistically(EntityKind::TodoList, &current, from, to, |order| {
            self.repo.reorder_todo_lists(space_id, order)
        })
    }

    pub fn move_todo_list_to_space(
        &self,
        id: TodoListId,
        space_id: SpaceId,
    ) -> ServiceResult<TodoList> {
        let list = self.get_todo_list(id)?;
        if list.space_id == space_id {
            return Err(ServiceError::InvalidMove(format!(
                "todo list {id} is already in space {space_id}"
            )));
        }
        self.repo
            .move_todo_list_to_space(id, space_id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::TodoList, id))
    }

    pub fn add_item(
        &self,
        todo_list_id: TodoListId,
        input: TodoItemInput,
    ) -> ServiceResult<TodoItem> {
        let mut item = TodoItem::new(todo_list_id, normalize_title(&input.title)?);
        item.description = normalize_optional(input.description);
        item.due_date = input.due_date;
        item.priority = input.priority;
        Ok(self.repo.create_todo_item(&item)?)
    }

    pub fn items(&self, todo_list_id: TodoListId) -> ServiceResult<Vec<TodoItem>> {
        Ok(self.repo.get_todo_items(todo_list_id)?)
    }

    /// Replaces the editable fields of one item; completion is kept.
    pub fn edit_item(&self, id: TodoItemId, input: TodoItemInput) -> ServiceResult<TodoItem> {
        let title = normalize_title(&input.title)?;
        let mut item = self
            .repo
            .get_todo_item(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::TodoItem, id))?;
        item.title = title;
        item.description = normalize_optional(input.description);
        item.due_date = input.due_date;
        item.priority = input.priority;
        self.repo
            .update_todo_item(&item)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::TodoItem, id))
    }

    pub fn toggle_item(&self, id: TodoItemId) -> ServiceResult<TodoItem> {
        self.repo
            .toggle_todo_item(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::TodoItem, id))
    }

    pub fn delete_item(&self, id: TodoItemId) -> ServiceResult<()> {
        Ok(self.repo.delete_todo_item(id)?)
    }

    pub fn move_item(
        &self,
        todo_list_id: TodoListId,
        from: usize,
        to: usize,
    ) -> ServiceResult<ReorderOutcome> {
        let current: Vec<TodoItemId> = self
            .repo
            .get_todo_items(todo_list_id)?
            .into_iter()
            .map(|item| item.id)
            .collect();
        reorder_optimistically(EntityKind::TodoItem, &current, from, to, |order| {
            self.repo.reorder_todo_items(todo_list_id, order)
        })
    }
}
