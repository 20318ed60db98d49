//! Todo list repository contract and remote implementation.
//!
//! # Responsibility
//! - Provide space-scoped todo list CRUD and list-scoped item CRUD.
//! - Keep `total_item_count` / `completed_item_count` in sync with items.
//!
//! # Invariants
//! - Item create, delete, toggle and completion-changing updates recompute the
//!   parent counts from the full item collection before returning.
//! - Callers cannot write counts through `update_todo_list`.

use super::aggregate::{completion_changed, recount_remote};
use super::client::{ensure_parent_owned, RemoteClient};
use super::error::{EntityKind, RepoError, RepoResult};
use super::ordering::{next_remote_sort_order, rewrite_remote_sort_orders, Siblings};
use super::row::{bool_to_int, parse_flag, parse_uuid};
use crate::model::space::SpaceId;
use crate::model::todo::{TodoItem, TodoItemId, TodoList, TodoListId, TodoPriority};
use crate::model::{now_epoch_ms, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TODO_LIST_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    space_id,
    name,
    description,
    total_item_count,
    completed_item_count,
    sort_order,
    created_at,
    updated_at
FROM todo_lists";

const TODO_ITEM_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    todo_list_id,
    title,
    description,
    is_completed,
    due_date,
    priority,
    sort_order,
    created_at,
    updated_at
FROM todo_items";

/// Repository interface for todo lists and their items.
pub trait TodoListRepository {
    /// Persists a new list with zeroed counts.
    fn create_todo_list(&self, list: &TodoList) -> RepoResult<TodoList>;
    fn get_todo_list(&self, id: TodoListId) -> RepoResult<Option<TodoList>>;
    fn list_todo_lists(&self, space_id: SpaceId) -> RepoResult<Vec<TodoList>>;
    /// Persists name and description.
    fn update_todo_list(&self, list: &TodoList) -> RepoResult<Option<TodoList>>;
    /// Deletes the list together with its items.
    fn delete_todo_list(&self, id: TodoListId) -> RepoResult<()>;
    fn reorder_todo_lists(&self, space_id: SpaceId, ordered_ids: &[TodoListId])
        -> RepoResult<()>;
    fn move_todo_list_to_space(
        &self,
        id: TodoListId,
        space_id: SpaceId,
    ) -> RepoResult<Option<TodoList>>;

    fn create_todo_item(&self, item: &TodoItem) -> RepoResult<TodoItem>;
    fn get_todo_item(&self, id: TodoItemId) -> RepoResult<Option<TodoItem>>;
    fn get_todo_items(&self, todo_list_id: TodoListId) -> RepoResult<Vec<TodoItem>>;
    /// Persists editable item fields; recounts the parent when completion changes.
    fn update_todo_item(&self, item: &TodoItem) -> RepoResult<Option<TodoItem>>;
    fn toggle_todo_item(&self, id: TodoItemId) -> RepoResult<Option<TodoItem>>;
    fn delete_todo_item(&self, id: TodoItemId) -> RepoResult<()>;
    fn reorder_todo_items(
        &self,
        todo_list_id: TodoListId,
        ordered_ids: &[TodoItemId],
    ) -> RepoResult<()>;
}

/// Remote (row-table) todo repository.
pub struct SqliteTodoListRepository<'conn> {
    client: RemoteClient<'conn>,
}

impl<'conn> SqliteTodoListRepository<'conn> {
    pub fn new(client: RemoteClient<'conn>) -> Self {
        Self { client }
    }
}

impl TodoListRepository for SqliteTodoListRepository<'_> {
    fn create_todo_list(&self, list: &TodoList) -> RepoResult<TodoList> {
        self.client.run("todo_list_create", |conn, user_id| {
            list.validate()?;
            ensure_parent_owned(conn, EntityKind::Space, list.space_id, user_id)?;
            let sort_order = next_remote_sort_order(
                conn,
                Siblings::under("todo_lists", "space_id", list.space_id),
                user_id,
            )?;
            conn.execute(
                "INSERT INTO todo_lists (
                    id,
                    user_id,
                    space_id,
                    name,
                    description,
                    total_item_count,
                    completed_item_count,
                    sort_order,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, ?7, ?7);",
                params![
                    list.id.to_string(),
                    user_id.to_string(),
                    list.space_id.to_string(),
                    list.name.as_str(),
                    list.description.as_deref(),
                    sort_order,
                    now_epoch_ms(),
                ],
            )?;
            load_todo_list(conn, list.id, user_id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("created todo list {} not readable", list.id))
            })
        })
    }

    fn get_todo_list(&self, id: TodoListId) -> RepoResult<Option<TodoList>> {
        self.client
            .run("todo_list_get", |conn, user_id| load_todo_list(conn, id, user_id))
    }

    fn list_todo_lists(&self, space_id: SpaceId) -> RepoResult<Vec<TodoList>> {
        self.client.run("todo_list_list", |conn, user_id| {
            let mut stmt = conn.prepare(&format!(
                "{TODO_LIST_SELECT_SQL}
                 WHERE user_id = ?1
                   AND space_id = ?2
                 ORDER BY sort_order ASC, id ASC;"
            ))?;
            let mut rows = stmt.query(params![user_id.to_string(), space_id.to_string()])?;
            let mut lists = Vec::new();
            while let Some(row) = rows.next()? {
                lists.push(parse_todo_list_row(row)?);
            }
            Ok(lists)
        })
    }

    fn update_todo_list(&self, list: &TodoList) -> RepoResult<Option<TodoList>> {
        self.client.run("todo_list_update", |conn, user_id| {
            list.validate()?;
            let changed = conn.execute(
                "UPDATE todo_lists
                 SET name = ?3,
                     description = ?4,
                     updated_at = ?5
                 WHERE id = ?1
                   AND user_id = ?2;",
                params![
                    list.id.to_string(),
                    user_id.to_string(),
                    list.name.as_str(),
                    list.description.as_deref(),
                    now_epoch_ms(),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            load_todo_list(conn, list.id, user_id)
        })
    }

    fn delete_todo_list(&self, id: TodoListId) -> RepoResult<()> {
        self.client.run("todo_list_delete", |conn, user_id| {
            conn.execute(
                "DELETE FROM todo_lists WHERE id = ?1 AND user_id = ?2;",
                params![id.to_string(), user_id.to_string()],
            )?;
            Ok(())
        })
    }

    fn reorder_todo_lists(
        &self,
        space_id: SpaceId,
        ordered_ids: &[TodoListId],
    ) -> RepoResult<()> {
        self.client.run("todo_list_reorder", |conn, user_id| {
            rewrite_remote_sort_orders(
                conn,
                Siblings::under("todo_lists", "space_id", space_id),
                user_id,
                ordered_ids,
            )?;
            Ok(())
        })
    }

    fn move_todo_list_to_space(
        &self,
        id: TodoListId,
        space_id: SpaceId,
    ) -> RepoResult<Option<TodoList>> {
        self.client.run("todo_list_move", |conn, user_id| {
            ensure_parent_owned(conn, EntityKind::Space, space_id, user_id)?;
            let sort_order = next_remote_sort_order(
                conn,
                Siblings::under("todo_lists", "space_id", space_id),
                user_id,
            )?;
            let changed = conn.execute(
                "UPDATE todo_lists
                 SET space_id = ?3,
                     sort_order = ?4,
                     updated_at = ?5
                 WHERE id = ?1
                   AND user_id = ?2;",
                params![
                    id.to_string(),
                    user_id.to_string(),
                    space_id.to_string(),
                    sort_order,
                    now_epoch_ms(),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            load_todo_list(conn, id, user_id)
        })
    }

    fn create_todo_item(&self, item: &TodoItem) -> RepoResult<TodoItem> {
        self.client.run("todo_item_create", |conn, user_id| {
            item.validate()?;
            ensure_parent_owned(conn, EntityKind::TodoList, item.todo_list_id, user_id)?;
            let sort_order = next_remote_sort_order(
                conn,
                Siblings::under("todo_items", "todo_list_id", item.todo_list_id),
                user_id,
            )?;
            conn.execute(
                "INSERT INTO todo_items (
                    id,
                    user_id,
                    todo_list_id,
                    title,
                    description,
                    is_completed,
                    due_date,
                    priority,
                    sort_order,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10);",
                params![
                    item.id.to_string(),
                    user_id.to_string(),
                    item.todo_list_id.to_string(),
                    item.title.as_str(),
                    item.description.as_deref(),
                    bool_to_int(item.is_completed),
                    item.due_date,
                    item.priority.map(TodoPriority::as_str),
                    sort_order,
                    now_epoch_ms(),
                ],
            )?;
            recount_remote(conn, item.todo_list_id, user_id)?;
            load_todo_item(conn, item.id, user_id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("created todo item {} not readable", item.id))
            })
        })
    }

    fn get_todo_item(&self, id: TodoItemId) -> RepoResult<Option<TodoItem>> {
        self.client
            .run("todo_item_get", |conn, user_id| load_todo_item(conn, id, user_id))
    }

    fn get_todo_items(&self, todo_list_id: TodoListId) -> RepoResult<Vec<TodoItem>> {
        self.client.run("todo_item_list", |conn, user_id| {
            let mut stmt = conn.prepare(&format!(
                "{TODO_ITEM_SELECT_SQL}
                 WHERE user_id = ?1
                   AND todo_list_id = ?2
                 ORDER BY sort_order ASC, id ASC;"
            ))?;
            let mut rows = stmt.query(params![user_id.to_string(), todo_list_id.to_string()])?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(parse_todo_item_row(row)?);
            }
            Ok(items)
        })
    }

    fn update_todo_item(&self, item: &TodoItem) -> RepoResult<Option<TodoItem>> {
        self.client.run("todo_item_update", |conn, user_id| {
            item.validate()?;
            let Some(existing) = load_todo_item(conn, item.id, user_id)? else {
                return Ok(None);
            };
            conn.execute(
                "UPDATE todo_items
                 SET title = ?3,
                     description = ?4,
                     is_completed = ?5,
                     due_date = ?6,
                     priority = ?7,
                     updated_at = ?8
                 WHERE id = ?1
                   AND user_id = ?2;",
                params![
                    item.id.to_string(),
                    user_id.to_string(),
                    item.title.as_str(),
                    item.description.as_deref(),
                    bool_to_int(item.is_completed),
                    item.due_date,
                    item.priority.map(TodoPriority::as_str),
                    now_epoch_ms(),
                ],
            )?;
            if completion_changed(&existing, item) {
                recount_remote(conn, existing.todo_list_id, user_id)?;
            }
            load_todo_item(conn, item.id, user_id)
        })
    }

    fn toggle_todo_item(&self, id: TodoItemId) -> RepoResult<Option<TodoItem>> {
        self.client.run("todo_item_toggle", |conn, user_id| {
            let Some(existing) = load_todo_item(conn, id, user_id)? else {
                return Ok(None);
            };
            conn.execute(
                "UPDATE todo_items
                 SET is_completed = ?3,
                     updated_at = ?4
                 WHERE id = ?1
                   AND user_id = ?2;",
                params![
                    id.to_string(),
                    user_id.to_string(),
                    bool_to_int(!existing.is_completed),
                    now_epoch_ms(),
                ],
            )?;
            recount_remote(conn, existing.todo_list_id, user_id)?;
            load_todo_item(conn, id, user_id)
        })
    }

    fn delete_todo_item(&self, id: TodoItemId) -> RepoResult<()> {
        self.client.run("todo_item_delete", |conn, user_id| {
            let todo_list_id: Option<String> = conn
                .query_row(
                    "SELECT todo_list_id FROM todo_items WHERE id = ?1 AND user_id = ?2;",
                    params![id.to_string(), user_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(todo_list_id) = todo_list_id else {
                return Ok(());
            };

            conn.execute(
                "DELETE FROM todo_items WHERE id = ?1 AND user_id = ?2;",
                params![id.to_string(), user_id.to_string()],
            )?;
            recount_remote(
                conn,
                parse_uuid(&todo_list_id, "todo_items.todo_list_id")?,
                user_id,
            )?;
            Ok(())
        })
    }

    fn reorder_todo_items(
        &self,
        todo_list_id: TodoListId,
        ordered_ids: &[TodoItemId],
    ) -> RepoResult<()> {
        self.client.run("todo_item_reorder", |conn, user_id| {
            rewrite_remote_sort_orders(
                conn,
                Siblings::under("todo_items", "todo_list_id", todo_list_id),
                user_id,
                ordered_ids,
            )?;
            Ok(())
        })
    }
}

fn load_todo_list(
    conn: &Connection,
    id: TodoListId,
    user_id: UserId,
) -> RepoResult<Option<TodoList>> {
    let mut stmt = conn.prepare(&format!(
        "{TODO_LIST_SELECT_SQL}
         WHERE id = ?1
           AND user_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_todo_list_row(row)?));
    }
    Ok(None)
}

fn load_todo_item(
    conn: &Connection,
    id: TodoItemId,
    user_id: UserId,
) -> RepoResult<Option<TodoItem>> {
    let mut stmt = conn.prepare(&format!(
        "{TODO_ITEM_SELECT_SQL}
         WHERE id = ?1
           AND user_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_todo_item_row(row)?));
    }
    Ok(None)
}

fn parse_todo_list_row(row: &Row<'_>) -> RepoResult<TodoList> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let space_text: String = row.get("space_id")?;
    Ok(TodoList {
        id: parse_uuid(&id_text, "todo_lists.id")?,
        user_id: parse_uuid(&user_text, "todo_lists.user_id")?,
        space_id: parse_uuid(&space_text, "todo_lists.space_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        total_item_count: row.get("total_item_count")?,
        completed_item_count: row.get("completed_item_count")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_todo_item_row(row: &Row<'_>) -> RepoResult<TodoItem> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let list_text: String = row.get("todo_list_id")?;
    let priority = match row.get::<_, Option<String>>("priority")? {
        Some(value) => Some(TodoPriority::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid priority `{value}` in todo_items.priority"))
        })?),
        None => None,
    };

    Ok(TodoItem {
        id: parse_uuid(&id_text, "todo_items.id")?,
        user_id: parse_uuid(&user_text, "todo_items.user_id")?,
        todo_list_id: parse_uuid(&list_text, "todo_items.todo_list_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        is_completed: parse_flag(row.get("is_completed")?, "todo_items.is_completed")?,
        due_date: row.get("due_date")?,
        priority,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
