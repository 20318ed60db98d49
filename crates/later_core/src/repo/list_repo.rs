//! Custom list repository contract and remote implementation.
//!
//! # Invariants
//! - Lists are ordered within their space, items within their list.
//! - Deleting a list removes its items (cascade).

use super::client::{ensure_parent_owned, RemoteClient};
use super::error::{EntityKind, RepoError, RepoResult};
use super::ordering::{next_remote_sort_order, rewrite_remote_sort_orders, Siblings};
use super::row::{bool_to_int, parse_flag, parse_uuid};
use crate::model::list::{ListId, ListItem, ListItemId, ListModel, ListStyle};
use crate::model::space::SpaceId;
use crate::model::{now_epoch_ms, UserId};
use rusqlite::{params, Connection, Row};

const LIST_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    space_id,
    name,
    style,
    icon,
    sort_order,
    created_at,
    updated_at
FROM lists";

const LIST_ITEM_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    list_id,
    title,
    notes,
    is_checked,
    sort_order,
    created_at,
    updated_at
FROM list_items";

/// Repository interface for custom lists and their items.
pub trait ListRepository {
    fn create_list(&self, list: &ListModel) -> RepoResult<ListModel>;
    fn get_list(&self, id: ListId) -> RepoResult<Option<ListModel>>;
    fn list_lists(&self, space_id: SpaceId) -> RepoResult<Vec<ListModel>>;
    /// Persists name, style and icon.
    fn update_list(&self, list: &ListModel) -> RepoResult<Option<ListModel>>;
    fn delete_list(&self, id: ListId) -> RepoResult<()>;
    fn reorder_lists(&self, space_id: SpaceId, ordered_ids: &[ListId]) -> RepoResult<()>;
    fn move_list_to_space(&self, id: ListId, space_id: SpaceId)
        -> RepoResult<Option<ListModel>>;

    fn create_list_item(&self, item: &ListItem) -> RepoResult<ListItem>;
    fn get_list_items(&self, list_id: ListId) -> RepoResult<Vec<ListItem>>;
    /// Persists title, notes and checked flag.
    fn update_list_item(&self, item: &ListItem) -> RepoResult<Option<ListItem>>;
    fn toggle_list_item(&self, id: ListItemId) -> RepoResult<Option<ListItem>>;
    fn delete_list_item(&self, id: ListItemId) -> RepoResult<()>;
    fn reorder_list_items(&self, list_id: ListId, ordered_ids: &[ListItemId])
        -> RepoResult<()>;
}

/// Remote (row-table) list repository.
pub struct SqliteListRepository<'conn> {
    client: RemoteClient<'conn>,
}

impl<'conn> SqliteListRepository<'conn> {
    pub fn new(client: RemoteClient<'conn>) -> Self {
        Self { client }
    }
}

impl ListRepository for SqliteListRepository<'_> {
    fn create_list(&self, list: &ListModel) -> RepoResult<ListModel> {
        self.client.run("list_create", |conn, user_id| {
            list.validate()?;
            ensure_parent_owned(conn, EntityKind::Space, list.space_id, user_id)?;
            let sort_order = next_remote_sort_order(
                conn,
                Siblings::under("lists", "space_id", list.space_id),
                user_id,
            )?;
            conn.execute(
                "INSERT INTO lists (
                    id,
                    user_id,
                    space_id,
                    name,
                    style,
                    icon,
                    sort_order,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8);",
                params![
                    list.id.to_string(),
                    user_id.to_string(),
                    list.space_id.to_string(),
                    list.name.as_str(),
                    list.style.as_str(),
                    list.icon.as_deref(),
                    sort_order,
                    now_epoch_ms(),
                ],
            )?;
            load_list(conn, list.id, user_id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("created list {} not readable", list.id))
            })
        })
    }

    fn get_list(&self, id: ListId) -> RepoResult<Option<ListModel>> {
        self.client
            .run("list_get", |conn, user_id| load_list(conn, id, user_id))
    }

    fn list_lists(&self, space_id: SpaceId) -> RepoResult<Vec<ListModel>> {
        self.client.run("list_list", |conn, user_id| {
            let mut stmt = conn.prepare(&format!(
                "{LIST_SELECT_SQL}
                 WHERE user_id = ?1
                   AND space_id = ?2
                 ORDER BY sort_order ASC, id ASC;"
            ))?;
            let mut rows = stmt.query(params![user_id.to_string(), space_id.to_string()])?;
            let mut lists = Vec::new();
            while let Some(row) = rows.next()? {
                lists.push(parse_list_row(row)?);
            }
            Ok(lists)
        })
    }

    fn update_list(&self, list: &ListModel) -> RepoResult<Option<ListModel>> {
        self.client.run("list_update", |conn, user_id| {
            list.validate()?;
            let changed = conn.execute(
                "UPDATE lists
                 SET name = ?3,
                     style = ?4,
                     icon = ?5,
                     updated_at = ?6
                 WHERE id = ?1
                   AND user_id = ?2;",
                params![
                    list.id.to_string(),
                    user_id.to_string(),
                    list.name.as_str(),
                    list.style.as_str(),
                    list.icon.as_deref(),
                    now_epoch_ms(),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            load_list(conn, list.id, user_id)
        })
    }

    fn delete_list(&self, id: ListId) -> RepoResult<()> {
        self.client.run("list_delete", |conn, user_id| {
            conn.execute(
                "DELETE FROM lists WHERE id = ?1 AND user_id = ?2;",
                params![id.to_string(), user_id.to_string()],
            )?;
            Ok(())
        })
    }

    fn reorder_lists(&self, space_id: SpaceId, ordered_ids: &[ListId]) -> RepoResult<()> {
        self.client.run("list_reorder", |conn, user_id| {
            rewrite_remote_sort_orders(
                conn,
                Siblings::under("lists", "space_id", space_id),
                user_id,
                ordered_ids,
            )?;
            Ok(())
        })
    }

    fn move_list_to_space(
        &self,
        id: ListId,
        space_id: SpaceId,
    ) -> RepoResult<Option<ListModel>> {
        self.client.run("list_move", |conn, user_id| {
            ensure_parent_owned(conn, EntityKind::Space, space_id, user_id)?;
            let sort_order = next_remote_sort_order(
                conn,
                Siblings::under("lists", "space_id", space_id),
                user_id,
            )?;
            let changed = conn.execute(
                "UPDATE lists
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
            load_list(conn, id, user_id)
        })
    }

    fn create_list_item(&self, item: &ListItem) -> RepoResult<ListItem> {
        self.client.run("list_item_create", |conn, user_id| {
            item.validate()?;
            ensure_parent_owned(conn, EntityKind::List, item.list_id, user_id)?;
            let sort_order = next_remote_sort_order(
                conn,
                Siblings::under("list_items", "list_id", item.list_id),
                user_id,
            )?;
            conn.execute(
                "INSERT INTO list_items (
                    id,
                    user_id,
                    list_id,
                    title,
                    notes,
                    is_checked,
                    sort_order,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8);",
                params![
                    item.id.to_string(),
                    user_id.to_string(),
                    item.list_id.to_string(),
                    item.title.as_str(),
                    item.notes.as_deref(),
                    bool_to_int(item.is_checked),
                    sort_order,
                    now_epoch_ms(),
                ],
            )?;
            load_list_item(conn, item.id, user_id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("created list item {} not readable", item.id))
            })
        })
    }

    fn get_list_items(&self, list_id: ListId) -> RepoResult<Vec<ListItem>> {
        self.client.run("list_item_list", |conn, user_id| {
            let mut stmt = conn.prepare(&format!(
                "{LIST_ITEM_SELECT_SQL}
                 WHERE user_id = ?1
                   AND list_id = ?2
                 ORDER BY sort_order ASC, id ASC;"
            ))?;
            let mut rows = stmt.query(params![user_id.to_string(), list_id.to_string()])?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(parse_list_item_row(row)?);
            }
            Ok(items)
        })
    }

    fn update_list_item(&self, item: &ListItem) -> RepoResult<Option<ListItem>> {
        self.client.run("list_item_update", |conn, user_id| {
            item.validate()?;
            let changed = conn.execute(
                "UPDATE list_items
                 SET title = ?3,
                     notes = ?4,
                     is_checked = ?5,
                     updated_at = ?6
                 WHERE id = ?1
                   AND user_id = ?2;",
                params![
                    item.id.to_string(),
                    user_id.to_string(),
                    item.title.as_str(),
                    item.notes.as_deref(),
                    bool_to_int(item.is_checked),
                    now_epoch_ms(),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            load_list_item(conn, item.id, user_id)
        })
    }

    fn toggle_list_item(&self, id: ListItemId) -> RepoResult<Option<ListItem>> {
        self.client.run("list_item_toggle", |conn, user_id| {
            let changed = conn.execute(
                "UPDATE list_items
                 SET is_checked = 1 - is_checked,
                     updated_at = ?3
                 WHERE id = ?1
                   AND user_id = ?2;",
                params![id.to_string(), user_id.to_string(), now_epoch_ms()],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            load_list_item(conn, id, user_id)
        })
    }

    fn delete_list_item(&self, id: ListItemId) -> RepoResult<()> {
        self.client.run("list_item_delete", |conn, user_id| {
            conn.execute(
                "DELETE FROM list_items WHERE id = ?1 AND user_id = ?2;",
                params![id.to_string(), user_id.to_string()],
            )?;
            Ok(())
        })
    }

    fn reorder_list_items(&self, list_id: ListId, ordered_ids: &[ListItemId]) -> RepoResult<()> {
        self.client.run("list_item_reorder", |conn, user_id| {
            rewrite_remote_sort_orders(
                conn,
                Siblings::under("list_items", "list_id", list_id),
                user_id,
                ordered_ids,
            )?;
            Ok(())
        })
    }
}

fn load_list(conn: &Connection, id: ListId, user_id: UserId) -> RepoResult<Option<ListModel>> {
    let mut stmt = conn.prepare(&format!(
        "{LIST_SELECT_SQL}
         WHERE id = ?1
           AND user_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_list_row(row)?));
    }
    Ok(None)
}

fn load_list_item(
    conn: &Connection,
    id: ListItemId,
    user_id: UserId,
) -> RepoResult<Option<ListItem>> {
    let mut stmt = conn.prepare(&format!(
        "{LIST_ITEM_SELECT_SQL}
         WHERE id = ?1
           AND user_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_list_item_row(row)?));
    }
    Ok(None)
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<ListModel> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let space_text: String = row.get("space_id")?;
    let style_text: String = row.get("style")?;
    let style = ListStyle::parse(&style_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid list style `{style_text}` in lists.style"))
    })?;

    Ok(ListModel {
        id: parse_uuid(&id_text, "lists.id")?,
        user_id: parse_uuid(&user_text, "lists.user_id")?,
        space_id: parse_uuid(&space_text, "lists.space_id")?,
        name: row.get("name")?,
        style,
        icon: row.get("icon")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_list_item_row(row: &Row<'_>) -> RepoResult<ListItem> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let list_text: String = row.get("list_id")?;
    Ok(ListItem {
        id: parse_uuid(&id_text, "list_items.id")?,
        user_id: parse_uuid(&user_text, "list_items.user_id")?,
        list_id: parse_uuid(&list_text, "list_items.list_id")?,
        title: row.get("title")?,
        notes: row.get("notes")?,
        is_checked: parse_flag(row.get("is_checked")?, "list_items.is_checked")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
