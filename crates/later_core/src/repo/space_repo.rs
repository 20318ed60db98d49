//! Space repository contract and remote implementation.
//!
//! # Responsibility
//! - Provide user-scoped CRUD, archive and reorder APIs for spaces.
//! - Report per-space content counts.
//!
//! # Invariants
//! - Default listing excludes archived spaces.
//! - Deleting a space removes its notes, todo lists and lists (cascade).
//! - Updates on rows that are missing or owned by another user affect no row
//!   and return `Ok(None)`.

use super::client::RemoteClient;
use super::error::{RepoError, RepoResult};
use super::ordering::{next_remote_sort_order, rewrite_remote_sort_orders, Siblings};
use super::row::{bool_to_int, parse_flag, parse_uuid};
use crate::model::space::{Space, SpaceContentCounts, SpaceId};
use crate::model::{now_epoch_ms, UserId};
use rusqlite::{params, Connection, Row};

const SPACE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    name,
    icon,
    color,
    is_archived,
    sort_order,
    created_at,
    updated_at
FROM spaces";

/// Repository interface for space operations.
pub trait SpaceRepository {
    /// Persists a new space, stamping owner and sort order.
    fn create_space(&self, space: &Space) -> RepoResult<Space>;
    fn get_space(&self, id: SpaceId) -> RepoResult<Option<Space>>;
    /// Lists spaces ordered by `sort_order`; archived ones only on request.
    fn list_spaces(&self, include_archived: bool) -> RepoResult<Vec<Space>>;
    /// Persists name, icon, color and archived flag.
    fn update_space(&self, space: &Space) -> RepoResult<Option<Space>>;
    fn archive_space(&self, id: SpaceId) -> RepoResult<Option<Space>>;
    fn unarchive_space(&self, id: SpaceId) -> RepoResult<Option<Space>>;
    /// Deletes the space and everything inside it.
    fn delete_space(&self, id: SpaceId) -> RepoResult<()>;
    fn reorder_spaces(&self, ordered_ids: &[SpaceId]) -> RepoResult<()>;
    fn count_space_content(&self, id: SpaceId) -> RepoResult<SpaceContentCounts>;
}

/// Remote (row-table) space repository.
pub struct SqliteSpaceRepository<'conn> {
    client: RemoteClient<'conn>,
}

impl<'conn> SqliteSpaceRepository<'conn> {
    pub fn new(client: RemoteClient<'conn>) -> Self {
        Self { client }
    }

    fn set_archived(
        &self,
        operation: &'static str,
        id: SpaceId,
        archived: bool,
    ) -> RepoResult<Option<Space>> {
        self.client.run(operation, |conn, user_id| {
            let changed = conn.execute(
                "UPDATE spaces
                 SET is_archived = ?3,
                     updated_at = ?4
                 WHERE id = ?1
                   AND user_id = ?2;",
                params![
                    id.to_string(),
                    user_id.to_string(),
                    bool_to_int(archived),
                    now_epoch_ms(),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            load_space(conn, id, user_id)
        })
    }
}

impl SpaceRepository for SqliteSpaceRepository<'_> {
    fn create_space(&self, space: &Space) -> RepoResult<Space> {
        self.client.run("space_create", |conn, user_id| {
            space.validate()?;
            let sort_order = next_remote_sort_order(conn, Siblings::root("spaces"), user_id)?;
            conn.execute(
                "INSERT INTO spaces (
                    id,
                    user_id,
                    name,
                    icon,
                    color,
                    is_archived,
                    sort_order,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8);",
                params![
                    space.id.to_string(),
                    user_id.to_string(),
                    space.name.as_str(),
                    space.icon.as_deref(),
                    space.color.as_deref(),
                    bool_to_int(space.is_archived),
                    sort_order,
                    now_epoch_ms(),
                ],
            )?;
            load_space(conn, space.id, user_id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("created space {} not readable", space.id))
            })
        })
    }

    fn get_space(&self, id: SpaceId) -> RepoResult<Option<Space>> {
        self.client
            .run("space_get", |conn, user_id| load_space(conn, id, user_id))
    }

    fn list_spaces(&self, include_archived: bool) -> RepoResult<Vec<Space>> {
        self.client.run("space_list", |conn, user_id| {
            let mut stmt = conn.prepare(&format!(
                "{SPACE_SELECT_SQL}
                 WHERE user_id = ?1
                   AND (?2 = 1 OR is_archived = 0)
                 ORDER BY sort_order ASC, id ASC;"
            ))?;
            let mut rows = stmt.query(params![
                user_id.to_string(),
                bool_to_int(include_archived)
            ])?;
            let mut spaces = Vec::new();
            while let Some(row) = rows.next()? {
                spaces.push(parse_space_row(row)?);
            }
            Ok(spaces)
        })
    }

    fn update_space(&self, space: &Space) -> RepoResult<Option<Space>> {
        self.client.run("space_update", |conn, user_id| {
            space.validate()?;
            let changed = conn.execute(
                "UPDATE spaces
                 SET name = ?3,
                     icon = ?4,
                     color = ?5,
                     is_archived = ?6,
                     updated_at = ?7
                 WHERE id = ?1
                   AND user_id = ?2;",
                params![
                    space.id.to_string(),
                    user_id.to_string(),
                    space.name.as_str(),
                    space.icon.as_deref(),
                    space.color.as_deref(),
                    bool_to_int(space.is_archived),
                    now_epoch_ms(),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            load_space(conn, space.id, user_id)
        })
    }

    fn archive_space(&self, id: SpaceId) -> RepoResult<Option<Space>> {
        self.set_archived("space_archive", id, true)
    }

    fn unarchive_space(&self, id: SpaceId) -> RepoResult<Option<Space>> {
        self.set_archived("space_unarchive", id, false)
    }

    fn delete_space(&self, id: SpaceId) -> RepoResult<()> {
        self.client.run("space_delete", |conn, user_id| {
            conn.execute(
                "DELETE FROM spaces WHERE id = ?1 AND user_id = ?2;",
                params![id.to_string(), user_id.to_string()],
            )?;
            Ok(())
        })
    }

    fn reorder_spaces(&self, ordered_ids: &[SpaceId]) -> RepoResult<()> {
        self.client.run("space_reorder", |conn, user_id| {
            rewrite_remote_sort_orders(conn, Siblings::root("spaces"), user_id, ordered_ids)?;
            Ok(())
        })
    }

    fn count_space_content(&self, id: SpaceId) -> RepoResult<SpaceContentCounts> {
        self.client.run("space_count_content", |conn, user_id| {
            let count_in = |table: &str| -> RepoResult<i64> {
                let count = conn.query_row(
                    &format!(
                        "SELECT COUNT(*) FROM {table} WHERE space_id = ?1 AND user_id = ?2;"
                    ),
                    params![id.to_string(), user_id.to_string()],
                    |row| row.get(0),
                )?;
                Ok(count)
            };
            Ok(SpaceContentCounts {
                notes: count_in("notes")?,
                todo_lists: count_in("todo_lists")?,
                lists: count_in("lists")?,
            })
        })
    }
}

fn load_space(conn: &Connection, id: SpaceId, user_id: UserId) -> RepoResult<Option<Space>> {
    let mut stmt = conn.prepare(&format!(
        "{SPACE_SELECT_SQL}
         WHERE id = ?1
           AND user_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_space_row(row)?));
    }
    Ok(None)
}

fn parse_space_row(row: &Row<'_>) -> RepoResult<Space> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    Ok(Space {
        id: parse_uuid(&id_text, "spaces.id")?,
        user_id: parse_uuid(&user_text, "spaces.user_id")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
        is_archived: parse_flag(row.get("is_archived")?, "spaces.is_archived")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
