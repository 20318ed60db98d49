//! Note repository contract and remote implementation.
//!
//! # Responsibility
//! - Provide space-scoped note CRUD, reorder and move APIs.
//! - Provide tag (`contains`) and Unicode case-insensitive text search over
//!   the user's notes.
//!
//! # Invariants
//! - Space listing is ordered by `sort_order ASC, id ASC`.
//! - Search results are ordered by `updated_at DESC, id ASC`.
//! - `tags` is persisted as a JSON array of lowercase strings.

use super::client::{ensure_parent_owned, RemoteClient};
use super::error::{EntityKind, RepoError, RepoResult};
use super::ordering::{next_remote_sort_order, rewrite_remote_sort_orders, Siblings};
use super::row::parse_uuid;
use crate::model::note::{Note, NoteId};
use crate::model::space::SpaceId;
use crate::model::{now_epoch_ms, UserId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    space_id,
    title,
    content,
    tags,
    sort_order,
    created_at,
    updated_at
FROM notes";

/// Repository interface for note operations.
pub trait NoteRepository {
    fn create_note(&self, note: &Note) -> RepoResult<Note>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists notes of one space ordered by `sort_order`.
    fn list_notes(&self, space_id: SpaceId) -> RepoResult<Vec<Note>>;
    /// Persists title, content and tags.
    fn update_note(&self, note: &Note) -> RepoResult<Option<Note>>;
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
    fn reorder_notes(&self, space_id: SpaceId, ordered_ids: &[NoteId]) -> RepoResult<()>;
    /// Re-parents a note and appends it to the target space.
    fn move_note_to_space(&self, id: NoteId, space_id: SpaceId) -> RepoResult<Option<Note>>;
    /// Case-insensitive substring search on title or content.
    fn search_notes(&self, text: &str) -> RepoResult<Vec<Note>>;
    /// Notes whose tag set contains `tag`.
    fn list_notes_by_tag(&self, tag: &str) -> RepoResult<Vec<Note>>;
}

/// Remote (row-table) note repository.
pub struct SqliteNoteRepository<'conn> {
    client: RemoteClient<'conn>,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(client: RemoteClient<'conn>) -> Self {
        Self { client }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &Note) -> RepoResult<Note> {
        self.client.run("note_create", |conn, user_id| {
            note.validate()?;
            ensure_parent_owned(conn, EntityKind::Space, note.space_id, user_id)?;
            let sort_order = next_remote_sort_order(
                conn,
                Siblings::under("notes", "space_id", note.space_id),
                user_id,
            )?;
            conn.execute(
                "INSERT INTO notes (
                    id,
                    user_id,
                    space_id,
                    title,
                    content,
                    tags,
                    sort_order,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8);",
                params![
                    note.id.to_string(),
                    user_id.to_string(),
                    note.space_id.to_string(),
                    note.title.as_str(),
                    note.content.as_deref(),
                    tags_to_db(&note.tags)?,
                    sort_order,
                    now_epoch_ms(),
                ],
            )?;
            load_note(conn, note.id, user_id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("created note {} not readable", note.id))
            })
        })
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.client
            .run("note_get", |conn, user_id| load_note(conn, id, user_id))
    }

    fn list_notes(&self, space_id: SpaceId) -> RepoResult<Vec<Note>> {
        self.client.run("note_list", |conn, user_id| {
            query_notes(
                conn,
                "WHERE user_id = ?1 AND space_id = ?2 ORDER BY sort_order ASC, id ASC",
                vec![
                    Value::Text(user_id.to_string()),
                    Value::Text(space_id.to_string()),
                ],
            )
        })
    }

    fn update_note(&self, note: &Note) -> RepoResult<Option<Note>> {
        self.client.run("note_update", |conn, user_id| {
            note.validate()?;
            let changed = conn.execute(
                "UPDATE notes
                 SET title = ?3,
                     content = ?4,
                     tags = ?5,
                     updated_at = ?6
                 WHERE id = ?1
                   AND user_id = ?2;",
                params![
                    note.id.to_string(),
                    user_id.to_string(),
                    note.title.as_str(),
                    note.content.as_deref(),
                    tags_to_db(&note.tags)?,
                    now_epoch_ms(),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            load_note(conn, note.id, user_id)
        })
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        self.client.run("note_delete", |conn, user_id| {
            conn.execute(
                "DELETE FROM notes WHERE id = ?1 AND user_id = ?2;",
                params![id.to_string(), user_id.to_string()],
            )?;
            Ok(())
        })
    }

    fn reorder_notes(&self, space_id: SpaceId, ordered_ids: &[NoteId]) -> RepoResult<()> {
        self.client.run("note_reorder", |conn, user_id| {
            rewrite_remote_sort_orders(
                conn,
                Siblings::under("notes", "space_id", space_id),
                user_id,
                ordered_ids,
            )?;
            Ok(())
        })
    }

    fn move_note_to_space(&self, id: NoteId, space_id: SpaceId) -> RepoResult<Option<Note>> {
        self.client.run("note_move", |conn, user_id| {
            ensure_parent_owned(conn, EntityKind::Space, space_id, user_id)?;
            let sort_order = next_remote_sort_order(
                conn,
                Siblings::under("notes", "space_id", space_id),
                user_id,
            )?;
            let changed = conn.execute(
                "UPDATE notes
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
            load_note(conn, id, user_id)
        })
    }

    fn search_notes(&self, text: &str) -> RepoResult<Vec<Note>> {
        self.client.run("note_search", |conn, user_id| {
            let needle = text.trim().to_lowercase();
            if needle.is_empty() {
                return Ok(Vec::new());
            }
            // Matched in Rust: SQLite LIKE folds ASCII case only.
            let mut notes = query_notes(
                conn,
                "WHERE user_id = ?1 ORDER BY updated_at DESC, id ASC",
                vec![Value::Text(user_id.to_string())],
            )?;
            notes.retain(|note| note.matches_text(&needle));
            Ok(notes)
        })
    }

    fn list_notes_by_tag(&self, tag: &str) -> RepoResult<Vec<Note>> {
        self.client.run("note_list_by_tag", |conn, user_id| {
            query_notes(
                conn,
                "WHERE user_id = ?1
                   AND EXISTS (
                     SELECT 1 FROM json_each(notes.tags) WHERE json_each.value = ?2
                   )
                 ORDER BY updated_at DESC, id ASC",
                vec![
                    Value::Text(user_id.to_string()),
                    Value::Text(tag.to_string()),
                ],
            )
        })
    }
}

fn load_note(conn: &Connection, id: NoteId, user_id: UserId) -> RepoResult<Option<Note>> {
    let mut notes = query_notes(
        conn,
        "WHERE id = ?1 AND user_id = ?2",
        vec![
            Value::Text(id.to_string()),
            Value::Text(user_id.to_string()),
        ],
    )?;
    Ok(notes.pop())
}

fn query_notes(conn: &Connection, tail: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} {tail};"))?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(parse_note_row(row)?);
    }
    Ok(notes)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let space_text: String = row.get("space_id")?;
    let tags_text: String = row.get("tags")?;
    let tags: BTreeSet<String> = serde_json::from_str(&tags_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid tags `{tags_text}` in notes.tags"))
    })?;

    Ok(Note {
        id: parse_uuid(&id_text, "notes.id")?,
        user_id: parse_uuid(&user_text, "notes.user_id")?,
        space_id: parse_uuid(&space_text, "notes.space_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        tags,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn tags_to_db(tags: &BTreeSet<String>) -> RepoResult<String> {
    serde_json::to_string(tags)
        .map_err(|err| RepoError::InvalidData(format!("tags not serializable: {err}")))
}
