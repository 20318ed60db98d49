//! Key-value boxes persisted in the `local_boxes` table.
//!
//! # Invariants
//! - One value per `(box, key)`; `put` replaces.
//! - Values are serde JSON documents of the box's entity type.

use crate::model::list::{ListItem, ListModel};
use crate::model::note::Note;
use crate::model::space::Space;
use crate::model::todo::{TodoItem, TodoList};
use crate::repo::client::ensure_schema_ready;
use crate::repo::error::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use uuid::Uuid;

const SPACES_BOX: &str = "spaces";
const NOTES_BOX: &str = "notes";
const TODO_LISTS_BOX: &str = "todo_lists";
const TODO_ITEMS_BOX: &str = "todo_items";
const LISTS_BOX: &str = "lists";
const LIST_ITEMS_BOX: &str = "list_items";

pub type KvResult<T> = Result<T, KvError>;

#[derive(Debug)]
pub enum KvError {
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Serde(err) => write!(f, "malformed box value: {err}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Serde(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for KvError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Handle to the on-device box storage.
#[derive(Clone, Copy)]
pub struct LocalStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> LocalStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["local_boxes"])?;
        Ok(Self { conn })
    }

    pub fn spaces(&self) -> LocalBox<'conn, Space> {
        LocalBox::open(self.conn, SPACES_BOX)
    }

    pub fn notes(&self) -> LocalBox<'conn, Note> {
        LocalBox::open(self.conn, NOTES_BOX)
    }

    pub fn todo_lists(&self) -> LocalBox<'conn, TodoList> {
        LocalBox::open(self.conn, TODO_LISTS_BOX)
    }

    pub fn todo_items(&self) -> LocalBox<'conn, TodoItem> {
        LocalBox::open(self.conn, TODO_ITEMS_BOX)
    }

    pub fn lists(&self) -> LocalBox<'conn, ListModel> {
        LocalBox::open(self.conn, LISTS_BOX)
    }

    pub fn list_items(&self) -> LocalBox<'conn, ListItem> {
        LocalBox::open(self.conn, LIST_ITEMS_BOX)
    }
}

/// Typed view over one named box.
pub struct LocalBox<'conn, T> {
    conn: &'conn Connection,
    name: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<'conn, T: Serialize + DeserializeOwned> LocalBox<'conn, T> {
    fn open(conn: &'conn Connection, name: &'static str) -> Self {
        Self {
            conn,
            name,
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, key: Uuid) -> KvResult<Option<T>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT entry_value
                 FROM local_boxes
                 WHERE box_name = ?1
                   AND entry_key = ?2;",
                params![self.name, key.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn contains_key(&self, key: Uuid) -> KvResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM local_boxes
                WHERE box_name = ?1
                  AND entry_key = ?2
            );",
            params![self.name, key.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    pub fn put(&self, key: Uuid, value: &T) -> KvResult<()> {
        let raw = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO local_boxes (box_name, entry_key, entry_value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (box_name, entry_key)
             DO UPDATE SET entry_value = excluded.entry_value;",
            params![self.name, key.to_string(), raw],
        )?;
        Ok(())
    }

    /// Removes `key`; returns whether a value was present.
    pub fn delete(&self, key: Uuid) -> KvResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM local_boxes WHERE box_name = ?1 AND entry_key = ?2;",
            params![self.name, key.to_string()],
        )?;
        Ok(changed > 0)
    }

    /// All values in key order.
    pub fn values(&self) -> KvResult<Vec<T>> {
        let mut stmt = self.conn.prepare(
            "SELECT entry_value
             FROM local_boxes
             WHERE box_name = ?1
             ORDER BY entry_key ASC;",
        )?;
        let mut rows = stmt.query([self.name])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            values.push(serde_json::from_str(&raw)?);
        }
        Ok(values)
    }

    pub fn len(&self) -> KvResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM local_boxes WHERE box_name = ?1;",
            [self.name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> KvResult<bool> {
        Ok(self.len()? == 0)
    }
}
