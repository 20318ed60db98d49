//! Remote store client adapter.
//!
//! # Responsibility
//! - Hold the connection and the signed-in user for remote repositories.
//! - Run each repository call with identity resolution, error translation
//!   and `repo_call` logging.
//! - Enforce the owner check applied to parent rows before child writes.
//!
//! # Invariants
//! - Every user-scoped call fails with `AuthenticationMissing` when no user is
//!   signed in; no statement is executed in that case.
//! - Log events carry ids and codes only, never user content.

use super::error::{EntityKind, RepoError, RepoResult};
use crate::db::migrations::{current_user_version, latest_version};
use crate::model::UserId;
use log::{debug, warn};
use rusqlite::{Connection, OptionalExtension};
use std::time::Instant;
use uuid::Uuid;

const REMOTE_TABLES: [&str; 6] = [
    "spaces",
    "notes",
    "todo_lists",
    "todo_items",
    "lists",
    "list_items",
];

/// Connection plus session identity shared by all remote repositories.
#[derive(Clone, Copy)]
pub struct RemoteClient<'conn> {
    conn: &'conn Connection,
    user_id: Option<UserId>,
}

impl<'conn> RemoteClient<'conn> {
    /// Creates a client for a migrated connection; `user_id` is `None` when
    /// signed out.
    pub fn try_new(conn: &'conn Connection, user_id: Option<UserId>) -> RepoResult<Self> {
        ensure_schema_ready(conn, &REMOTE_TABLES)?;
        Ok(Self { conn, user_id })
    }

    /// Returns a copy of this client acting as another session.
    pub fn with_user(self, user_id: Option<UserId>) -> Self {
        Self { user_id, ..self }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn current_user_id(&self) -> RepoResult<UserId> {
        self.user_id.ok_or(RepoError::AuthenticationMissing)
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// Runs one repository call as the signed-in user.
    pub fn run<T>(
        &self,
        operation: &'static str,
        call: impl FnOnce(&'conn Connection, UserId) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let result = self
            .current_user_id()
            .and_then(|user_id| call(self.conn, user_id));

        match &result {
            Ok(_) => debug!(
                "event=repo_call module=repo status=ok op={operation} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=repo_call module=repo status=error op={operation} duration_ms={} error_code={}",
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }
        result
    }
}

/// Rejects writes under a parent row owned by a different user.
///
/// A missing parent passes; the insert then fails on the foreign key.
pub(crate) fn ensure_parent_owned(
    conn: &Connection,
    parent: EntityKind,
    parent_id: Uuid,
    user_id: UserId,
) -> RepoResult<()> {
    let owner: Option<String> = conn
        .query_row(
            &format!("SELECT user_id FROM {} WHERE id = ?1;", parent.table()),
            [parent_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    match owner {
        Some(owner) if owner != user_id.to_string() => Err(RepoError::PermissionDenied(format!(
            "{} {parent_id} belongs to another user",
            parent.as_str()
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn ensure_schema_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
