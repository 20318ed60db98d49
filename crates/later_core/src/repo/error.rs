//! Repository error taxonomy and database error translation.
//!
//! # Responsibility
//! - Categorize storage failures into auth, not-found, permission,
//!   constraint, and generic failures.
//! - Provide user-facing messages and stable log codes per category.
//!
//! # Invariants
//! - Known SQLite constraint and permission codes never surface as `Db`.
//! - Local storage failures carry a static operation label, no error codes.

use crate::db::DbError;
use crate::model::ValidationError;
use rusqlite::{ffi, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Record families handled by repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Space,
    Note,
    TodoList,
    TodoItem,
    List,
    ListItem,
}

impl EntityKind {
    /// Stable snake_case name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Note => "note",
            Self::TodoList => "todo_list",
            Self::TodoItem => "todo_item",
            Self::List => "list",
            Self::ListItem => "list_item",
        }
    }

    /// Remote table holding this record family.
    pub fn table(self) -> &'static str {
        match self {
            Self::Space => "spaces",
            Self::Note => "notes",
            Self::TodoList => "todo_lists",
            Self::TodoItem => "todo_items",
            Self::List => "lists",
            Self::ListItem => "list_items",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Note => "note",
            Self::TodoList => "todo list",
            Self::TodoItem => "todo item",
            Self::List => "list",
            Self::ListItem => "list item",
        }
    }
}

/// Database constraint categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
}

impl ConstraintKind {
    fn from_extended_code(code: i32) -> Option<Self> {
        match code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Some(Self::Unique),
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Self::ForeignKey),
            ffi::SQLITE_CONSTRAINT_NOTNULL => Some(Self::NotNull),
            ffi::SQLITE_CONSTRAINT_CHECK => Some(Self::Check),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum RepoError {
    /// No signed-in user is available for a user-scoped call.
    AuthenticationMissing,
    NotFound {
        entity: EntityKind,
        id: Uuid,
    },
    /// Row-level ownership check failed.
    PermissionDenied(String),
    Constraint {
        kind: ConstraintKind,
        detail: Option<String>,
    },
    Validation(ValidationError),
    /// Persisted data cannot be converted into a domain record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Any other database failure.
    Db(DbError),
    LocalStorage {
        operation: &'static str,
        message: String,
    },
}

impl RepoError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Wraps a local storage failure with a static operation label.
    pub fn local(operation: &'static str, err: impl Display) -> Self {
        Self::LocalStorage {
            operation,
            message: err.to_string(),
        }
    }

    /// Stable snake_case code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationMissing => "auth_missing",
            Self::NotFound { .. } => "not_found",
            Self::PermissionDenied(_) => "permission_denied",
            Self::Constraint { kind, .. } => match kind {
                ConstraintKind::Unique => "unique_violation",
                ConstraintKind::ForeignKey => "foreign_key_violation",
                ConstraintKind::NotNull => "not_null_violation",
                ConstraintKind::Check => "check_violation",
            },
            Self::Validation(_) => "validation_failed",
            Self::InvalidData(_) => "invalid_data",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::Db(_) => "db_error",
            Self::LocalStorage { .. } => "local_storage_failed",
        }
    }

    /// Human-readable message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthenticationMissing => "Please sign in to continue.".to_string(),
            Self::NotFound { entity, .. } => format!("This {} no longer exists.", entity.label()),
            Self::PermissionDenied(_) => {
                "You don't have permission to change this item.".to_string()
            }
            Self::Constraint { kind, .. } => match kind {
                ConstraintKind::Unique => "An item with these details already exists.",
                ConstraintKind::ForeignKey => "The item this belongs to could not be found.",
                ConstraintKind::NotNull => "A required field is missing.",
                ConstraintKind::Check => "Some of the provided values are not allowed.",
            }
            .to_string(),
            Self::Validation(err) => capitalize(&err.to_string()),
            Self::LocalStorage { operation, .. } => {
                format!("Could not {operation} on this device.")
            }
            Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::Db(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationMissing => write!(f, "no authenticated user"),
            Self::NotFound { entity, id } => write!(f, "{} not found: {id}", entity.as_str()),
            Self::PermissionDenied(detail) => write!(f, "permission denied: {detail}"),
            Self::Constraint { kind, detail } => match detail {
                Some(detail) => write!(f, "{kind:?} constraint violated: {detail}"),
                None => write!(f, "{kind:?} constraint violated"),
            },
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::LocalStorage { operation, message } => {
                write!(f, "local storage failed to {operation}: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, detail) = &value {
            if let Some(kind) = ConstraintKind::from_extended_code(failure.extended_code) {
                return Self::Constraint {
                    kind,
                    detail: detail.clone(),
                };
            }
            if matches!(
                failure.code,
                ErrorCode::PermissionDenied
                    | ErrorCode::AuthorizationForStatementDenied
                    | ErrorCode::ReadOnly
            ) {
                return Self::PermissionDenied(
                    detail.clone().unwrap_or_else(|| failure.to_string()),
                );
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>() + ".",
        None => String::new(),
    }
}
