//! Domain model for spaces, notes, todo lists and lists.
//!
//! # Responsibility
//! - Define the canonical records shared by remote and local repositories.
//! - Provide validation that both storage paths enforce before writes.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - `user_id` and `sort_order` are owned by repositories and stamped on create.
//! - Timestamps are Unix epoch milliseconds.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub mod list;
pub mod note;
pub mod space;
pub mod todo;

/// Identity of the account that owns a record.
pub type UserId = Uuid;

/// Validation failures raised by `validate()` on any domain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty after trimming.
    BlankName,
    /// Title is empty after trimming.
    BlankTitle,
    /// Color is not `#RRGGBB` or `#RRGGBBAA`.
    InvalidColor(String),
    /// Sort order must be zero or positive.
    NegativeSortOrder(i64),
    /// Aggregate counts are negative or `completed > total`.
    InvalidCounts { total: i64, completed: i64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::InvalidColor(value) => write!(f, "invalid color `{value}`"),
            Self::NegativeSortOrder(value) => write!(f, "sort order must be >= 0, got {value}"),
            Self::InvalidCounts { total, completed } => write!(
                f,
                "invalid item counts: completed={completed} total={total}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Current wall clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

pub(crate) fn ensure_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(())
}

pub(crate) fn ensure_title(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankTitle);
    }
    Ok(())
}

pub(crate) fn ensure_sort_order(value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeSortOrder(value));
    }
    Ok(())
}
