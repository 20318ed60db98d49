//! Use-case services over the repository contracts.
//!
//! # Responsibility
//! - Normalize and validate user input before it reaches a repository.
//! - Turn "nothing matched" repository results into `ServiceError::NotFound`.
//! - Apply drag reorders optimistically and report persistence failures as
//!   user-facing messages.
//!
//! # Invariants
//! - Services are generic over repository traits and work with either store.
//! - Names and titles are trimmed; tags are lowercase and deduplicated.

use crate::model::ValidationError;
use crate::repo::error::{EntityKind, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod list_service;
pub mod note_service;
pub mod reorder;
pub mod space_service;
pub mod todo_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error shared by all use-case services.
#[derive(Debug)]
pub enum ServiceError {
    /// Name is empty after trimming.
    InvalidName,
    /// Title is empty after trimming.
    InvalidTitle,
    /// Color is not `#RRGGBB` or `#RRGGBBAA`.
    InvalidColor(String),
    /// Tag is empty after trimming.
    InvalidTag(String),
    /// Drag positions are outside the current collection, or the move
    /// targets the record's current container.
    InvalidMove(String),
    NotFound { entity: EntityKind, id: Uuid },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    pub(crate) fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Human-readable message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidName => "Please enter a name.".to_string(),
            Self::InvalidTitle => "Please enter a title.".to_string(),
            Self::InvalidColor(_) => "Please pick a valid color.".to_string(),
            Self::InvalidTag(_) => "Tags cannot be empty.".to_string(),
            Self::InvalidMove(_) => "This item cannot be moved there.".to_string(),
            Self::NotFound { entity, .. } => format!("This {} no longer exists.", entity.label()),
            Self::Repo(err) => err.user_message(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "name must not be blank"),
            Self::InvalidTitle => write!(f, "title must not be blank"),
            Self::InvalidColor(value) => write!(f, "invalid color `{value}`"),
            Self::InvalidTag(value) => write!(f, "invalid tag: `{value}`"),
            Self::InvalidMove(details) => write!(f, "invalid move: {details}"),
            Self::NotFound { entity, id } => write!(f, "{} not found: {id}", entity.as_str()),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Validation(err) => err.into(),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::BlankName => Self::InvalidName,
            ValidationError::BlankTitle => Self::InvalidTitle,
            ValidationError::InvalidColor(color) => Self::InvalidColor(color),
            other => Self::Repo(RepoError::Validation(other)),
        }
    }
}

/// Trims a required name.
pub(crate) fn normalize_name(value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidName);
    }
    Ok(trimmed.to_string())
}

/// Trims a required title.
pub(crate) fn normalize_title(value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}

/// Trims optional free text; blank becomes `None`.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
