//! Data-access core for the "later" notes, lists and todos app.
//!
//! Repositories talk to either the remote row store or the on-device box
//! store; services add input normalization and optimistic reordering on top.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::list::{ListId, ListItem, ListItemId, ListModel, ListStyle};
pub use model::note::{Note, NoteId};
pub use model::space::{Space, SpaceContentCounts, SpaceId};
pub use model::todo::{TodoItem, TodoItemId, TodoList, TodoListId, TodoPriority};
pub use model::{UserId, ValidationError};
pub use repo::client::RemoteClient;
pub use repo::error::{ConstraintKind, EntityKind, RepoError, RepoResult};
pub use repo::list_repo::{ListRepository, SqliteListRepository};
pub use repo::local::{
    LocalListRepository, LocalNoteRepository, LocalSpaceRepository, LocalStore,
    LocalTodoListRepository,
};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::space_repo::{SpaceRepository, SqliteSpaceRepository};
pub use repo::todo_repo::{SqliteTodoListRepository, TodoListRepository};
pub use service::list_service::ListService;
pub use service::note_service::NoteService;
pub use service::reorder::ReorderOutcome;
pub use service::space_service::SpaceService;
pub use service::todo_service::{TodoItemInput, TodoService};
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
