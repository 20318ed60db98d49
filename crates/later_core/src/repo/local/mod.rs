//! Local (on-device) repositories over key-value boxes.
//!
//! # Responsibility
//! - Implement the same repository contracts as the remote store on top of
//!   `LocalStore` boxes keyed by entity id.
//!
//! # Invariants
//! - `update_*` on a missing key fails with `RepoError::NotFound`.
//! - `delete_*` is idempotent.
//! - Deleting a container cascades manually to its children.
//! - Storage failures are wrapped with a static operation label.

mod list_local;
mod note_local;
mod space_local;
mod store;
mod todo_local;

pub use list_local::LocalListRepository;
pub use note_local::LocalNoteRepository;
pub use space_local::LocalSpaceRepository;
pub use store::{KvError, KvResult, LocalBox, LocalStore};
pub use todo_local::LocalTodoListRepository;

use super::error::{RepoError, RepoResult};
use log::warn;

pub(crate) trait KvResultExt<T> {
    /// Wraps a key-value failure with a static operation label.
    fn context(self, operation: &'static str) -> RepoResult<T>;
}

impl<T> KvResultExt<T> for KvResult<T> {
    fn context(self, operation: &'static str) -> RepoResult<T> {
        self.map_err(|err| RepoError::local(operation, err))
    }
}

/// Runs one local repository call and logs failures.
pub(crate) fn local_call<T>(
    operation: &'static str,
    call: impl FnOnce() -> RepoResult<T>,
) -> RepoResult<T> {
    let result = call();
    if let Err(err) = &result {
        warn!(
            "event=local_call module=repo status=error op={operation} error_code={}",
            err.code()
        );
    }
    result
}
