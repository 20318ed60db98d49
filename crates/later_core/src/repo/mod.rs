//! Repository layer for spaces, notes, todo lists and lists.
//!
//! # Responsibility
//! - Define one repository contract per record family.
//! - Implement each contract against the remote row store (`Sqlite*`) and
//!   the on-device box store (`local::Local*`).
//! - Own sort-order assignment, todo count maintenance and error mapping.
//!
//! # Invariants
//! - Repository writes enforce `validate()` before persistence.
//! - Remote reads and writes are scoped to the signed-in user.
//! - Sort orders are assigned as max+1 among siblings and rewritten
//!   positionally on reorder; gaps left by deletes are never compacted.
//! - With more than one writer per account, max+1 and count recompute can
//!   race; a single active writer is assumed.

pub mod aggregate;
pub mod client;
pub mod error;
pub mod list_repo;
pub mod local;
pub mod note_repo;
pub mod ordering;
pub(crate) mod row;
pub mod space_repo;
pub mod todo_repo;
