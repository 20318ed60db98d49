//! Derived item counts for todo lists.
//!
//! # Invariants
//! - Counts are always a full recompute from the current item collection.
//! - Every item mutation path must call the recount; there is no delta update.

use super::error::RepoResult;
use crate::model::todo::{TodoItem, TodoList, TodoListId};
use crate::model::{now_epoch_ms, UserId};
use rusqlite::{params, Connection};

/// Total and completed item counts of one todo list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoCounts {
    pub total: i64,
    pub completed: i64,
}

impl TodoCounts {
    pub fn from_flags(flags: impl IntoIterator<Item = bool>) -> Self {
        flags
            .into_iter()
            .fold(Self::default(), |counts, is_completed| Self {
                total: counts.total + 1,
                completed: counts.completed + i64::from(is_completed),
            })
    }

    pub fn tally<'a>(items: impl IntoIterator<Item = &'a TodoItem>) -> Self {
        Self::from_flags(items.into_iter().map(|item| item.is_completed))
    }

    pub fn apply_to(self, list: &mut TodoList) {
        list.total_item_count = self.total;
        list.completed_item_count = self.completed;
    }
}

/// Returns whether an item update must trigger a recount.
pub fn completion_changed(before: &TodoItem, after: &TodoItem) -> bool {
    before.is_completed != after.is_completed
}

/// Recomputes and stores the counts of one remote todo list.
pub(crate) fn recount_remote(
    conn: &Connection,
    todo_list_id: TodoListId,
    user_id: UserId,
) -> RepoResult<TodoCounts> {
    let mut stmt = conn.prepare(
        "SELECT is_completed
         FROM todo_items
         WHERE todo_list_id = ?1;",
    )?;
    let mut rows = stmt.query([todo_list_id.to_string()])?;
    let mut flags = Vec::new();
    while let Some(row) = rows.next()? {
        flags.push(row.get::<_, i64>(0)? == 1);
    }
    let counts = TodoCounts::from_flags(flags);

    conn.execute(
        "UPDATE todo_lists
         SET total_item_count = ?3,
             completed_item_count = ?4,
             updated_at = ?5
         WHERE id = ?1
           AND user_id = ?2;",
        params![
            todo_list_id.to_string(),
            user_id.to_string(),
            counts.total,
            counts.completed,
            now_epoch_ms(),
        ],
    )?;
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::{completion_changed, TodoCounts};
    use crate::model::todo::TodoItem;
    use uuid::Uuid;

    #[test]
    fn tally_counts_completed_items() {
        let list_id = Uuid::new_v4();
        let mut done = TodoItem::new(list_id, "done");
        done.is_completed = true;
        let open = TodoItem::new(list_id, "open");

        let counts = TodoCounts::tally([&done, &open, &open]);
        assert_eq!(
            counts,
            TodoCounts {
                total: 3,
                completed: 1
            }
        );
        assert_eq!(TodoCounts::tally(Vec::<&TodoItem>::new()), TodoCounts::default());
    }

    #[test]
    fn completion_changed_ignores_other_fields() {
        let before = TodoItem::new(Uuid::new_v4(), "title");
        let mut renamed = before.clone();
        renamed.title = "other".to_string();
        assert!(!completion_changed(&before, &renamed));

        let mut toggled = before.clone();
        toggled.toggle();
        assert!(completion_changed(&before, &toggled));
    }
}
