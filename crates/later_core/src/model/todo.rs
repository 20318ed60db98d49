//! Todo list and todo item domain models.
//!
//! # Invariants
//! - `TodoList` counts are derived from its items and never edited directly
//!   by callers; repositories recompute them after each item mutation.

use super::space::SpaceId;
use super::{ensure_name, ensure_sort_order, ensure_title, UserId, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TodoListId = Uuid;
pub type TodoItemId = Uuid;

/// Priority of a todo item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoPriority {
    Low,
    Medium,
    High,
}

impl TodoPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Checklist container with denormalized item counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    pub id: TodoListId,
    pub user_id: UserId,
    pub space_id: SpaceId,
    pub name: String,
    pub description: Option<String>,
    pub total_item_count: i64,
    pub completed_item_count: i64,
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TodoList {
    pub fn new(space_id: SpaceId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            space_id,
            name: name.into(),
            description: None,
            total_item_count: 0,
            completed_item_count: 0,
            sort_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Completed fraction in `0.0..=1.0`; an empty list reports `0.0`.
    pub fn progress(&self) -> f64 {
        if self.total_item_count <= 0 {
            return 0.0;
        }
        self.completed_item_count as f64 / self.total_item_count as f64
    }

    pub fn is_complete(&self) -> bool {
        self.total_item_count > 0 && self.completed_item_count == self.total_item_count
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_name(&self.name)?;
        ensure_sort_order(self.sort_order)?;
        if self.total_item_count < 0
            || self.completed_item_count < 0
            || self.completed_item_count > self.total_item_count
        {
            return Err(ValidationError::InvalidCounts {
                total: self.total_item_count,
                completed: self.completed_item_count,
            });
        }
        Ok(())
    }
}

/// One actionable entry inside a todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: TodoItemId,
    pub user_id: UserId,
    pub todo_list_id: TodoListId,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    /// Epoch milliseconds.
    pub due_date: Option<i64>,
    pub priority: Option<TodoPriority>,
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TodoItem {
    pub fn new(todo_list_id: TodoListId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            todo_list_id,
            title: title.into(),
            description: None,
            is_completed: false,
            due_date: None,
            priority: None,
            sort_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.is_completed = !self.is_completed;
    }

    /// Returns whether the item is open and its due date is before `now_ms`.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        !self.is_completed && self.due_date.is_some_and(|due| due < now_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_title(&self.title)?;
        ensure_sort_order(self.sort_order)
    }
}

#[cfg(test)]
mod tests {
    use super::{TodoItem, TodoList};
    use crate::model::ValidationError;
    use uuid::Uuid;

    #[test]
    fn progress_handles_empty_and_partial_lists() {
        let mut list = TodoList::new(Uuid::new_v4(), "Groceries");
        assert_eq!(list.progress(), 0.0);
        assert!(!list.is_complete());

        list.total_item_count = 4;
        list.completed_item_count = 1;
        assert_eq!(list.progress(), 0.25);

        list.completed_item_count = 4;
        assert!(list.is_complete());
    }

    #[test]
    fn validate_rejects_completed_above_total() {
        let mut list = TodoList::new(Uuid::new_v4(), "Chores");
        list.total_item_count = 1;
        list.completed_item_count = 2;
        assert_eq!(
            list.validate(),
            Err(ValidationError::InvalidCounts {
                total: 1,
                completed: 2
            })
        );
    }

    #[test]
    fn overdue_ignores_completed_items() {
        let mut item = TodoItem::new(Uuid::new_v4(), "Pay rent");
        item.due_date = Some(1_000);
        assert!(item.is_overdue(2_000));
        item.toggle();
        assert!(!item.is_overdue(2_000));
    }
}
