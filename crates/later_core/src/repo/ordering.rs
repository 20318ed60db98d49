//! Sort-order maintenance shared by every repository.
//!
//! # Responsibility
//! - Assign `max + 1` sort orders to new records (empty parent counts as -1).
//! - Rewrite sort orders positionally for bulk reorders.
//!
//! # Invariants
//! - Sequential inserts into one parent yield `0..N-1` without duplicates.
//! - Deletions leave gaps; orders are never compacted.
//! - Assignment reads then writes without compare-and-swap, so two writers
//!   inserting into the same parent concurrently can collide. A single active
//!   writer per account is assumed.

use super::error::RepoResult;
use crate::model::{now_epoch_ms, UserId};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction, TransactionBehavior};
use std::collections::HashSet;
use uuid::Uuid;

/// Remote rows sharing one ordering sequence.
///
/// `parent` is `(column, id)`; `None` means the owner's root collection.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Siblings {
    pub table: &'static str,
    pub parent: Option<(&'static str, Uuid)>,
}

impl Siblings {
    pub(crate) fn root(table: &'static str) -> Self {
        Self {
            table,
            parent: None,
        }
    }

    pub(crate) fn under(table: &'static str, column: &'static str, parent_id: Uuid) -> Self {
        Self {
            table,
            parent: Some((column, parent_id)),
        }
    }

    fn filter(&self, user_id: UserId, first_param: usize) -> (String, Vec<Value>) {
        let mut clause = format!("user_id = ?{first_param}");
        let mut values = vec![Value::Text(user_id.to_string())];
        if let Some((column, parent_id)) = self.parent {
            clause.push_str(&format!(" AND {column} = ?{}", first_param + 1));
            values.push(Value::Text(parent_id.to_string()));
        }
        (clause, values)
    }
}

/// Returns the order for a new record given its siblings' orders.
pub fn next_sort_order(existing: impl IntoIterator<Item = i64>) -> i64 {
    existing.into_iter().max().unwrap_or(-1) + 1
}

/// Maps an ordered id sequence to `(id, position)` pairs.
///
/// Duplicate ids keep their first position; positions stay dense.
pub fn positions(ordered_ids: &[Uuid]) -> Vec<(Uuid, i64)> {
    let mut seen = HashSet::with_capacity(ordered_ids.len());
    ordered_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .enumerate()
        .map(|(index, id)| (id, index as i64))
        .collect()
}

/// Moves the element at `from` to `to`, shifting the others.
///
/// Returns `None` when either index is out of bounds.
pub fn move_element<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from >= items.len() || to >= items.len() {
        return None;
    }
    let mut reordered = items.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    Some(reordered)
}

/// Lays `reordered` back into the slots its ids occupy in `full`.
///
/// Ids of `full` missing from `reordered` keep their position, so a reorder of
/// a filtered view never collides with the hidden rows.
pub fn merge_into_slots(full: &[Uuid], reordered: &[Uuid]) -> Vec<Uuid> {
    let members: HashSet<Uuid> = reordered.iter().copied().collect();
    let mut next = reordered.iter().copied();
    let mut merged: Vec<Uuid> = full
        .iter()
        .map(|id| {
            if members.contains(id) {
                next.next().unwrap_or(*id)
            } else {
                *id
            }
        })
        .collect();
    merged.extend(next);
    merged
}

pub(crate) fn next_remote_sort_order(
    conn: &Connection,
    siblings: Siblings,
    user_id: UserId,
) -> RepoResult<i64> {
    let (clause, values) = siblings.filter(user_id, 1);
    let mut stmt = conn.prepare(&format!(
        "SELECT sort_order FROM {} WHERE {clause};",
        siblings.table
    ))?;
    let mut rows = stmt.query(params_from_iter(values))?;
    let mut orders = Vec::new();
    while let Some(row) = rows.next()? {
        orders.push(row.get::<_, i64>(0)?);
    }
    Ok(next_sort_order(orders))
}

/// Writes positional orders for `ordered_ids` in one immediate transaction.
///
/// Ids outside the sibling set are skipped. Returns the number of rows updated.
pub(crate) fn rewrite_remote_sort_orders(
    conn: &Connection,
    siblings: Siblings,
    user_id: UserId,
    ordered_ids: &[Uuid],
) -> RepoResult<usize> {
    let (clause, filter_values) = siblings.filter(user_id, 4);
    let sql = format!(
        "UPDATE {}
         SET sort_order = ?1,
             updated_at = ?3
         WHERE id = ?2
           AND {clause};",
        siblings.table
    );

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let now = now_epoch_ms();
    let mut updated = 0;
    {
        let mut stmt = tx.prepare(&sql)?;
        for (id, position) in positions(ordered_ids) {
            let mut values = vec![
                Value::Integer(position),
                Value::Text(id.to_string()),
                Value::Integer(now),
            ];
            values.extend(filter_values.iter().cloned());
            let changed = stmt.execute(params_from_iter(values))?;
            if changed == 0 {
                debug!(
                    "event=reorder_skip module=repo table={} id={id}",
                    siblings.table
                );
            }
            updated += changed;
        }
    }
    tx.commit()?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::{merge_into_slots, move_element, next_sort_order, positions};
    use uuid::Uuid;

    #[test]
    fn next_sort_order_starts_at_zero_and_uses_max() {
        assert_eq!(next_sort_order(Vec::<i64>::new()), 0);
        assert_eq!(next_sort_order(vec![0, 1, 2]), 3);
        assert_eq!(next_sort_order(vec![4, 0]), 5);
    }

    #[test]
    fn positions_follow_input_order_and_drop_duplicates() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(positions(&[c, a, b]), vec![(c, 0), (a, 1), (b, 2)]);
        assert_eq!(positions(&[a, a, b]), vec![(a, 0), (b, 1)]);
    }

    #[test]
    fn move_element_shifts_neighbours() {
        let items = ['a', 'b', 'c', 'd'];
        assert_eq!(move_element(&items, 0, 2), Some(vec!['b', 'c', 'a', 'd']));
        assert_eq!(move_element(&items, 3, 0), Some(vec!['d', 'a', 'b', 'c']));
        assert_eq!(move_element(&items, 1, 1), Some(items.to_vec()));
        assert_eq!(move_element(&items, 4, 0), None);
    }

    #[test]
    fn merge_into_slots_keeps_hidden_ids_in_place() {
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        // a and c are hidden from the reordered view.
        assert_eq!(merge_into_slots(&[a, b, c, d], &[d, b]), vec![a, d, c, b]);
        assert_eq!(merge_into_slots(&[a, b], &[b]), vec![a, b]);
        assert_eq!(merge_into_slots(&[a], &[b]), vec![a, b]);
    }
}
