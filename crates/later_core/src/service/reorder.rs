//! Optimistic drag reorder.
//!
//! The new order is computed locally first and handed back to the caller
//! whether or not persisting it succeeds. A failed write leaves the caller's
//! optimistic order in place and only carries a message to show.

use super::{ServiceError, ServiceResult};
use crate::repo::error::{EntityKind, RepoResult};
use crate::repo::ordering::move_element;
use log::warn;
use uuid::Uuid;

/// Result of one drag reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderOutcome {
    /// Ids in their new display order.
    pub order: Vec<Uuid>,
    /// Set when the order could not be persisted.
    pub error_message: Option<String>,
}

impl ReorderOutcome {
    pub fn is_persisted(&self) -> bool {
        self.error_message.is_none()
    }
}

/// Moves `current[from]` to index `to` and persists the resulting order.
///
/// # Errors
/// - `InvalidMove` when either index is outside `current`. Nothing is
///   persisted in that case.
pub fn reorder_optimistically(
    entity: EntityKind,
    current: &[Uuid],
    from: usize,
    to: usize,
    persist: impl FnOnce(&[Uuid]) -> RepoResult<()>,
) -> ServiceResult<ReorderOutcome> {
    let order = move_element(current, from, to).ok_or_else(|| {
        ServiceError::InvalidMove(format!(
            "cannot move {} from {from} to {to} among {} items",
            entity.as_str(),
            current.len()
        ))
    })?;

    let error_message = match persist(&order) {
        Ok(()) => None,
        Err(err) => {
            warn!(
                "event=reorder_persist module=service status=error entity={} error_code={}",
                entity.as_str(),
                err.code()
            );
            Some(err.user_message())
        }
    };

    Ok(ReorderOutcome {
        order,
        error_message,
    })
}

#[cfg(test)]
mod tests {
    use super::reorder_optimistically;
    use crate::repo::error::{EntityKind, RepoError};
    use crate::service::ServiceError;
    use uuid::Uuid;

    #[test]
    fn persisted_order_is_returned_without_message() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let mut persisted = Vec::new();

        let outcome = reorder_optimistically(EntityKind::Note, &ids, 2, 0, |order| {
            persisted = order.to_vec();
            Ok(())
        })
        .unwrap();

        assert_eq!(outcome.order, vec![ids[2], ids[0], ids[1]]);
        assert_eq!(persisted, outcome.order);
        assert!(outcome.is_persisted());
    }

    #[test]
    fn failed_persist_keeps_optimistic_order() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();

        let outcome = reorder_optimistically(EntityKind::List, &ids, 0, 2, |_| {
            Err(RepoError::AuthenticationMissing)
        })
        .unwrap();

        assert_eq!(outcome.order, vec![ids[1], ids[2], ids[0]]);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("Please sign in to continue.")
        );
    }

    #[test]
    fn out_of_range_move_is_rejected_before_persisting() {
        let ids = vec![Uuid::new_v4()];
        let result = reorder_optimistically(EntityKind::Space, &ids, 0, 3, |_| {
            panic!("must not persist an invalid move")
        });
        assert!(matches!(result, Err(ServiceError::InvalidMove(_))));
    }
}
