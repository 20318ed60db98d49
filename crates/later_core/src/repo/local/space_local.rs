//! Local space repository.

use super::list_local::delete_list_cascade;
use super::store::LocalStore;
use super::todo_local::delete_todo_list_cascade;
use super::{local_call, KvResultExt};
use crate::model::now_epoch_ms;
use crate::model::space::{Space, SpaceContentCounts, SpaceId};
use crate::model::UserId;
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::ordering::{next_sort_order, positions};
use crate::repo::space_repo::SpaceRepository;

/// Space repository over the `spaces` box.
pub struct LocalSpaceRepository<'conn> {
    store: LocalStore<'conn>,
    owner: UserId,
}

impl<'conn> LocalSpaceRepository<'conn> {
    /// `owner` is stamped on every space created through this repository.
    pub fn new(store: LocalStore<'conn>, owner: UserId) -> Self {
        Self { store, owner }
    }

    fn set_archived(
        &self,
        operation: &'static str,
        id: SpaceId,
        archived: bool,
    ) -> RepoResult<Option<Space>> {
        local_call(operation, || {
            let spaces = self.store.spaces();
            let mut space = spaces
                .get(id)
                .context("load space")?
                .ok_or_else(|| RepoError::not_found(EntityKind::Space, id))?;
            space.is_archived = archived;
            space.updated_at = now_epoch_ms();
            spaces.put(id, &space).context("save space")?;
            Ok(Some(space))
        })
    }
}

impl SpaceRepository for LocalSpaceRepository<'_> {
    fn create_space(&self, space: &Space) -> RepoResult<Space> {
        local_call("space_create", || {
            space.validate()?;
            let spaces = self.store.spaces();
            let existing = spaces.values().context("load spaces")?;
            let now = now_epoch_ms();
            let stored = Space {
                user_id: self.owner,
                sort_order: next_sort_order(existing.iter().map(|space| space.sort_order)),
                created_at: now,
                updated_at: now,
                ..space.clone()
            };
            spaces.put(stored.id, &stored).context("save space")?;
            Ok(stored)
        })
    }

    fn get_space(&self, id: SpaceId) -> RepoResult<Option<Space>> {
        local_call("space_get", || self.store.spaces().get(id).context("load space"))
    }

    fn list_spaces(&self, include_archived: bool) -> RepoResult<Vec<Space>> {
        local_call("space_list", || {
            let mut spaces = self.store.spaces().values().context("load spaces")?;
            spaces.retain(|space| include_archived || !space.is_archived);
            spaces.sort_by_key(|space| (space.sort_order, space.id));
            Ok(spaces)
        })
    }

    fn update_space(&self, space: &Space) -> RepoResult<Option<Space>> {
        local_call("space_update", || {
            space.validate()?;
            let spaces = self.store.spaces();
            let existing = spaces
                .get(space.id)
                .context("load space")?
                .ok_or_else(|| RepoError::not_found(EntityKind::Space, space.id))?;
            let stored = Space {
                name: space.name.clone(),
                icon: space.icon.clone(),
                color: space.color.clone(),
                is_archived: space.is_archived,
                updated_at: now_epoch_ms(),
                ..existing
            };
            spaces.put(stored.id, &stored).context("save space")?;
            Ok(Some(stored))
        })
    }

    fn archive_space(&self, id: SpaceId) -> RepoResult<Option<Space>> {
        self.set_archived("space_archive", id, true)
    }

    fn unarchive_space(&self, id: SpaceId) -> RepoResult<Option<Space>> {
        self.set_archived("space_unarchive", id, false)
    }

    fn delete_space(&self, id: SpaceId) -> RepoResult<()> {
        local_call("space_delete", || {
            let notes = self.store.notes();
            for note in notes.values().context("load notes")? {
                if note.space_id == id {
                    notes.delete(note.id).context("delete note")?;
                }
            }

            for list in self.store.todo_lists().values().context("load todo lists")? {
                if list.space_id == id {
                    delete_todo_list_cascade(&self.store, list.id)?;
                }
            }

            for list in self.store.lists().values().context("load lists")? {
                if list.space_id == id {
                    delete_list_cascade(&self.store, list.id)?;
                }
            }

            self.store.spaces().delete(id).context("delete space")?;
            Ok(())
        })
    }

    fn reorder_spaces(&self, ordered_ids: &[SpaceId]) -> RepoResult<()> {
        local_call("space_reorder", || {
            let spaces = self.store.spaces();
            let now = now_epoch_ms();
            for (id, position) in positions(ordered_ids) {
                if let Some(mut space) = spaces.get(id).context("load space")? {
                    space.sort_order = position;
                    space.updated_at = now;
                    spaces.put(id, &space).context("save space")?;
                }
            }
            Ok(())
        })
    }

    fn count_space_content(&self, id: SpaceId) -> RepoResult<SpaceContentCounts> {
        local_call("space_count_content", || {
            let notes = self.store.notes().values().context("load notes")?;
            let todo_lists = self.store.todo_lists().values().context("load todo lists")?;
            let lists = self.store.lists().values().context("load lists")?;
            Ok(SpaceContentCounts {
                notes: notes.iter().filter(|note| note.space_id == id).count() as i64,
                todo_lists: todo_lists.iter().filter(|list| list.space_id == id).count() as i64,
                lists: lists.iter().filter(|list| list.space_id == id).count() as i64,
            })
        })
    }
}
