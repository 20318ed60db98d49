use later_core::db::open_db_in_memory;
use later_core::{
    EntityKind, ListItem, ListModel, ListRepository, LocalListRepository, LocalNoteRepository,
    LocalSpaceRepository, LocalStore, LocalTodoListRepository, Note, NoteRepository, RepoError,
    Space, SpaceRepository, TodoItem, TodoList, TodoListRepository,
};
use uuid::Uuid;

#[test]
fn boxes_store_replace_and_delete_values() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::try_new(&conn).unwrap();
    let spaces = store.spaces();
    let mut space = Space::new("Inbox");

    assert!(spaces.is_empty().unwrap());
    spaces.put(space.id, &space).unwrap();
    space.name = "Renamed".to_string();
    spaces.put(space.id, &space).unwrap();

    assert_eq!(spaces.len().unwrap(), 1);
    assert_eq!(spaces.get(space.id).unwrap(), Some(space.clone()));
    assert!(store.notes().is_empty().unwrap());

    assert!(spaces.delete(space.id).unwrap());
    assert!(!spaces.delete(space.id).unwrap());
    assert_eq!(spaces.get(space.id).unwrap(), None);
}

#[test]
fn sequential_creates_get_dense_sort_orders() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();
    let spaces = LocalSpaceRepository::new(store, owner);
    let notes = LocalNoteRepository::new(store, owner);

    let first = spaces.create_space(&Space::new("First")).unwrap();
    let second = spaces.create_space(&Space::new("Second")).unwrap();
    assert_eq!((first.sort_order, second.sort_order), (0, 1));
    assert_eq!(first.user_id, owner);
    assert!(first.created_at > 0);

    for title in ["a", "b", "c", "d"] {
        notes.create_note(&Note::new(first.id, title)).unwrap();
    }
    let orders: Vec<i64> = notes
        .list_notes(first.id)
        .unwrap()
        .iter()
        .map(|note| note.sort_order)
        .collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);
}

#[test]
fn updates_on_missing_keys_fail_with_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();
    let spaces = LocalSpaceRepository::new(store, owner);
    let notes = LocalNoteRepository::new(store, owner);
    let lists = LocalListRepository::new(store, owner);

    let ghost = Space::new("Ghost");
    assert!(matches!(
        spaces.update_space(&ghost),
        Err(RepoError::NotFound {
            entity: EntityKind::Space,
            ..
        })
    ));
    assert!(matches!(
        spaces.archive_space(ghost.id),
        Err(RepoError::NotFound { .. })
    ));
    assert!(matches!(
        notes.update_note(&Note::new(ghost.id, "Ghost note")),
        Err(RepoError::NotFound {
            entity: EntityKind::Note,
            ..
        })
    ));
    assert!(matches!(
        lists.update_list_item(&ListItem::new(Uuid::new_v4(), "Ghost item")),
        Err(RepoError::NotFound {
            entity: EntityKind::ListItem,
            ..
        })
    ));

    spaces.delete_space(ghost.id).unwrap();
    notes.delete_note(Uuid::new_v4()).unwrap();
}

#[test]
fn children_require_an_existing_parent() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();

    let err = LocalNoteRepository::new(store, owner)
        .create_note(&Note::new(Uuid::new_v4(), "Lost"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: EntityKind::Space,
            ..
        }
    ));
    assert_eq!(err.user_message(), "This space no longer exists.");
}

#[test]
fn archived_spaces_are_hidden_from_default_listing() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::try_new(&conn).unwrap();
    let spaces = LocalSpaceRepository::new(store, Uuid::new_v4());
    let kept = spaces.create_space(&Space::new("Kept")).unwrap();
    let old = spaces.create_space(&Space::new("Old")).unwrap();

    spaces.archive_space(old.id).unwrap();

    let active: Vec<Uuid> = spaces
        .list_spaces(false)
        .unwrap()
        .iter()
        .map(|space| space.id)
        .collect();
    assert_eq!(active, vec![kept.id]);
    assert_eq!(spaces.list_spaces(true).unwrap().len(), 2);
}

#[test]
fn reorder_rewrites_positions_in_given_order() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::try_new(&conn).unwrap();
    let spaces = LocalSpaceRepository::new(store, Uuid::new_v4());
    let a = spaces.create_space(&Space::new("A")).unwrap();
    let b = spaces.create_space(&Space::new("B")).unwrap();
    let c = spaces.create_space(&Space::new("C")).unwrap();

    spaces.reorder_spaces(&[c.id, a.id, b.id]).unwrap();

    let stored: Vec<(Uuid, i64)> = spaces
        .list_spaces(false)
        .unwrap()
        .iter()
        .map(|space| (space.id, space.sort_order))
        .collect();
    assert_eq!(stored, vec![(c.id, 0), (a.id, 1), (b.id, 2)]);
}

#[test]
fn deleting_a_space_cascades_manually() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();
    let spaces = LocalSpaceRepository::new(store, owner);
    let notes = LocalNoteRepository::new(store, owner);
    let todos = LocalTodoListRepository::new(store, owner);
    let lists = LocalListRepository::new(store, owner);

    let doomed = spaces.create_space(&Space::new("Doomed")).unwrap();
    let survivor = spaces.create_space(&Space::new("Survivor")).unwrap();
    notes.create_note(&Note::new(doomed.id, "gone")).unwrap();
    let kept_note = notes.create_note(&Note::new(survivor.id, "kept")).unwrap();
    let todo_list = todos
        .create_todo_list(&TodoList::new(doomed.id, "Tasks"))
        .unwrap();
    todos
        .create_todo_item(&TodoItem::new(todo_list.id, "gone too"))
        .unwrap();
    let list = lists.create_list(&ListModel::new(doomed.id, "Links")).unwrap();
    lists
        .create_list_item(&ListItem::new(list.id, "link"))
        .unwrap();

    assert_eq!(spaces.count_space_content(doomed.id).unwrap().total(), 3);

    spaces.delete_space(doomed.id).unwrap();

    assert_eq!(spaces.get_space(doomed.id).unwrap(), None);
    assert_eq!(spaces.count_space_content(doomed.id).unwrap().total(), 0);
    assert!(store.todo_items().is_empty().unwrap());
    assert!(store.list_items().is_empty().unwrap());
    assert_eq!(store.notes().values().unwrap(), vec![kept_note]);
}

#[test]
fn search_and_tag_filters_work_offline() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();
    let space = LocalSpaceRepository::new(store, owner)
        .create_space(&Space::new("Inbox"))
        .unwrap();
    let notes = LocalNoteRepository::new(store, owner);

    let mut tagged = Note::new(space.id, "Quarterly PLAN");
    tagged.tags.insert("work".to_string());
    let tagged = notes.create_note(&tagged).unwrap();
    let mut other = Note::new(space.id, "Groceries");
    other.content = Some("plan meals".to_string());
    let other = notes.create_note(&other).unwrap();

    let mut found: Vec<Uuid> = notes
        .search_notes("plan")
        .unwrap()
        .iter()
        .map(|note| note.id)
        .collect();
    found.sort();
    let mut expected = vec![tagged.id, other.id];
    expected.sort();
    assert_eq!(found, expected);

    let by_tag = notes.list_notes_by_tag("work").unwrap();
    assert_eq!(by_tag, vec![tagged]);
    assert!(notes.search_notes("  ").unwrap().is_empty());
}
