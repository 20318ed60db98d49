use later_core::db::open_db_in_memory;
use later_core::model::now_epoch_ms;
use later_core::{
    ConstraintKind, EntityKind, ListModel, ListRepository, Note, NoteRepository, RemoteClient,
    RepoError, ServiceError, Space, SpaceRepository, SpaceService, SqliteListRepository,
    SqliteNoteRepository, SqliteSpaceRepository, SqliteTodoListRepository, TodoItem, TodoList,
    TodoListRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn client(conn: &Connection) -> RemoteClient<'_> {
    RemoteClient::try_new(conn, Some(Uuid::new_v4())).unwrap()
}

fn orders(spaces: &[Space]) -> Vec<i64> {
    spaces.iter().map(|space| space.sort_order).collect()
}

#[test]
fn sequential_creates_get_dense_sort_orders() {
    let conn = open_db_in_memory().unwrap();
    let client = client(&conn);
    let repo = SqliteSpaceRepository::new(client);

    for name in ["Inbox", "Work", "Home", "Travel"] {
        let created = repo.create_space(&Space::new(name)).unwrap();
        assert_eq!(Some(created.user_id), client.user_id());
    }

    assert_eq!(orders(&repo.list_spaces(false).unwrap()), vec![0, 1, 2, 3]);
}

#[test]
fn each_user_has_its_own_order_sequence() {
    let conn = open_db_in_memory().unwrap();
    let alice = client(&conn);
    let bob = alice.with_user(Some(Uuid::new_v4()));

    SqliteSpaceRepository::new(alice)
        .create_space(&Space::new("Alice inbox"))
        .unwrap();
    let bob_space = SqliteSpaceRepository::new(bob)
        .create_space(&Space::new("Bob inbox"))
        .unwrap();

    assert_eq!(bob_space.sort_order, 0);
    assert_eq!(
        SqliteSpaceRepository::new(bob).list_spaces(true).unwrap(),
        vec![bob_space]
    );
}

#[test]
fn archived_spaces_are_hidden_from_default_listing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSpaceRepository::new(client(&conn));
    let kept = repo.create_space(&Space::new("Kept")).unwrap();
    let archived = repo.create_space(&Space::new("Old")).unwrap();

    let updated = repo.archive_space(archived.id).unwrap().unwrap();
    assert!(updated.is_archived);

    let active: Vec<Uuid> = repo
        .list_spaces(false)
        .unwrap()
        .iter()
        .map(|space| space.id)
        .collect();
    assert_eq!(active, vec![kept.id]);
    assert_eq!(repo.list_spaces(true).unwrap().len(), 2);

    repo.unarchive_space(archived.id).unwrap().unwrap();
    assert_eq!(repo.list_spaces(false).unwrap().len(), 2);
}

#[test]
fn updates_on_missing_or_foreign_rows_return_none() {
    let conn = open_db_in_memory().unwrap();
    let owner = client(&conn);
    let stranger = owner.with_user(Some(Uuid::new_v4()));
    let owned = SqliteSpaceRepository::new(owner)
        .create_space(&Space::new("Private"))
        .unwrap();

    let stranger_repo = SqliteSpaceRepository::new(stranger);
    assert_eq!(stranger_repo.get_space(owned.id).unwrap(), None);
    let mut renamed = owned.clone();
    renamed.name = "Hijacked".to_string();
    assert_eq!(stranger_repo.update_space(&renamed).unwrap(), None);
    assert_eq!(stranger_repo.archive_space(owned.id).unwrap(), None);
    assert_eq!(
        stranger_repo.update_space(&Space::new("Ghost")).unwrap(),
        None
    );

    stranger_repo.delete_space(owned.id).unwrap();
    let still_there = SqliteSpaceRepository::new(owner)
        .get_space(owned.id)
        .unwrap()
        .unwrap();
    assert_eq!(still_there.name, "Private");
}

#[test]
fn reorder_rewrites_positions_in_given_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSpaceRepository::new(client(&conn));
    let a = repo.create_space(&Space::new("A")).unwrap();
    let b = repo.create_space(&Space::new("B")).unwrap();
    let c = repo.create_space(&Space::new("C")).unwrap();

    repo.reorder_spaces(&[c.id, a.id, b.id, c.id, Uuid::new_v4()])
        .unwrap();

    let listed = repo.list_spaces(false).unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|space| space.id).collect();
    assert_eq!(ids, vec![c.id, a.id, b.id]);
    assert_eq!(orders(&listed), vec![0, 1, 2]);
}

#[test]
fn deleting_a_space_cascades_to_its_content() {
    let conn = open_db_in_memory().unwrap();
    let client = client(&conn);
    let spaces = SqliteSpaceRepository::new(client);
    let notes = SqliteNoteRepository::new(client);
    let todos = SqliteTodoListRepository::new(client);
    let lists = SqliteListRepository::new(client);

    let space = spaces.create_space(&Space::new("Project")).unwrap();
    notes.create_note(&Note::new(space.id, "Kickoff")).unwrap();
    let todo_list = todos
        .create_todo_list(&TodoList::new(space.id, "Tasks"))
        .unwrap();
    todos
        .create_todo_item(&TodoItem::new(todo_list.id, "Draft plan"))
        .unwrap();
    lists
        .create_list(&ListModel::new(space.id, "Links"))
        .unwrap();

    let counts = spaces.count_space_content(space.id).unwrap();
    assert_eq!((counts.notes, counts.todo_lists, counts.lists), (1, 1, 1));
    assert_eq!(counts.total(), 3);

    spaces.delete_space(space.id).unwrap();

    assert_eq!(spaces.count_space_content(space.id).unwrap().total(), 0);
    let orphan_items: i64 = conn
        .query_row("SELECT COUNT(*) FROM todo_items;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphan_items, 0);
}

#[test]
fn calls_without_a_signed_in_user_fail() {
    let conn = open_db_in_memory().unwrap();
    let signed_out = RemoteClient::try_new(&conn, None).unwrap();
    let repo = SqliteSpaceRepository::new(signed_out);

    let err = repo.create_space(&Space::new("Inbox")).unwrap_err();
    assert!(matches!(err, RepoError::AuthenticationMissing));
    assert_eq!(err.user_message(), "Please sign in to continue.");
    assert!(matches!(
        repo.list_spaces(true),
        Err(RepoError::AuthenticationMissing)
    ));
}

#[test]
fn writes_into_another_users_space_are_denied() {
    let conn = open_db_in_memory().unwrap();
    let owner = client(&conn);
    let stranger = owner.with_user(Some(Uuid::new_v4()));
    let space = SqliteSpaceRepository::new(owner)
        .create_space(&Space::new("Private"))
        .unwrap();

    let err = SqliteNoteRepository::new(stranger)
        .create_note(&Note::new(space.id, "Sneaky"))
        .unwrap_err();
    assert!(matches!(err, RepoError::PermissionDenied(_)));

    let err = SqliteNoteRepository::new(owner)
        .create_note(&Note::new(Uuid::new_v4(), "Nowhere"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Constraint {
            kind: ConstraintKind::ForeignKey,
            ..
        }
    ));
}

#[test]
fn service_normalizes_input_and_reports_missing_spaces() {
    let conn = open_db_in_memory().unwrap();
    let service = SpaceService::new(SqliteSpaceRepository::new(client(&conn)));

    let created = service
        .create_space("  Work  ", Some(" briefcase ".to_string()), Some("#33aa77".to_string()))
        .unwrap();
    assert_eq!(created.name, "Work");
    assert_eq!(created.icon.as_deref(), Some("briefcase"));
    assert_eq!(created.color.as_deref(), Some("#33AA77"));

    assert!(matches!(
        service.create_space("   ", None, None),
        Err(ServiceError::InvalidName)
    ));
    assert!(matches!(
        service.create_space("Home", None, Some("red".to_string())),
        Err(ServiceError::InvalidColor(_))
    ));

    let renamed = service.rename_space(created.id, " Office ").unwrap();
    assert_eq!(renamed.name, "Office");
    assert_eq!(renamed.color.as_deref(), Some("#33AA77"));

    let missing = Uuid::new_v4();
    let err = service.archive_space(missing).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: EntityKind::Space,
            id,
        } if id == missing
    ));
    assert_eq!(err.user_message(), "This space no longer exists.");
}

#[test]
fn service_drag_reorder_persists_new_order() {
    let conn = open_db_in_memory().unwrap();
    let service = SpaceService::new(SqliteSpaceRepository::new(client(&conn)));
    let a = service.create_space("A", None, None).unwrap();
    let b = service.create_space("B", None, None).unwrap();
    let c = service.create_space("C", None, None).unwrap();

    let outcome = service.move_space(2, 0).unwrap();

    assert!(outcome.is_persisted());
    assert_eq!(outcome.order, vec![c.id, a.id, b.id]);
    let listed = service.list_spaces(false).unwrap();
    assert_eq!(
        listed.iter().map(|space| space.id).collect::<Vec<_>>(),
        outcome.order
    );
    assert_eq!(orders(&listed), vec![0, 1, 2]);
}

#[test]
fn drag_reorder_keeps_archived_spaces_out_of_the_way() {
    let conn = open_db_in_memory().unwrap();
    let service = SpaceService::new(SqliteSpaceRepository::new(client(&conn)));
    let a = service.create_space("A", None, None).unwrap();
    let b = service.create_space("B", None, None).unwrap();
    let c = service.create_space("C", None, None).unwrap();
    service.archive_space(a.id).unwrap();

    let outcome = service.move_space(1, 0).unwrap();

    assert!(outcome.is_persisted());
    assert_eq!(outcome.order, vec![c.id, b.id]);
    let everything = service.list_spaces(true).unwrap();
    assert_eq!(
        everything
            .iter()
            .map(|space| (space.name.as_str(), space.sort_order))
            .collect::<Vec<_>>(),
        vec![("A", 0), ("C", 1), ("B", 2)]
    );
    let active = service.list_spaces(false).unwrap();
    assert_eq!(
        active.iter().map(|space| space.id).collect::<Vec<_>>(),
        outcome.order
    );
}

#[test]
fn remote_writes_stamp_millisecond_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSpaceRepository::new(client(&conn));

    let before = now_epoch_ms();
    let created = repo.create_space(&Space::new("Inbox")).unwrap();
    let archived = repo.archive_space(created.id).unwrap().unwrap();
    let after = now_epoch_ms();

    assert!((before..=after).contains(&created.created_at));
    assert_eq!(created.created_at, created.updated_at);
    assert!((created.updated_at..=after).contains(&archived.updated_at));
    assert_eq!(archived.created_at, created.created_at);
}
