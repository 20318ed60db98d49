use later_core::db::open_db_in_memory;
use later_core::{
    LocalSpaceRepository, LocalStore, LocalTodoListRepository, RemoteClient, RepoError,
    ServiceError, Space, SpaceRepository, SqliteSpaceRepository, SqliteTodoListRepository,
    TodoItem, TodoItemInput, TodoList, TodoListRepository, TodoPriority, TodoService,
};
use rusqlite::Connection;
use uuid::Uuid;

fn client(conn: &Connection) -> RemoteClient<'_> {
    RemoteClient::try_new(conn, Some(Uuid::new_v4())).unwrap()
}

fn remote_list(conn: &Connection) -> (SqliteTodoListRepository<'_>, TodoList) {
    let client = client(conn);
    let space = SqliteSpaceRepository::new(client)
        .create_space(&Space::new("Home"))
        .unwrap();
    let repo = SqliteTodoListRepository::new(client);
    let list = repo
        .create_todo_list(&TodoList::new(space.id, "Chores"))
        .unwrap();
    (repo, list)
}

fn counts(repo: &impl TodoListRepository, list: &TodoList) -> (i64, i64) {
    let stored = repo.get_todo_list(list.id).unwrap().unwrap();
    (stored.total_item_count, stored.completed_item_count)
}

#[test]
fn new_lists_start_with_zero_counts() {
    let conn = open_db_in_memory().unwrap();
    let (_repo, list) = remote_list(&conn);

    assert_eq!((list.total_item_count, list.completed_item_count), (0, 0));
    assert_eq!(list.progress(), 0.0);
}

#[test]
fn item_mutations_keep_counts_in_sync() {
    let conn = open_db_in_memory().unwrap();
    let (repo, list) = remote_list(&conn);

    let mut done = TodoItem::new(list.id, "Dishes");
    done.is_completed = true;
    let done = repo.create_todo_item(&done).unwrap();
    let laundry = repo
        .create_todo_item(&TodoItem::new(list.id, "Laundry"))
        .unwrap();
    let vacuum = repo
        .create_todo_item(&TodoItem::new(list.id, "Vacuum"))
        .unwrap();
    assert_eq!(counts(&repo, &list), (3, 1));

    let toggled = repo.toggle_todo_item(laundry.id).unwrap().unwrap();
    assert!(toggled.is_completed);
    assert_eq!(counts(&repo, &list), (3, 2));

    repo.delete_todo_item(done.id).unwrap();
    assert_eq!(counts(&repo, &list), (2, 1));

    repo.delete_todo_item(done.id).unwrap();
    assert_eq!(counts(&repo, &list), (2, 1));

    let mut reopened = toggled.clone();
    reopened.is_completed = false;
    repo.update_todo_item(&reopened).unwrap().unwrap();
    assert_eq!(counts(&repo, &list), (2, 0));

    let orders: Vec<i64> = repo
        .get_todo_items(list.id)
        .unwrap()
        .iter()
        .map(|item| item.sort_order)
        .collect();
    assert_eq!(orders, vec![1, 2]);
    assert_eq!(vacuum.sort_order, 2);
}

#[test]
fn update_without_completion_change_keeps_fields_and_counts() {
    let conn = open_db_in_memory().unwrap();
    let (repo, list) = remote_list(&conn);
    let item = repo
        .create_todo_item(&TodoItem::new(list.id, "Pay rent"))
        .unwrap();

    let mut edited = item.clone();
    edited.title = "Pay rent today".to_string();
    edited.priority = Some(TodoPriority::High);
    edited.due_date = Some(1_700_000_000_000);
    let updated = repo.update_todo_item(&edited).unwrap().unwrap();

    assert_eq!(updated.title, "Pay rent today");
    assert_eq!(updated.priority, Some(TodoPriority::High));
    assert_eq!(updated.due_date, Some(1_700_000_000_000));
    assert_eq!(counts(&repo, &list), (1, 0));
    assert_eq!(
        repo.update_todo_item(&TodoItem::new(list.id, "Missing"))
            .unwrap(),
        None
    );
}

#[test]
fn list_updates_never_write_counts() {
    let conn = open_db_in_memory().unwrap();
    let (repo, list) = remote_list(&conn);
    repo.create_todo_item(&TodoItem::new(list.id, "One"))
        .unwrap();

    let mut edited = repo.get_todo_list(list.id).unwrap().unwrap();
    edited.name = "Weekend chores".to_string();
    edited.total_item_count = 10;
    edited.completed_item_count = 5;
    let updated = repo.update_todo_list(&edited).unwrap().unwrap();

    assert_eq!(updated.name, "Weekend chores");
    assert_eq!(
        (updated.total_item_count, updated.completed_item_count),
        (1, 0)
    );
}

#[test]
fn deleting_a_list_removes_its_items() {
    let conn = open_db_in_memory().unwrap();
    let (repo, list) = remote_list(&conn);
    let item = repo
        .create_todo_item(&TodoItem::new(list.id, "Orphan"))
        .unwrap();

    repo.delete_todo_list(list.id).unwrap();

    assert_eq!(repo.get_todo_list(list.id).unwrap(), None);
    assert_eq!(repo.get_todo_item(item.id).unwrap(), None);
}

#[test]
fn reorder_items_rewrites_positions() {
    let conn = open_db_in_memory().unwrap();
    let (repo, list) = remote_list(&conn);
    let a = repo.create_todo_item(&TodoItem::new(list.id, "a")).unwrap();
    let b = repo.create_todo_item(&TodoItem::new(list.id, "b")).unwrap();
    let c = repo.create_todo_item(&TodoItem::new(list.id, "c")).unwrap();

    repo.reorder_todo_items(list.id, &[c.id, a.id, b.id])
        .unwrap();

    let stored: Vec<(Uuid, i64)> = repo
        .get_todo_items(list.id)
        .unwrap()
        .iter()
        .map(|item| (item.id, item.sort_order))
        .collect();
    assert_eq!(stored, vec![(c.id, 0), (a.id, 1), (b.id, 2)]);
}

#[test]
fn local_store_keeps_counts_in_sync() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();
    let space = LocalSpaceRepository::new(store, owner)
        .create_space(&Space::new("Device"))
        .unwrap();
    let repo = LocalTodoListRepository::new(store, owner);
    let list = repo
        .create_todo_list(&TodoList::new(space.id, "Errands"))
        .unwrap();

    let first = repo
        .create_todo_item(&TodoItem::new(list.id, "Post office"))
        .unwrap();
    let second = repo
        .create_todo_item(&TodoItem::new(list.id, "Bank"))
        .unwrap();
    assert_eq!((first.sort_order, second.sort_order), (0, 1));
    assert_eq!(first.user_id, owner);

    repo.toggle_todo_item(second.id).unwrap().unwrap();
    assert_eq!(counts(&repo, &list), (2, 1));

    repo.delete_todo_item(first.id).unwrap();
    assert_eq!(counts(&repo, &list), (1, 1));

    assert!(matches!(
        repo.update_todo_item(&TodoItem::new(list.id, "Missing")),
        Err(RepoError::NotFound { .. })
    ));
    assert!(matches!(
        repo.create_todo_item(&TodoItem::new(Uuid::new_v4(), "No list")),
        Err(RepoError::NotFound { .. })
    ));
}

#[test]
fn service_adds_edits_and_toggles_items() {
    let conn = open_db_in_memory().unwrap();
    let client = client(&conn);
    let space = SqliteSpaceRepository::new(client)
        .create_space(&Space::new("Work"))
        .unwrap();
    let service = TodoService::new(SqliteTodoListRepository::new(client));

    let list = service
        .create_todo_list(space.id, " Sprint ", Some("  ".to_string()))
        .unwrap();
    assert_eq!(list.name, "Sprint");
    assert_eq!(list.description, None);

    let item = service
        .add_item(
            list.id,
            TodoItemInput {
                priority: Some(TodoPriority::Medium),
                ..TodoItemInput::titled("  Review PR ")
            },
        )
        .unwrap();
    assert_eq!(item.title, "Review PR");

    let toggled = service.toggle_item(item.id).unwrap();
    assert!(toggled.is_completed);

    let edited = service
        .edit_item(item.id, TodoItemInput::titled("Review both PRs"))
        .unwrap();
    assert!(edited.is_completed);
    assert_eq!(edited.priority, None);

    let stored = service.get_todo_list(list.id).unwrap();
    assert!(stored.is_complete());

    assert!(matches!(
        service.add_item(list.id, TodoItemInput::titled("   ")),
        Err(ServiceError::InvalidTitle)
    ));
    assert!(matches!(
        service.toggle_item(Uuid::new_v4()),
        Err(ServiceError::NotFound { .. })
    ));
}
