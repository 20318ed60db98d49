use later_core::db::open_db_in_memory;
use later_core::{
    ListItem, ListModel, ListRepository, ListService, ListStyle, RemoteClient, ServiceError,
    Space, SpaceRepository, SqliteListRepository, SqliteSpaceRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn client(conn: &Connection) -> RemoteClient<'_> {
    RemoteClient::try_new(conn, Some(Uuid::new_v4())).unwrap()
}

fn space(client: RemoteClient<'_>) -> Space {
    SqliteSpaceRepository::new(client)
        .create_space(&Space::new("Shopping"))
        .unwrap()
}

#[test]
fn list_style_and_icon_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let client = client(&conn);
    let space = space(client);
    let repo = SqliteListRepository::new(client);

    let mut list = ListModel::new(space.id, "Packing");
    list.style = ListStyle::Checkboxes;
    list.icon = Some("suitcase".to_string());
    let created = repo.create_list(&list).unwrap();

    let stored = repo.get_list(created.id).unwrap().unwrap();
    assert_eq!(stored.style, ListStyle::Checkboxes);
    assert_eq!(stored.icon.as_deref(), Some("suitcase"));

    let mut numbered = stored.clone();
    numbered.style = ListStyle::Numbered;
    let updated = repo.update_list(&numbered).unwrap().unwrap();
    assert_eq!(updated.style, ListStyle::Numbered);
    assert_eq!(
        repo.update_list(&ListModel::new(space.id, "Ghost")).unwrap(),
        None
    );
}

#[test]
fn items_get_dense_orders_and_toggle() {
    let conn = open_db_in_memory().unwrap();
    let client = client(&conn);
    let space = space(client);
    let repo = SqliteListRepository::new(client);
    let list = repo
        .create_list(&ListModel::new(space.id, "Groceries"))
        .unwrap();

    let items: Vec<ListItem> = ["Milk", "Eggs", "Bread"]
        .into_iter()
        .map(|title| repo.create_list_item(&ListItem::new(list.id, title)).unwrap())
        .collect();
    let orders: Vec<i64> = items.iter().map(|item| item.sort_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    let checked = repo.toggle_list_item(items[1].id).unwrap().unwrap();
    assert!(checked.is_checked);
    let unchecked = repo.toggle_list_item(items[1].id).unwrap().unwrap();
    assert!(!unchecked.is_checked);

    repo.delete_list_item(items[0].id).unwrap();
    let next = repo
        .create_list_item(&ListItem::new(list.id, "Butter"))
        .unwrap();
    assert_eq!(next.sort_order, 3);

    repo.reorder_list_items(list.id, &[next.id, items[2].id, items[1].id])
        .unwrap();
    let stored: Vec<(Uuid, i64)> = repo
        .get_list_items(list.id)
        .unwrap()
        .iter()
        .map(|item| (item.id, item.sort_order))
        .collect();
    assert_eq!(
        stored,
        vec![(next.id, 0), (items[2].id, 1), (items[1].id, 2)]
    );
}

#[test]
fn move_list_to_another_space_appends_it() {
    let conn = open_db_in_memory().unwrap();
    let client = client(&conn);
    let from = space(client);
    let to = space(client);
    let repo = SqliteListRepository::new(client);
    repo.create_list(&ListModel::new(to.id, "Already here"))
        .unwrap();
    let moving = repo.create_list(&ListModel::new(from.id, "Moving")).unwrap();

    let moved = repo.move_list_to_space(moving.id, to.id).unwrap().unwrap();

    assert_eq!(moved.space_id, to.id);
    assert_eq!(moved.sort_order, 1);
    assert!(repo.list_lists(from.id).unwrap().is_empty());
}

#[test]
fn service_trims_input_and_drags_items() {
    let conn = open_db_in_memory().unwrap();
    let client = client(&conn);
    let space = space(client);
    let service = ListService::new(SqliteListRepository::new(client));

    let list = service
        .create_list(space.id, " Books ", ListStyle::Numbered, None)
        .unwrap();
    assert_eq!(list.name, "Books");

    let first = service.add_item(list.id, " Dune ", Some(" ".to_string())).unwrap();
    let second = service.add_item(list.id, "Emma", None).unwrap();
    assert_eq!(first.title, "Dune");
    assert_eq!(first.notes, None);

    let mut edited = first.clone();
    edited.title = "  Dune Messiah ".to_string();
    let edited = service.edit_item(&edited).unwrap();
    assert_eq!(edited.title, "Dune Messiah");

    let outcome = service.move_item(list.id, 1, 0).unwrap();
    assert!(outcome.is_persisted());
    let stored: Vec<Uuid> = service
        .items(list.id)
        .unwrap()
        .iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(stored, vec![second.id, first.id]);

    assert!(matches!(
        service.create_list(space.id, "", ListStyle::Bullets, None),
        Err(ServiceError::InvalidName)
    ));
    assert!(matches!(
        service.move_list_to_space(list.id, space.id),
        Err(ServiceError::InvalidMove(_))
    ));
}
