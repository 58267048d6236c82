use rusqlite::Connection;
use timestamper_core::db::{open_db, open_db_in_memory};
use timestamper_core::{
    Item, ItemRepository, ItemService, ItemServiceError, RepoError, SqliteItemRepository,
    StoreEvent, DEFAULT_TITLE,
};
use uuid::Uuid;

#[test]
fn create_defaults_title_and_starts_without_notes() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let item = service.create_item(None).unwrap();
    assert_eq!(item.title, DEFAULT_TITLE);
    assert!(item.notes.is_empty());

    let blank = service.create_item(Some("   ")).unwrap();
    assert_eq!(blank.title, DEFAULT_TITLE);
}

#[test]
fn list_is_sorted_by_created_at_with_newest_last() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let middle = service.create_item_at(Some("middle"), 2_000).unwrap();
    let oldest = service.create_item_at(Some("oldest"), 1_000).unwrap();
    let newest = service.create_item(Some("newest")).unwrap();

    let ids: Vec<_> = service
        .list_items()
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ids, vec![oldest.id, middle.id, newest.id]);
}

#[test]
fn items_created_in_the_same_millisecond_keep_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let created: Vec<_> = (0..20)
        .map(|index| {
            service
                .create_item_at(Some(&format!("item {index}")), 1_000)
                .unwrap()
                .id
        })
        .collect();

    let listed: Vec<_> = service
        .list_items()
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(listed, created);
}

#[test]
fn item_created_last_is_listed_last() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    for _ in 0..10 {
        service.create_item(Some("a")).unwrap();
        let b = service.create_item(Some("b")).unwrap();
        let items = service.list_items().unwrap();
        assert_eq!(items.last().map(|item| item.id), Some(b.id));
    }
}

#[test]
fn deleting_the_newest_item_does_not_reorder_later_ones() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let first = service.create_item_at(Some("first"), 1_000).unwrap();
    let doomed = service.create_item_at(Some("doomed"), 1_000).unwrap();
    service.delete_item(doomed.id).unwrap();
    let replacement = service.create_item_at(Some("replacement"), 1_000).unwrap();

    let ids: Vec<_> = service
        .list_items()
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ids, vec![first.id, replacement.id]);
}

#[test]
fn append_note_preserves_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let item = service.create_item(Some("Session 1")).unwrap();

    service.append_note(item.id, "00:00:05: kickoff").unwrap();
    service.append_note(item.id, "second").unwrap();
    let updated = service.append_note(item.id, "00:01:05: third").unwrap();

    let expected = vec![
        "00:00:05: kickoff".to_string(),
        "second".to_string(),
        "00:01:05: third".to_string(),
    ];
    assert_eq!(updated.notes, expected);
    assert_eq!(service.get_item(item.id).unwrap().unwrap().notes, expected);
    assert_eq!(service.list_items().unwrap()[0].notes, expected);
}

#[test]
fn append_note_rejects_blank_text() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let item = service.create_item(None).unwrap();

    let err = service.append_note(item.id, "  \n").unwrap_err();
    assert!(matches!(err, ItemServiceError::EmptyNote));
    assert!(service.get_item(item.id).unwrap().unwrap().notes.is_empty());
}

#[test]
fn append_note_to_missing_item_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let missing = Uuid::new_v4();

    let err = service.append_note(missing, "text").unwrap_err();
    assert!(matches!(err, ItemServiceError::ItemNotFound(id) if id == missing));
}

#[test]
fn delete_removes_item_and_its_notes() {
    let conn = open_db_in_memory().unwrap();
    {
        let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
        let keep = service.create_item(Some("keep")).unwrap();
        let drop_me = service.create_item(Some("drop")).unwrap();
        service.append_note(drop_me.id, "gone").unwrap();
        service.append_note(keep.id, "stays").unwrap();

        service.delete_item(drop_me.id).unwrap();

        let listed = service.list_items().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep.id);
        assert!(service.get_item(drop_me.id).unwrap().is_none());

        let err = service.delete_item(drop_me.id).unwrap_err();
        assert!(matches!(err, ItemServiceError::ItemNotFound(_)));
    }

    let orphan_notes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM item_notes WHERE content = 'gone';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphan_notes, 0);
}

#[test]
fn rename_replaces_title_and_blank_falls_back_to_default() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let item = service.create_item(None).unwrap();

    let renamed = service.rename_item(item.id, "Standup").unwrap();
    assert_eq!(renamed.title, "Standup");
    assert_eq!(renamed.created_at, item.created_at);

    let reset = service.rename_item(item.id, " ").unwrap();
    assert_eq!(reset.title, DEFAULT_TITLE);
}

#[test]
fn repository_create_persists_preexisting_notes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = Item::with_timestamp(Some("imported"), 5);
    item.notes = vec!["a".to_string(), "b".to_string()];
    repo.create_item(&item).unwrap();

    assert_eq!(repo.get_item(item.id).unwrap().unwrap(), item);
    assert_eq!(repo.append_note(item.id, "c").unwrap(), 2);
}

#[test]
fn repository_rejects_invalid_item() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = Item::with_timestamp(Some("x"), 0);
    item.title = String::new();
    assert!(matches!(
        repo.create_item(&item),
        Err(RepoError::Validation(_))
    ));
}

#[test]
fn write_failure_is_surfaced_as_recoverable_error() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let item = service.create_item(None).unwrap();

    conn.execute_batch("PRAGMA query_only = ON;").unwrap();

    let create_err = service.create_item(Some("blocked")).unwrap_err();
    assert!(matches!(create_err, ItemServiceError::StoreWrite(_)));
    let note_err = service.append_note(item.id, "blocked").unwrap_err();
    assert!(matches!(note_err, ItemServiceError::StoreWrite(_)));

    conn.execute_batch("PRAGMA query_only = OFF;").unwrap();
    service.append_note(item.id, "recovered").unwrap();
}

#[test]
fn read_failure_is_surfaced_as_store_read() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    service.create_item(None).unwrap();

    conn.execute(
        "UPDATE items SET uuid = 'not-a-uuid';",
        [],
    )
    .unwrap();

    let err = service.list_items().unwrap_err();
    assert!(matches!(
        err,
        ItemServiceError::StoreRead(RepoError::InvalidData(_))
    ));
}

#[test]
fn mutations_publish_store_events() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let events = service.subscribe();

    let item = service.create_item(None).unwrap();
    service.append_note(item.id, "n").unwrap();
    service.rename_item(item.id, "t").unwrap();
    service.delete_item(item.id).unwrap();

    let received: Vec<StoreEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            StoreEvent::ItemCreated(item.id),
            StoreEvent::NoteAppended {
                id: item.id,
                position: 0,
            },
            StoreEvent::ItemRenamed(item.id),
            StoreEvent::ItemDeleted(item.id),
        ]
    );
}

#[test]
fn items_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timestamper.sqlite3");

    let id = {
        let conn = open_db(&path).unwrap();
        let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
        let item = service.create_item(Some("durable")).unwrap();
        service.append_note(item.id, "00:00:10: persisted").unwrap();
        item.id
    };

    let conn: Connection = open_db(&path).unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let reloaded = service.get_item(id).unwrap().unwrap();
    assert_eq!(reloaded.title, "durable");
    assert_eq!(reloaded.notes, vec!["00:00:10: persisted".to_string()]);
}
