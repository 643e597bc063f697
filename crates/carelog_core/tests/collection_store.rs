use carelog_core::db::open_db_in_memory;
use carelog_core::repo::collection_store::SUMMARY_REFRESH_HISTORY;
use carelog_core::{
    seed_headers, Collection, CollectionStore, SqliteCollectionStore, StoreError, UserLayout,
};
use uuid::Uuid;

fn row(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

#[test]
fn append_preserves_order_and_assigns_distinct_ids() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteCollectionStore::try_new(&conn).unwrap();

    let header = store
        .append_row(Collection::Milestones, row(&["Username", "Log Date", "Milestone"]))
        .unwrap();
    let first = store
        .append_row(Collection::Milestones, row(&["alice", "2024-06-01", "Rolling over"]))
        .unwrap();
    let second = store
        .append_row(Collection::Milestones, row(&["alice", "2024-06-02", "None"]))
        .unwrap();

    let rows = store.read_all(Collection::Milestones).unwrap();
    assert_eq!(
        rows.iter().map(|stored| stored.id).collect::<Vec<_>>(),
        vec![header, first, second]
    );
    assert_eq!(rows[1].cells, row(&["alice", "2024-06-01", "Rolling over"]));
    assert!(store.read_all(Collection::Growth).unwrap().is_empty());
}

#[test]
fn cells_with_quotes_and_commas_survive_storage() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteCollectionStore::try_new(&conn).unwrap();

    let tricky = row(&["alice", "2024-06-01", "said \"mama\", then laughed\n"]);
    store.append_row(Collection::Milestones, tricky.clone()).unwrap();

    assert_eq!(store.read_all(Collection::Milestones).unwrap()[0].cells, tricky);
}

#[test]
fn clear_only_touches_one_collection() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteCollectionStore::try_new(&conn).unwrap();
    store.append_row(Collection::Growth, row(&["h"])).unwrap();
    store.append_row(Collection::Summary, row(&["h"])).unwrap();

    store.clear(Collection::Summary).unwrap();

    assert!(store.read_all(Collection::Summary).unwrap().is_empty());
    assert_eq!(store.read_all(Collection::Growth).unwrap().len(), 1);

    // Positions restart cleanly after a clear.
    store.append_row(Collection::Summary, row(&["again"])).unwrap();
    assert_eq!(store.read_all(Collection::Summary).unwrap()[0].cells, row(&["again"]));
}

#[test]
fn update_cell_keeps_row_identity_and_position() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteCollectionStore::try_new(&conn).unwrap();
    store.append_row(Collection::DailyLogs, row(&["Username", "Log Date"])).unwrap();
    let target = store
        .append_row(Collection::DailyLogs, row(&["alice", "2024-06-01", "8", "500", "3", "2"]))
        .unwrap();
    store
        .append_row(Collection::DailyLogs, row(&["alice", "2024-06-02", "9", "450", "4", "1"]))
        .unwrap();

    store
        .update_cell(Collection::DailyLogs, target, 1, "2024-05-31".to_string())
        .unwrap();

    let rows = store.read_all(Collection::DailyLogs).unwrap();
    assert_eq!(rows[1].id, target);
    assert_eq!(rows[1].cells[1], "2024-05-31");
    assert_eq!(rows[2].cells[1], "2024-06-02");
}

#[test]
fn update_cell_requires_matching_collection() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteCollectionStore::try_new(&conn).unwrap();
    let growth_row = store.append_row(Collection::Growth, row(&["alice"])).unwrap();

    let err = store
        .update_cell(Collection::DailyLogs, growth_row, 1, "2024-01-01".to_string())
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::RowNotFound {
            collection: Collection::DailyLogs,
            ..
        }
    ));

    let err = store
        .update_cell(Collection::Growth, Uuid::new_v4(), 0, "x".to_string())
        .unwrap_err();
    assert!(matches!(err, StoreError::RowNotFound { .. }));
}

#[test]
fn replace_all_swaps_rows_and_records_summary_refresh() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteCollectionStore::try_new(&conn).unwrap();
    store.append_row(Collection::Summary, row(&["stale"])).unwrap();
    assert!(store.last_summary_refresh().unwrap().is_none());

    store
        .replace_all(
            Collection::Summary,
            vec![row(&["Username"]), row(&["alice"]), row(&["bob"])],
        )
        .unwrap();

    let cells: Vec<Vec<String>> = store
        .read_all(Collection::Summary)
        .unwrap()
        .into_iter()
        .map(|stored| stored.cells)
        .collect();
    assert_eq!(cells, vec![row(&["Username"]), row(&["alice"]), row(&["bob"])]);
    assert_eq!(store.last_summary_refresh().unwrap().unwrap().row_count, 2);
}

#[test]
fn summary_refresh_history_is_capped() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteCollectionStore::try_new(&conn).unwrap();

    for refresh in 0..SUMMARY_REFRESH_HISTORY + 5 {
        let mut rows = vec![row(&["Username"])];
        rows.extend((0..refresh % 3).map(|_| row(&["alice"])));
        store.replace_all(Collection::Summary, rows).unwrap();
    }

    let kept: u32 = conn
        .query_row("SELECT COUNT(*) FROM summary_refreshes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(kept, SUMMARY_REFRESH_HISTORY);
    let latest_row_count = (SUMMARY_REFRESH_HISTORY + 4) % 3;
    assert_eq!(
        store.last_summary_refresh().unwrap().unwrap().row_count,
        latest_row_count
    );
}

#[test]
fn failed_replace_leaves_previous_rows_in_place() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteCollectionStore::try_new(&conn).unwrap();
    store.append_row(Collection::Summary, row(&["Username"])).unwrap();
    store.append_row(Collection::Summary, row(&["alice"])).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER reject_bob BEFORE INSERT ON collection_rows
         WHEN NEW.cells LIKE '%bob%'
         BEGIN SELECT RAISE(ABORT, 'bob rejected'); END;",
    )
    .unwrap();

    let err = store
        .replace_all(
            Collection::Summary,
            vec![row(&["Username"]), row(&["carol"]), row(&["bob"])],
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Db(_)));

    let cells: Vec<Vec<String>> = store
        .read_all(Collection::Summary)
        .unwrap()
        .into_iter()
        .map(|stored| stored.cells)
        .collect();
    assert_eq!(cells, vec![row(&["Username"]), row(&["alice"])]);
    assert!(store.last_summary_refresh().unwrap().is_none());
}

#[test]
fn seed_headers_fills_only_empty_input_collections() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteCollectionStore::try_new(&conn).unwrap();
    store.append_row(Collection::Growth, row(&["custom header"])).unwrap();

    let seeded = seed_headers(&mut store, UserLayout::WithoutSecret).unwrap();

    assert_eq!(
        seeded,
        vec![Collection::Users, Collection::DailyLogs, Collection::Milestones]
    );
    assert_eq!(store.read_all(Collection::Users).unwrap()[0].cells.len(), 6);
    assert_eq!(
        store.read_all(Collection::Growth).unwrap()[0].cells,
        row(&["custom header"])
    );
    assert!(store.read_all(Collection::Summary).unwrap().is_empty());

    assert!(seed_headers(&mut store, UserLayout::WithoutSecret)
        .unwrap()
        .is_empty());
}
