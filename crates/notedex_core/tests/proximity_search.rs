use notedex_core::db::open_db_in_memory;
use notedex_core::{
    occurrences_around, IndexService, PageFormatConfig, ProximityQuery, SearchError,
    SqliteNotebookLocator,
};
use rusqlite::Connection;

#[test]
fn finds_entries_within_margin_sorted_by_page_then_name() {
    let conn = open_db_in_memory().unwrap();
    insert_notebook(&conn, "A", 1);
    let pages = PageFormatConfig::default();
    let service = IndexService::try_new(&conn, &pages).unwrap();
    for (name, page) in [
        ("kettle", "10"),
        ("Zebra", "9"),
        ("apple", "9"),
        ("Badger", "8"),
        ("outside", "11"),
    ] {
        service.add_occurrence(name, "A", 1, page).unwrap();
    }

    let hits = service
        .occurrences_around(&ProximityQuery::new("A", 1, 9))
        .unwrap();

    let found: Vec<_> = hits
        .iter()
        .map(|hit| (hit.page.as_str(), hit.entry_name.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("008", "Badger"),
            ("009", "apple"),
            ("009", "Zebra"),
            ("010", "kettle"),
        ]
    );
}

#[test]
fn wider_margin_widens_the_window() {
    let conn = open_db_in_memory().unwrap();
    insert_notebook(&conn, "A", 1);
    let pages = PageFormatConfig::default();
    let service = IndexService::try_new(&conn, &pages).unwrap();
    for page in ["5", "7", "9", "11", "13", "100"] {
        service
            .add_occurrence(&format!("p{page}"), "A", 1, page)
            .unwrap();
    }

    let hits = service
        .occurrences_around(&ProximityQuery::new("A", 1, 9).with_margin(2))
        .unwrap();
    let names: Vec<_> = hits.iter().map(|hit| hit.entry_name.as_str()).collect();
    assert_eq!(names, vec!["p7", "p9", "p11"]);
}

#[test]
fn only_the_requested_notebook_is_searched() {
    let conn = open_db_in_memory().unwrap();
    insert_notebook(&conn, "A", 1);
    insert_notebook(&conn, "A", 2);
    insert_notebook(&conn, "B", 1);
    let pages = PageFormatConfig::default();
    let service = IndexService::try_new(&conn, &pages).unwrap();
    service.add_occurrence("here", "A", 1, "4").unwrap();
    service.add_occurrence("other volume", "A", 2, "4").unwrap();
    service.add_occurrence("other type", "B", 1, "4").unwrap();

    let hits = service
        .occurrences_around(&ProximityQuery::new("A", 1, 4))
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].entry_name, "here");
}

#[test]
fn ranges_starting_inside_the_window_are_found() {
    let conn = open_db_in_memory().unwrap();
    insert_notebook(&conn, "A", 1);
    let pages = PageFormatConfig::default();
    let service = IndexService::try_new(&conn, &pages).unwrap();
    service.add_occurrence("range", "A", 1, "8-12").unwrap();
    service.add_occurrence("annotated", "A", 1, "9 (fig)").unwrap();
    service.add_occurrence("before", "A", 1, "7-9").unwrap();

    let hits = service
        .occurrences_around(&ProximityQuery::new("A", 1, 9))
        .unwrap();
    let found: Vec<_> = hits
        .iter()
        .map(|hit| (hit.page.as_str(), hit.entry_name.as_str()))
        .collect();
    assert_eq!(found, vec![("008-12", "range"), ("009 (fig)", "annotated")]);
}

#[test]
fn low_bound_saturates_at_page_zero() {
    let conn = open_db_in_memory().unwrap();
    insert_notebook(&conn, "A", 1);
    let pages = PageFormatConfig::default();
    let service = IndexService::try_new(&conn, &pages).unwrap();
    service.add_occurrence("cover", "A", 1, "0").unwrap();
    service.add_occurrence("first", "A", 1, "1").unwrap();

    let hits = service
        .occurrences_around(&ProximityQuery::new("A", 1, 0).with_margin(3))
        .unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn window_at_the_width_limit_is_clamped() {
    let conn = open_db_in_memory().unwrap();
    insert_notebook(&conn, "CB", 1);
    let pages = PageFormatConfig::default();
    let service = IndexService::try_new(&conn, &pages).unwrap();
    service.add_occurrence("Nine", "CB", 1, "999").unwrap();
    service.add_occurrence("Near", "CB", 1, "998").unwrap();
    service.add_occurrence("Low", "CB", 1, "1").unwrap();

    let hits = service
        .occurrences_around(&ProximityQuery::new("CB", 1, 999))
        .unwrap();
    let names: Vec<_> = hits.iter().map(|hit| hit.entry_name.as_str()).collect();
    assert_eq!(names, vec!["Near", "Nine"]);

    let beyond = service
        .occurrences_around(&ProximityQuery::new("CB", 1, 1_500))
        .unwrap();
    assert!(beyond.is_empty());

    let saturated = service
        .occurrences_around(&ProximityQuery::new("CB", 1, 999).with_margin(u64::MAX))
        .unwrap();
    assert_eq!(saturated.len(), 3);
}

#[test]
fn redirect_markers_are_not_returned() {
    let conn = open_db_in_memory().unwrap();
    insert_notebook(&conn, "A", 1);
    let pages = PageFormatConfig::default();
    let service = IndexService::try_new(&conn, &pages).unwrap();
    service.add_occurrence("Foo", "A", 1, "5").unwrap();
    service.create_entry("Bar").unwrap();
    service.coalesce_entry("Foo", "Bar", true).unwrap();

    let hits = service
        .occurrences_around(&ProximityQuery::new("A", 1, 5).with_margin(1_000))
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].entry_name, "Bar");
}

#[test]
fn unknown_notebook_is_an_error() {
    let conn = open_db_in_memory().unwrap();
    let pages = PageFormatConfig::default();
    let locator = SqliteNotebookLocator::try_new(&conn).unwrap();

    let err = occurrences_around(&conn, &locator, &pages, &ProximityQuery::new("Z", 9, 1))
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::NotebookNotFound {
            ref notebook_type,
            notebook_number: 9
        } if notebook_type == "Z"
    ));
}

fn insert_notebook(conn: &Connection, ntype: &str, nnum: i64) -> i64 {
    conn.execute(
        "INSERT INTO notebooks (ntype, nnum) VALUES (?1, ?2);",
        rusqlite::params![ntype, nnum],
    )
    .unwrap();
    conn.last_insert_rowid()
}
