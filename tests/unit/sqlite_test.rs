//! Loading visits from a Chromium-shaped `History` database.

use rusqlite::{params, Connection};
use std::path::Path;
use tempfile::TempDir;
use visitstats::sqlite::{load_history_file, load_visits};
use visitstats::{Transition, VisitFilter};

const WEBKIT_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

fn webkit(unix_millis: i64) -> i64 {
    unix_millis * 1000 + WEBKIT_EPOCH_OFFSET_MICROS
}

fn create_history(path: &Path) -> Connection {
    let conn = Connection::open(path).expect("Failed to create history database");
    conn.execute_batch(
        "CREATE TABLE urls (id INTEGER PRIMARY KEY, url TEXT NOT NULL, title TEXT);
         CREATE TABLE visits (
             id INTEGER PRIMARY KEY,
             url INTEGER NOT NULL,
             visit_time INTEGER NOT NULL,
             from_visit INTEGER,
             transition INTEGER NOT NULL DEFAULT 0
         );",
    )
    .unwrap();

    conn.execute(
        "INSERT INTO urls (id, url, title) VALUES (?1, ?2, ?3), (?4, ?5, ?6)",
        params![
            1,
            "https://a.com/",
            "A",
            2,
            "https://b.com/page",
            Option::<String>::None
        ],
    )
    .unwrap();

    let visits: [(i64, i64, i64, i64, i64); 5] = [
        (10, 1, webkit(3_000), 11, 0x3000_0000),
        (11, 2, webkit(2_000), 0, 1),
        (12, 1, webkit(1_000), 0, 6),
        // Before 1970
        (13, 1, 1_000, 0, 0),
        // Unknown core transition
        (14, 2, webkit(4_000), 0, 42),
    ];
    for (id, url, time, from_visit, transition) in visits {
        conn.execute(
            "INSERT INTO visits (id, url, visit_time, from_visit, transition) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, url, time, from_visit, transition],
        )
        .unwrap();
    }
    conn
}

#[test]
fn loads_visits_oldest_first() {
    let dir = TempDir::new().unwrap();
    let conn = create_history(&dir.path().join("History"));

    let store = load_visits(&conn).unwrap();
    let visits = store.visits();

    assert_eq!(visits.len(), 3);
    assert_eq!(
        visits.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(),
        ["12", "11", "10"]
    );
    assert_eq!(
        visits.iter().map(|v| v.time).collect::<Vec<_>>(),
        [1_000, 2_000, 3_000]
    );
}

#[test]
fn maps_columns_onto_visits() {
    let dir = TempDir::new().unwrap();
    let conn = create_history(&dir.path().join("History"));

    let store = load_visits(&conn).unwrap();
    let by_id = |id: &str| store.visits().iter().find(|v| v.id == id).unwrap();

    let start = by_id("12");
    assert_eq!(start.transition, Transition::StartPage);
    assert_eq!(start.ref_id, None);
    assert_eq!(start.title, "A");

    let typed = by_id("11");
    assert_eq!(typed.transition, Transition::Typed);
    assert_eq!(typed.title, "");
    assert_eq!(typed.url, "https://b.com/page");

    let chained = by_id("10");
    assert_eq!(chained.transition, Transition::Link);
    assert_eq!(chained.ref_id.as_deref(), Some("11"));
}

#[test]
fn loads_through_a_temporary_copy() {
    let dir = TempDir::new().unwrap();
    let history = dir.path().join("History");
    drop(create_history(&history));
    let copy = dir.path().join("copy.db");

    let store = load_history_file(&history, Some(&copy)).unwrap();

    assert_eq!(store.len(), 3);
    assert!(!copy.exists(), "temporary copy should be removed");
    assert_eq!(
        store
            .get_visits(&VisitFilter::new().with_domain("a.com"))
            .len(),
        2
    );
}

#[test]
fn missing_history_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = load_history_file(&dir.path().join("nope"), Some(&dir.path().join("copy.db")));
    assert!(result.is_err());
}
