//! Integration tests for persistence and the command-line interface.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

use agenda::storage::{FileStore, KeyValueStore, MemoryStore, load_events, persist_events};
use agenda::store::EventStore;
use agenda::types::{CalendarDate, DateKey, STORAGE_KEY};

fn date(year: i32, month: u32, day: u32) -> CalendarDate {
    CalendarDate::new(year, month - 1, day).unwrap()
}

fn agenda(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("agenda").unwrap();
    cmd.env("AGENDA_TEST_TIME", "2026-02-18")
        .env_remove("RUST_LOG")
        .arg("--no-color")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn stored_json(data_dir: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(data_dir.join(format!("{STORAGE_KEY}.json"))).unwrap();
    serde_json::from_str(&raw).unwrap()
}

mod storage_tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let temp = tempdir().unwrap();
        let storage = FileStore::open(temp.path()).unwrap();

        let store = EventStore::new()
            .upsert(Some(date(2024, 3, 15)), "09:00", "Standup", None, 1)
            .unwrap();
        persist_events(&storage, &store).unwrap();

        assert!(storage.path_for(STORAGE_KEY).exists());
        assert_eq!(load_events(&storage), store);
    }

    #[test]
    fn missing_file_loads_empty() {
        let temp = tempdir().unwrap();
        let storage = FileStore::open(&temp.path().join("nested")).unwrap();
        assert!(load_events(&storage).is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let temp = tempdir().unwrap();
        let storage = FileStore::open(temp.path()).unwrap();
        fs::write(storage.path_for(STORAGE_KEY), "{ not json").unwrap();
        assert!(load_events(&storage).is_empty());
    }

    #[test]
    fn malformed_event_does_not_cost_the_others() {
        let temp = tempdir().unwrap();
        let storage = FileStore::open(temp.path()).unwrap();
        storage
            .set(
                STORAGE_KEY,
                r#"{"2024-03-14":[{"id":1,"time":"08:00","description":"keep me"}],"2024-03-15":[{"id":"abc","time":"09:00","description":"bad"}]}"#,
            )
            .unwrap();

        let store = load_events(&storage);
        assert_eq!(store.event_count(), 1);

        let next = store
            .upsert(Some(date(2024, 3, 16)), "10:00", "new", None, 5)
            .unwrap();
        persist_events(&storage, &next).unwrap();

        let reloaded = load_events(&storage);
        assert_eq!(
            reloaded.lookup(&DateKey::from_date(date(2024, 3, 14)))[0].description,
            "keep me"
        );
        assert_eq!(reloaded.event_count(), 2);
    }

    #[test]
    fn overwrite_replaces_previous_value() {
        let temp = tempdir().unwrap();
        let storage = FileStore::open(temp.path()).unwrap();
        storage.set("k", "first").unwrap();
        storage.set("k", "second").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("second"));
        assert_eq!(storage.get("other").unwrap(), None);
    }

    #[test]
    fn memory_store_holds_serialized_events() {
        let storage = MemoryStore::new();
        assert!(load_events(&storage).is_empty());

        let store = EventStore::new()
            .upsert(Some(date(2024, 3, 15)), "09:00", "Standup", None, 7)
            .unwrap();
        persist_events(&storage, &store).unwrap();

        assert_eq!(storage.len(), 1);
        assert_eq!(
            storage.get(STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"2024-03-15":[{"id":7,"time":"09:00","description":"Standup"}]}"#)
        );

        let emptied = store.remove(&DateKey::from_date(date(2024, 3, 15)), 7);
        persist_events(&storage, &emptied).unwrap();
        assert_eq!(storage.get(STORAGE_KEY).unwrap().as_deref(), Some("{}"));
    }
}

mod cli_tests {
    use super::*;

    #[test]
    fn shows_requested_month() {
        let temp = tempdir().unwrap();
        agenda(temp.path())
            .args(["show", "2", "2024"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Febrero 2024"))
            .stdout(predicate::str::contains(".29 .30 .31   1   2   3   4 "));
    }

    #[test]
    fn default_is_current_month() {
        let temp = tempdir().unwrap();
        agenda(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Febrero 2026"));
    }

    #[test]
    fn shift_navigates_months() {
        let temp = tempdir().unwrap();
        agenda(temp.path())
            .args(["show", "1", "2024", "--shift", "-1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Diciembre 2023"));
    }

    #[test]
    fn formats_dates() {
        let temp = tempdir().unwrap();
        agenda(temp.path())
            .args(["format", "2024-01-05", "--as", "european"])
            .assert()
            .success()
            .stdout("05/01/2024\n");
        agenda(temp.path())
            .args(["format", "05/01/2024"])
            .assert()
            .success()
            .stdout("Enero 2024\n");
    }

    #[test]
    fn add_edit_delete_flow() {
        let temp = tempdir().unwrap();

        agenda(temp.path())
            .args(["add", "2024-03-15", "09:00", "Daily", "standup"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Nuevo Evento - 15/03/2024"))
            .stdout(predicate::str::contains("09:00 - Daily standup"));

        let json = stored_json(temp.path());
        let id = json["2024-03-15"][0]["id"].as_i64().unwrap();
        assert_eq!(json["2024-03-15"][0]["description"], "Daily standup");

        agenda(temp.path())
            .args(["edit", "2024-03-15", &id.to_string(), "--date", "16/03/2024"])
            .args(["--time", "10:00"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Editar Evento - 16/03/2024"));

        let json = stored_json(temp.path());
        assert!(json.get("2024-03-15").is_none());
        assert_eq!(json["2024-03-16"][0]["id"].as_i64(), Some(id));
        assert_eq!(json["2024-03-16"][0]["time"], "10:00");

        agenda(temp.path())
            .args(["show", "3", "2024", "--select", "2024-03-16"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[16*"))
            .stdout(predicate::str::contains("10:00 - Daily standup"));

        agenda(temp.path())
            .args(["delete", "2024-03-16", &id.to_string()])
            .assert()
            .success();

        assert_eq!(stored_json(temp.path()), serde_json::json!({}));
    }

    #[test]
    fn empty_fields_save_nothing() {
        let temp = tempdir().unwrap();
        agenda(temp.path())
            .args(["add", "2024-03-15", "", "Standup"])
            .assert()
            .success();
        assert!(!temp.path().join(format!("{STORAGE_KEY}.json")).exists());
    }

    #[test]
    fn list_prints_day_events() {
        let temp = tempdir().unwrap();
        agenda(temp.path())
            .args(["add", "2024-03-15", "09:00", "Standup"])
            .assert()
            .success();
        agenda(temp.path())
            .args(["list", "15/03/2024"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("15/03/2024\n  09:00 - Standup ["));
    }

    #[test]
    fn delete_unknown_event_fails() {
        let temp = tempdir().unwrap();
        agenda(temp.path())
            .args(["delete", "2024-03-15", "42"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No event 42 on 2024-03-15"));
    }

    #[test]
    fn invalid_date_fails() {
        let temp = tempdir().unwrap();
        agenda(temp.path())
            .args(["add", "2024-02-30", "09:00", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid date: 2024-02-30"));
    }

    #[test]
    fn corrupt_store_still_shows_calendar() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(format!("{STORAGE_KEY}.json")), "garbage").unwrap();
        agenda(temp.path())
            .args(["show", "3", "2024"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Marzo 2024"));
    }
}
