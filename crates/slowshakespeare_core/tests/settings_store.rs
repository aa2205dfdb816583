use chrono::NaiveDate;
use rusqlite::Connection;
use slowshakespeare_core::db::migrations::latest_version;
use slowshakespeare_core::db::{open_db, open_db_in_memory, DbError};
use slowshakespeare_core::{
    ProgressService, ServiceError, Settings, SettingsPatch, SettingsRepository,
    SqliteSettingsRepository, SETTINGS_STORAGE_KEY,
};
use url::Url;

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "settings");
}

#[test]
fn opening_same_store_twice_keeps_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slowshakespeare.sqlite3");

    let first = open_db(&path).unwrap();
    ProgressService::new(SqliteSettingsRepository::new(&first))
        .update_settings(
            date("2025-06-15"),
            &SettingsPatch {
                sonnet: Some("104".to_string()),
                ..SettingsPatch::default()
            },
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let settings = ProgressService::new(SqliteSettingsRepository::new(&second))
        .load_settings(date("2025-07-01"))
        .unwrap();
    assert_eq!(settings.sonnet, "104");
    assert_eq!(settings.start_date, date("2025-06-15"));
}

#[test]
fn opening_store_with_newer_schema_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_record_loads_defaults_for_today() {
    let conn = open_db_in_memory().unwrap();
    let service = ProgressService::new(SqliteSettingsRepository::new(&conn));
    let settings = service.load_settings(date("2025-06-15")).unwrap();
    assert_eq!(settings, Settings::defaults(date("2025-06-15")));
}

#[test]
fn corrupted_record_is_recovered_field_by_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);
    repo.save_raw(
        SETTINGS_STORAGE_KEY,
        r#"{"sonnet":"404","startDate":"2025-05-01","showLines":false}"#,
    )
    .unwrap();

    let service = ProgressService::new(repo);
    let settings = service.load_settings(date("2025-06-15")).unwrap();
    assert_eq!(settings.sonnet, "18");
    assert_eq!(settings.start_date, date("2025-05-01"));
    assert!(!settings.show_lines);
}

#[test]
fn wrongly_typed_field_keeps_the_valid_ones() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);
    repo.save_raw(
        SETTINGS_STORAGE_KEY,
        r#"{"sonnet":"116","startDate":"2025-05-01","color":"ink","showLines":"yes","selfTest":1}"#,
    )
    .unwrap();

    let service = ProgressService::new(repo);
    let settings = service.load_settings(date("2025-06-15")).unwrap();
    assert_eq!(settings.sonnet, "116");
    assert_eq!(settings.start_date, date("2025-05-01"));
    assert_eq!(settings.color, "ink");
    assert!(settings.show_lines);
    assert!(!settings.self_test);
}

#[test]
fn numeric_sonnet_id_is_read_as_text() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);
    repo.save_raw(
        SETTINGS_STORAGE_KEY,
        r#"{"sonnet":116,"startDate":"2025-05-01"}"#,
    )
    .unwrap();

    let service = ProgressService::new(repo);
    let settings = service.load_settings(date("2025-06-15")).unwrap();
    assert_eq!(settings.sonnet, "116");
    assert_eq!(settings.start_date, date("2025-05-01"));
}

#[test]
fn show_lines_and_self_test_are_stored_independently() {
    let conn = open_db_in_memory().unwrap();
    let service = ProgressService::new(SqliteSettingsRepository::new(&conn));
    let today = date("2025-06-15");

    service
        .update_settings(
            today,
            &SettingsPatch {
                self_test: Some(true),
                ..SettingsPatch::default()
            },
        )
        .unwrap();
    let stored = service.load_settings(today).unwrap();
    assert!(stored.self_test);
    assert!(stored.show_lines);

    service
        .update_settings(
            today,
            &SettingsPatch {
                show_lines: Some(false),
                ..SettingsPatch::default()
            },
        )
        .unwrap();
    let stored = service.load_settings(today).unwrap();
    assert!(stored.self_test);
    assert!(!stored.show_lines);

    let raw = SqliteSettingsRepository::new(&conn)
        .load_raw(SETTINGS_STORAGE_KEY)
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["showLines"], false);
    assert_eq!(value["selfTest"], true);
}

#[test]
fn save_rejects_unknown_sonnet_and_blank_color() {
    let conn = open_db_in_memory().unwrap();
    let service = ProgressService::new(SqliteSettingsRepository::new(&conn));
    let today = date("2025-06-15");

    let err = service
        .update_settings(
            today,
            &SettingsPatch {
                sonnet: Some("17".to_string()),
                ..SettingsPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownSonnet(id) if id == "17"));

    let err = service
        .update_settings(
            today,
            &SettingsPatch {
                color: Some("   ".to_string()),
                ..SettingsPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::BlankColor));

    assert_eq!(
        SqliteSettingsRepository::new(&conn)
            .load_raw(SETTINGS_STORAGE_KEY)
            .unwrap(),
        None
    );
}

#[test]
fn today_view_reflects_auto_advance_without_rewriting_stored_sonnet() {
    let conn = open_db_in_memory().unwrap();
    let service = ProgressService::new(SqliteSettingsRepository::new(&conn));
    service
        .update_settings(
            date("2025-06-15"),
            &SettingsPatch {
                sonnet: Some("18".to_string()),
                start_date: Some(date("2025-06-01")),
                ..SettingsPatch::default()
            },
        )
        .unwrap();

    let view = service.today_view(date("2025-06-15")).unwrap();
    assert_eq!(view.selected_sonnet, "29");
    assert_eq!(view.progress.lines_revealed, 1);
    assert_eq!(
        view.lines,
        vec!["When, in disgrace with fortune and men's eyes,".to_string()]
    );
    assert!(view.recovery.is_clean());

    let stored = service.load_settings(date("2025-06-15")).unwrap();
    assert_eq!(stored.sonnet, "18");

    let later = service.today_view(date("2025-06-16")).unwrap();
    assert_eq!(later.selected_sonnet, "29");
    assert_eq!(later.lines.len(), 2);
}

#[test]
fn import_link_persists_applied_values() {
    let conn = open_db_in_memory().unwrap();
    let service = ProgressService::new(SqliteSettingsRepository::new(&conn));
    let link =
        Url::parse("https://example.org/app.html?sonnet=130&start=2025-06-08&lines=off").unwrap();

    let (settings, applied) = service.import_link(date("2025-06-15"), &link).unwrap();
    assert_eq!(applied, 3);
    assert_eq!(settings.sonnet, "130");

    let view = service.today_view(date("2025-06-15")).unwrap();
    assert_eq!(view.progress.lines_revealed, 8);
    assert!(!view.settings.show_lines);
}

#[test]
fn import_link_without_valid_values_does_not_write() {
    let conn = open_db_in_memory().unwrap();
    let service = ProgressService::new(SqliteSettingsRepository::new(&conn));
    let link = Url::parse("https://example.org/app.html?sonnet=nope").unwrap();

    let (_, applied) = service.import_link(date("2025-06-15"), &link).unwrap();
    assert_eq!(applied, 0);
    assert_eq!(
        SqliteSettingsRepository::new(&conn)
            .load_raw(SETTINGS_STORAGE_KEY)
            .unwrap(),
        None
    );
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
