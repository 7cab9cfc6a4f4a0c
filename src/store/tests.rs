use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tempfile::TempDir;

use super::*;

fn temp_dir() -> TempDir {
    TempDir::new().expect("temp dir should be created")
}

fn audit<'a>(target_db: &'a str) -> AuditContext<'a> {
    AuditContext {
        actor: "tester",
        target_db,
    }
}

fn string_fields(fields: &[(&str, &str)]) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn user_count(path: &Path) -> i64 {
    let conn = open_database(path).expect("user database should open");
    count_rows(&conn, "users").expect("users table should be countable")
}

#[test]
fn quote_identifier_is_idempotent() {
    for raw in [
        "qbank",
        "\"qbank\"",
        "'qbank'",
        "`qbank`",
        "[qbank]",
        "week day",
    ] {
        let once = quote_identifier(raw);
        assert_eq!(quote_identifier(&once), once);
    }

    assert_eq!(quote_identifier("users"), "\"users\"");
    assert_eq!(quote_identifier("\"users\""), "\"users\"");
}

#[test]
fn discover_on_empty_directory_returns_empty_lists() {
    let dir = temp_dir();

    let discovered = discover(dir.path()).expect("discovery should succeed on empty directory");
    assert_eq!(discovered.len(), ALL_CATEGORIES.len());
    for (_, databases) in discovered {
        assert!(databases.is_empty());
    }
}

#[test]
fn discover_fails_on_missing_directory() {
    let dir = temp_dir();
    let missing = dir.path().join("nowhere");

    assert!(matches!(
        discover(&missing),
        Err(StoreError::Io(_))
    ));
}

#[test]
fn create_database_applies_schema_and_is_discovered() {
    let dir = temp_dir();

    let report = create_database(dir.path(), Category::Qbank, "demo");
    assert!(report.success, "{}", report.message);

    let discovered = discover(dir.path()).expect("discovery should succeed");
    let (_, qbank_files) = discovered
        .into_iter()
        .find(|(category, _)| *category == Category::Qbank)
        .expect("qbank category should be listed");
    assert_eq!(qbank_files.len(), 1);
    assert_eq!(qbank_files[0].name, "demo_year");

    let conn = open_database(&dir.path().join("demo_year.db")).expect("database should open");
    assert!(table_exists(&conn, "qbank").expect("existence check should succeed"));
    assert_eq!(count_rows(&conn, "qbank").expect("count should succeed"), 0);
}

#[test]
fn create_database_rejects_existing_file() {
    let dir = temp_dir();

    let first = create_database(dir.path(), Category::Qbank, "demo");
    assert!(first.success);

    let second = create_database(dir.path(), Category::Qbank, "demo");
    assert!(!second.success);
    assert!(second.message.contains("already exists"));
}

#[test]
fn upload_missing_required_table_leaves_no_trace() {
    let dir = temp_dir();
    let staging = temp_dir();

    // A real SQLite file, but without the mcq_questions table.
    let source = staging.path().join("broken_mcq.db");
    let conn = Connection::open(&source).expect("staging database should open");
    conn.execute_batch("CREATE TABLE other (id INTEGER PRIMARY KEY)")
        .expect("staging table should be created");
    drop(conn);

    let report = upload_database(dir.path(), &source, None, Category::Mcq);
    assert!(!report.success);
    assert!(report.message.contains("mcq_questions"));
    assert!(!dir.path().join("broken_mcq.db").exists());
}

#[test]
fn upload_validates_and_keeps_good_file() {
    let dir = temp_dir();
    let staging = temp_dir();

    let created = create_database(staging.path(), Category::Mcq, "pharma");
    assert!(created.success);

    let report = upload_database(
        dir.path(),
        &staging.path().join("pharma_mcq.db"),
        None,
        Category::Mcq,
    );
    assert!(report.success, "{}", report.message);
    assert!(dir.path().join("pharma_mcq.db").exists());
}

#[test]
fn upload_rejects_wrong_extension_and_users_filename() {
    let dir = temp_dir();
    let staging = temp_dir();

    let source = staging.path().join("notes.txt");
    fs::write(&source, b"not a database").expect("staging file should be written");

    let report = upload_database(dir.path(), &source, None, Category::Qbank);
    assert!(!report.success);
    assert!(report.message.contains(".db extension"));

    let created = create_database(staging.path(), Category::Users, "ignored");
    assert!(created.success);

    let report = upload_database(
        dir.path(),
        &staging.path().join(USERS_DB_FILE),
        Some("other_users.db"),
        Category::Users,
    );
    assert!(!report.success);
    assert!(report.message.contains(USERS_DB_FILE));
}

#[test]
fn insert_drops_blank_fields_and_round_trips() {
    let dir = temp_dir();
    create_database(dir.path(), Category::Qbank, "demo");

    let conn = open_database(&dir.path().join("demo_year.db")).expect("database should open");
    let fields = string_fields(&[
        ("subject", "Anatomy"),
        ("topic", "Upper Limb"),
        ("question", "Name the contents of the carpal tunnel."),
        ("answer", "Four FDS, four FDP, FPL tendons and the median nerve."),
        ("chapter", ""),
    ]);

    let id = insert_row(&conn, "qbank", &fields, &audit("demo_year.db"))
        .expect("insert should succeed");

    let row = get_by_id(&conn, "qbank", id).expect("inserted row should be fetchable");
    assert_eq!(row["subject"], "Anatomy");
    assert_eq!(row["topic"], "Upper Limb");
    // Blank chapter was dropped before the insert, so the column default
    // (NULL) holds rather than an empty string.
    assert!(row["chapter"].is_null());
}

#[test]
fn insert_with_only_blank_fields_is_a_validation_error() {
    let dir = temp_dir();
    create_database(dir.path(), Category::Qbank, "demo");

    let conn = open_database(&dir.path().join("demo_year.db")).expect("database should open");
    let fields = string_fields(&[("subject", ""), ("topic", "  ")]);

    assert!(matches!(
        insert_row(&conn, "qbank", &fields, &audit("demo_year.db")),
        Err(StoreError::Validation(_))
    ));
}

#[test]
fn insert_rejects_unknown_column() {
    let dir = temp_dir();
    create_database(dir.path(), Category::Qbank, "demo");

    let conn = open_database(&dir.path().join("demo_year.db")).expect("database should open");
    let fields = string_fields(&[("subject", "Anatomy"), ("no_such_column", "x")]);

    assert!(matches!(
        insert_row(&conn, "qbank", &fields, &audit("demo_year.db")),
        Err(StoreError::Validation(_))
    ));
}

#[test]
fn update_on_missing_id_affects_zero_rows_without_error() {
    let dir = temp_dir();
    create_database(dir.path(), Category::Qbank, "demo");

    let conn = open_database(&dir.path().join("demo_year.db")).expect("database should open");
    let fields = string_fields(&[("subject", "Physiology")]);

    let affected = update_row(&conn, "qbank", 9999, &fields, &audit("demo_year.db"))
        .expect("update against a missing id should not error");
    assert_eq!(affected, 0);
}

#[test]
fn update_writes_blank_values_verbatim() {
    let dir = temp_dir();
    create_database(dir.path(), Category::Qbank, "demo");

    let conn = open_database(&dir.path().join("demo_year.db")).expect("database should open");
    let id = insert_row(
        &conn,
        "qbank",
        &string_fields(&[
            ("subject", "Anatomy"),
            ("topic", "Thorax"),
            ("question", "Q"),
            ("answer", "A"),
            ("chapter", "Mediastinum"),
        ]),
        &audit("demo_year.db"),
    )
    .expect("insert should succeed");

    let affected = update_row(
        &conn,
        "qbank",
        id,
        &string_fields(&[("chapter", "")]),
        &audit("demo_year.db"),
    )
    .expect("update should succeed");
    assert_eq!(affected, 1);

    let row = get_by_id(&conn, "qbank", id).expect("row should be fetchable");
    assert_eq!(row["chapter"], "");
}

#[test]
fn fetch_page_orders_by_id_descending() {
    let dir = temp_dir();
    create_database(dir.path(), Category::Qbank, "demo");

    let conn = open_database(&dir.path().join("demo_year.db")).expect("database should open");
    for index in 1..=5 {
        insert_row(
            &conn,
            "qbank",
            &string_fields(&[
                ("subject", "Anatomy"),
                ("topic", "Topic"),
                ("question", &format!("question {index}")),
                ("answer", "A"),
            ]),
            &audit("demo_year.db"),
        )
        .expect("insert should succeed");
    }

    let first_page = fetch_page(&conn, "qbank", 1, 2).expect("page should be fetched");
    assert_eq!(first_page.len(), 2);
    assert_eq!(first_page[0]["question"], "question 5");
    assert_eq!(first_page[1]["question"], "question 4");

    let third_page = fetch_page(&conn, "qbank", 3, 2).expect("page should be fetched");
    assert_eq!(third_page.len(), 1);
    assert_eq!(third_page[0]["question"], "question 1");
}

#[test]
fn get_by_id_reports_not_found() {
    let dir = temp_dir();
    create_database(dir.path(), Category::Qbank, "demo");

    let conn = open_database(&dir.path().join("demo_year.db")).expect("database should open");
    assert!(matches!(
        get_by_id(&conn, "qbank", 42),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        table_schema(&conn, "missing_table"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn list_tables_skips_sqlite_internals() {
    let dir = temp_dir();
    create_database(dir.path(), Category::Qbank, "demo");

    let conn = open_database(&dir.path().join("demo_year.db")).expect("database should open");
    insert_row(
        &conn,
        "qbank",
        &string_fields(&[
            ("subject", "Anatomy"),
            ("topic", "Topic"),
            ("question", "Q"),
            ("answer", "A"),
        ]),
        &audit("demo_year.db"),
    )
    .expect("insert should succeed");

    // The AUTOINCREMENT insert created sqlite_sequence; it must stay hidden.
    assert_eq!(
        list_tables(&conn).expect("tables should list"),
        vec!["qbank".to_string()]
    );
}

#[test]
fn mutations_append_audit_rows_when_audit_table_present() {
    let dir = temp_dir();
    create_database(dir.path(), Category::Admin, "system");

    let conn = open_database(&dir.path().join("admin_system.db")).expect("database should open");
    insert_row(
        &conn,
        "system_settings",
        &string_fields(&[("setting_key", "panel_title"), ("setting_value", "QBank")]),
        &audit("admin_system.db"),
    )
    .expect("insert should succeed");

    let audit_rows = fetch_page(&conn, "admin_actions", 1, 10).expect("audit should be readable");
    assert_eq!(audit_rows.len(), 1);
    assert_eq!(audit_rows[0]["actor"], "tester");
    assert_eq!(audit_rows[0]["action_type"], "INSERT");
    assert_eq!(audit_rows[0]["target_table"], "system_settings");
}

#[test]
fn resolve_db_path_strips_directories_and_lists_available() {
    let dir = temp_dir();
    create_database(dir.path(), Category::Qbank, "demo");

    let resolved = resolve_db_path(dir.path(), "/somewhere/else/demo_year.db")
        .expect("absolute input should re-root to the storage directory");
    assert_eq!(resolved, dir.path().join("demo_year.db"));

    let err = resolve_db_path(dir.path(), "../missing.db").expect_err("missing file should fail");
    match err {
        StoreError::NotFound(message) => {
            assert!(message.contains("missing.db"));
            assert!(message.contains("demo_year.db"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn delete_backs_up_byte_identical_copy_and_refuses_user_file() {
    let dir = temp_dir();
    create_database(dir.path(), Category::Qbank, "demo");

    let original = dir.path().join("demo_year.db");
    let conn = open_database(&original).expect("database should open");
    insert_row(
        &conn,
        "qbank",
        &string_fields(&[
            ("subject", "Anatomy"),
            ("topic", "Topic"),
            ("question", "Q"),
            ("answer", "A"),
        ]),
        &audit("demo_year.db"),
    )
    .expect("insert should succeed");
    drop(conn);

    let original_bytes = fs::read(&original).expect("original should be readable");

    let report = delete_database(dir.path(), "demo_year.db");
    assert!(report.success, "{}", report.message);
    assert!(!original.exists());

    let backups_root = dir.path().join("deleted_backups");
    let timestamp_dir = fs::read_dir(&backups_root)
        .expect("backup root should exist")
        .next()
        .expect("one backup directory should exist")
        .expect("backup directory entry should be readable")
        .path();
    let backup_bytes = fs::read(timestamp_dir.join("demo_year.db"))
        .expect("backup copy should be readable");
    assert_eq!(backup_bytes, original_bytes);

    create_database(dir.path(), Category::Users, "centralized");
    let refused = delete_database(dir.path(), USERS_DB_FILE);
    assert!(!refused.success);
    assert!(dir.path().join(USERS_DB_FILE).exists());
}

#[test]
fn backup_all_copies_discovered_files_into_category_tree() {
    let dir = temp_dir();
    let backup_root = temp_dir();
    create_database(dir.path(), Category::Qbank, "demo");
    create_database(dir.path(), Category::Mcq, "pharma");

    let report = backup_all(dir.path(), backup_root.path());
    assert!(report.success, "{}", report.message);
    assert_eq!(report.files_copied, 2);

    let timestamp_dir = fs::read_dir(backup_root.path())
        .expect("backup root should exist")
        .next()
        .expect("one backup directory should exist")
        .expect("backup directory entry should be readable")
        .path();
    assert!(timestamp_dir.join("qbank").join("demo_year.db").exists());
    assert!(timestamp_dir.join("mcq").join("pharma_mcq.db").exists());
}

fn create_legacy_qbank_source(data_dir: &Path, filename: &str) {
    let conn = Connection::open(data_dir.join(filename)).expect("source should open");
    conn.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT,
            email TEXT,
            password TEXT,
            created_at TIMESTAMP
        );
        CREATE TABLE bookmarks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER,
            question_id INTEGER,
            subject TEXT,
            topic TEXT,
            created_at TIMESTAMP
        );",
    )
    .expect("legacy tables should be created");

    conn.execute_batch(
        "INSERT INTO users (username, email, password, created_at)
         VALUES ('alpha', 'alpha@example.com', 'hash-a', '2024-01-01 00:00:00');
         INSERT INTO users (username, email, password, created_at)
         VALUES ('beta', 'beta@example.com', 'hash-b', '2024-01-02 00:00:00');
         INSERT INTO bookmarks (user_id, question_id, subject, topic, created_at)
         VALUES (1, 7, 'Anatomy', 'Thorax', '2024-02-01 00:00:00');",
    )
    .expect("legacy rows should be inserted");
}

#[test]
fn migrating_twice_does_not_duplicate_users() {
    let dir = temp_dir();
    create_legacy_qbank_source(dir.path(), "legacy_year.db");

    let first = migrate_users(dir.path());
    assert!(first.success, "{}", first.message);
    assert_eq!(first.users_migrated, 2);
    assert_eq!(first.bookmarks_migrated, 1);

    let canonical = dir.path().join(USERS_DB_FILE);
    assert_eq!(user_count(&canonical), 2);

    let second = migrate_users(dir.path());
    assert!(second.success, "{}", second.message);
    assert_eq!(second.users_migrated, 0);
    assert_eq!(user_count(&canonical), 2);
}

#[test]
fn migration_tags_bookmarks_with_source_database() {
    let dir = temp_dir();
    create_legacy_qbank_source(dir.path(), "legacy_year.db");

    let report = migrate_users(dir.path());
    assert!(report.success, "{}", report.message);

    let conn = open_database(&dir.path().join(USERS_DB_FILE)).expect("canonical should open");
    let bookmarks = fetch_page(&conn, "user_bookmarks", 1, 10).expect("bookmarks should read");
    assert_eq!(bookmarks.len(), 1);
    let source = bookmarks[0]["source_database"]
        .as_str()
        .expect("source attribution should be text");
    assert!(source.ends_with("legacy_year.db"));
}

#[test]
fn startup_seed_is_idempotent() {
    let dir = temp_dir();

    let first = run_startup_seed(dir.path());
    assert!(first.success);
    assert!(first.warnings.is_empty(), "{:?}", first.warnings);

    let canonical = dir.path().join(USERS_DB_FILE);
    assert!(canonical.exists());
    assert!(dir.path().join("1st_year.db").exists());
    assert!(dir.path().join("anatomy_mcq.db").exists());
    assert!(dir.path().join("physiology_mcq.db").exists());
    assert_eq!(user_count(&canonical), 2);

    let second = run_startup_seed(dir.path());
    assert!(second.success);
    assert!(second.steps.is_empty(), "{:?}", second.steps);
    assert_eq!(user_count(&canonical), 2);
}

#[test]
fn startup_seed_upgrades_older_user_schema() {
    let dir = temp_dir();
    fs::create_dir_all(dir.path()).expect("data dir should exist");

    // A minimal users file from an earlier deployment.
    let canonical = dir.path().join(USERS_DB_FILE);
    let conn = Connection::open(&canonical).expect("user database should open");
    conn.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );",
    )
    .expect("old schema should be created");
    drop(conn);

    let report = run_startup_seed(dir.path());
    assert!(report.success);
    assert!(
        report
            .steps
            .iter()
            .any(|step| step.contains("user_type")),
        "{:?}",
        report.steps
    );
    assert!(
        report
            .steps
            .iter()
            .any(|step| step.contains("administrator")),
        "{:?}",
        report.steps
    );

    let conn = open_database(&canonical).expect("user database should reopen");
    let columns = table_schema(&conn, "users").expect("schema should read");
    let names: Vec<&str> = columns.iter().map(|column| column.name.as_str()).collect();
    for required in [
        "first_name",
        "last_name",
        "year_of_study",
        "college",
        "user_type",
        "is_active",
        "last_login",
    ] {
        assert!(names.contains(&required), "missing column {required}");
    }
}

#[test]
fn category_filenames_match_their_own_patterns() {
    for category in ALL_CATEGORIES {
        let filename = category.create_filename("demo");
        let pattern = category
            .pattern_regex()
            .expect("pattern should compile");
        assert!(
            pattern.is_match(&filename),
            "{} does not match {}",
            filename,
            category.pattern()
        );
    }
}
