use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, params};
use tracing::{info, warn};

use super::catalog::{Category, USERS_DB_FILE};
use super::connect::{open_database, table_exists};
use super::discovery::discover_category;
use super::lifecycle::create_database;
use crate::model::MigrationReport;

/// Consolidates user rows scattered across qbank databases into the
/// centralized user file. Keyed on the email uniqueness constraint:
/// duplicates are silently skipped, so running the migration twice changes
/// nothing. Legacy bookmark rows ride along, tagged with the path of the
/// file they came from. Per-row and per-file failures become warnings; they
/// never abort the sweep.
pub fn migrate_users(data_dir: &Path) -> MigrationReport {
    let canonical_path = data_dir.join(USERS_DB_FILE);
    if !canonical_path.exists() {
        let created = create_database(data_dir, Category::Users, "centralized");
        if !created.success {
            return failure(format!(
                "failed to create centralized user database: {}",
                created.message
            ));
        }
    }

    let central = match open_database(&canonical_path) {
        Ok(conn) => conn,
        Err(err) => return failure(format!("migration failed: {err}")),
    };

    let sources = match discover_category(data_dir, Category::Qbank) {
        Ok(sources) => sources,
        Err(err) => return failure(format!("migration failed: {err}")),
    };

    let mut users_migrated = 0;
    let mut bookmarks_migrated = 0;
    let mut warnings = Vec::new();

    for source in sources {
        match migrate_source(&central, &source.file) {
            Ok(counts) => {
                users_migrated += counts.users;
                bookmarks_migrated += counts.bookmarks;
                warnings.extend(counts.warnings);
            }
            Err(err) => {
                warn!(source = %source.file, error = %err, "skipping source database");
                warnings.push(format!("error migrating from {}: {err}", source.file));
            }
        }
    }

    record_migration(&central, users_migrated, &mut warnings);

    info!(
        users_migrated,
        bookmarks_migrated,
        warning_count = warnings.len(),
        "user consolidation complete"
    );

    MigrationReport {
        success: true,
        message: format!(
            "successfully migrated {users_migrated} user records to {USERS_DB_FILE}"
        ),
        users_migrated,
        bookmarks_migrated,
        warnings,
    }
}

struct SourceCounts {
    users: usize,
    bookmarks: usize,
    warnings: Vec<String>,
}

fn migrate_source(central: &Connection, source_file: &str) -> super::StoreResult<SourceCounts> {
    let mut counts = SourceCounts {
        users: 0,
        bookmarks: 0,
        warnings: Vec::new(),
    };

    let source = open_database(Path::new(source_file))?;

    if !table_exists(&source, "users")? {
        return Ok(counts);
    }

    let mut statement =
        source.prepare("SELECT username, email, password, created_at FROM users")?;
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let username: Value = row.get(0)?;
        let email: Value = row.get(1)?;
        let password: Value = row.get(2)?;
        let created_at: Value = row.get(3)?;

        match central.execute(
            "INSERT OR IGNORE INTO users (username, email, password, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![username, email, password, created_at],
        ) {
            Ok(inserted) => counts.users += inserted,
            Err(err) => counts
                .warnings
                .push(format!("user migration error in {source_file}: {err}")),
        }
    }

    if table_exists(&source, "bookmarks")? {
        let mut statement = source
            .prepare("SELECT user_id, question_id, subject, topic, created_at FROM bookmarks")?;
        let mut rows = statement.query([])?;
        while let Some(row) = rows.next()? {
            let user_id: Value = row.get(0)?;
            let question_id: Value = row.get(1)?;
            let subject: Value = row.get(2)?;
            let topic: Value = row.get(3)?;
            let created_at: Value = row.get(4)?;

            match central.execute(
                "INSERT OR IGNORE INTO user_bookmarks
                 (user_id, question_id, subject, topic, source_database, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![user_id, question_id, subject, topic, source_file, created_at],
            ) {
                Ok(inserted) => counts.bookmarks += inserted,
                Err(err) => counts
                    .warnings
                    .push(format!("bookmark migration error in {source_file}: {err}")),
            }
        }
    }

    Ok(counts)
}

/// Records a summary row when the canonical file carries the migration
/// ledger table. Absence of the table is not an error.
fn record_migration(central: &Connection, users_migrated: usize, warnings: &mut Vec<String>) {
    let result = table_exists(central, "database_migrations").and_then(|present| {
        if !present {
            return Ok(());
        }
        central
            .execute(
                "INSERT INTO database_migrations
                 (migration_name, source_database, target_database, records_migrated, status)
                 VALUES ('user_consolidation', 'qbank', ?1, ?2, 'completed')",
                params![USERS_DB_FILE, users_migrated as i64],
            )
            .map(|_| ())
            .map_err(Into::into)
    });

    if let Err(err) = result {
        warn!(error = %err, "failed to record migration summary");
        warnings.push(format!("failed to record migration summary: {err}"));
    }
}

fn failure(message: String) -> MigrationReport {
    MigrationReport {
        success: false,
        message,
        users_migrated: 0,
        bookmarks_migrated: 0,
        warnings: Vec::new(),
    }
}
