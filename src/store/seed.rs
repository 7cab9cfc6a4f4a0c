use std::fs;
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{info, warn};

use super::catalog::{CREATE_ADMIN_ACTIONS_TABLE_SQL, Category, USERS_DB_FILE};
use super::connect::{open_database, table_exists};
use super::{StoreError, StoreResult};
use crate::model::SeedReport;
use crate::util::hash_password;

const ADMIN_SEED_EMAIL: &str = "admin@mbbsqbank.com";
const ADMIN_SEED_USERNAME: &str = "admin";
const ADMIN_SEED_PASSWORD: &str = "admin123";

const STUDENT_SEED_EMAIL: &str = "student@mbbsqbank.com";
const STUDENT_SEED_USERNAME: &str = "student";
const STUDENT_SEED_PASSWORD: &str = "student123";

/// Historical locations of the user database from before storage moved into
/// the configured data directory. Users found there are merged into the
/// canonical file at startup.
const LEGACY_USER_DB_LOCATIONS: &[&str] = &["admin_users.db", "instance/admin_users.db"];

/// Column definitions the canonical `users` table must carry. Files created
/// by older deployments are upgraded in place.
const REQUIRED_USER_COLUMNS: &[&str] = &[
    "first_name TEXT",
    "last_name TEXT",
    "year_of_study TEXT DEFAULT '1st'",
    "college TEXT",
    "user_type TEXT DEFAULT 'student'",
    "is_active INTEGER DEFAULT 1",
    "last_login TIMESTAMP",
];

/// Idempotent startup initialization: every creation step checks existence
/// first and is a no-op when the target is already in place.
pub fn run_startup_seed(data_dir: &Path) -> SeedReport {
    let mut steps = Vec::new();
    let mut warnings = Vec::new();

    if let Err(err) = fs::create_dir_all(data_dir) {
        return SeedReport {
            success: false,
            data_dir: data_dir.display().to_string(),
            steps,
            warnings: vec![format!("failed to create storage directory: {err}")],
        };
    }

    let canonical_path = data_dir.join(USERS_DB_FILE);
    if canonical_path.exists() {
        match repair_user_database(&canonical_path) {
            Ok(repair_steps) => steps.extend(repair_steps),
            Err(err) => warnings.push(format!("failed to upgrade {USERS_DB_FILE}: {err}")),
        }
    } else {
        match create_user_database(&canonical_path) {
            Ok(create_steps) => steps.extend(create_steps),
            Err(err) => {
                if canonical_path.exists() {
                    if let Err(cleanup_err) = fs::remove_file(&canonical_path) {
                        warn!(error = %cleanup_err, "failed to remove partial user database");
                    }
                }
                warnings.push(format!("failed to create {USERS_DB_FILE}: {err}"));
            }
        }
    }

    for location in LEGACY_USER_DB_LOCATIONS {
        let legacy_path = Path::new(location);
        if !legacy_path.exists() {
            continue;
        }
        if let (Ok(legacy), Ok(canonical)) =
            (legacy_path.canonicalize(), canonical_path.canonicalize())
        {
            if legacy == canonical {
                continue;
            }
        }

        match merge_legacy_users(legacy_path, &canonical_path) {
            Ok(merged) => steps.push(format!("merged {merged} users from legacy {location}")),
            Err(err) => warnings.push(format!("failed to merge legacy {location}: {err}")),
        }
    }

    seed_content_database(
        data_dir,
        "1st_year.db",
        Category::Qbank,
        insert_qbank_seed_rows,
        &mut steps,
        &mut warnings,
    );
    seed_content_database(
        data_dir,
        "anatomy_mcq.db",
        Category::Mcq,
        insert_anatomy_mcq_seed_rows,
        &mut steps,
        &mut warnings,
    );
    seed_content_database(
        data_dir,
        "physiology_mcq.db",
        Category::Mcq,
        insert_physiology_mcq_seed_rows,
        &mut steps,
        &mut warnings,
    );

    let success = canonical_path.exists();
    info!(
        data_dir = %data_dir.display(),
        step_count = steps.len(),
        warning_count = warnings.len(),
        success,
        "startup seeding complete"
    );

    SeedReport {
        success,
        data_dir: data_dir.display().to_string(),
        steps,
        warnings,
    }
}

fn create_user_database(path: &Path) -> StoreResult<Vec<String>> {
    let conn = open_database(path)?;
    for (_, create_sql) in Category::Users.schema() {
        conn.execute_batch(create_sql)?;
    }
    // Edits to the user file itself are audited like any other database.
    conn.execute_batch(CREATE_ADMIN_ACTIONS_TABLE_SQL)?;

    ensure_account(
        &conn,
        ADMIN_SEED_USERNAME,
        ADMIN_SEED_EMAIL,
        ADMIN_SEED_PASSWORD,
        "admin",
    )?;
    ensure_account(
        &conn,
        STUDENT_SEED_USERNAME,
        STUDENT_SEED_EMAIL,
        STUDENT_SEED_PASSWORD,
        "student",
    )?;

    Ok(vec![
        format!("created {USERS_DB_FILE} with centralized user schema"),
        "seeded default administrator and student accounts".to_string(),
    ])
}

fn repair_user_database(path: &Path) -> StoreResult<Vec<String>> {
    let conn = open_database(path)?;
    let mut steps = Vec::new();

    for definition in REQUIRED_USER_COLUMNS {
        if ensure_column_exists(&conn, "users", definition)? {
            let column_name = definition.split_whitespace().next().unwrap_or(definition);
            steps.push(format!("added missing users column: {column_name}"));
        }
    }

    if ensure_account(
        &conn,
        ADMIN_SEED_USERNAME,
        ADMIN_SEED_EMAIL,
        ADMIN_SEED_PASSWORD,
        "admin",
    )? {
        steps.push("restored missing administrator account".to_string());
    }

    Ok(steps)
}

/// Adds a column when `PRAGMA table_info` does not already list it. The
/// column name is the first token of the definition.
fn ensure_column_exists(
    conn: &Connection,
    table: &str,
    column_definition: &str,
) -> StoreResult<bool> {
    let Some(column_name) = column_definition.split_whitespace().next() else {
        return Err(StoreError::Validation(format!(
            "invalid column definition: {column_definition}"
        )));
    };

    let mut statement = conn.prepare(&format!("PRAGMA table_info(\"{table}\")"))?;
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let existing_name: String = row.get(1)?;
        if existing_name == column_name {
            return Ok(false);
        }
    }

    conn.execute(
        &format!("ALTER TABLE \"{table}\" ADD COLUMN {column_definition}"),
        [],
    )?;

    Ok(true)
}

/// Inserts a seed account unless a row with that email already exists.
fn ensure_account(
    conn: &Connection,
    username: &str,
    email: &str,
    password_plain: &str,
    user_type: &str,
) -> StoreResult<bool> {
    let existing = conn
        .query_row(
            "SELECT id FROM users WHERE email = ?1",
            params![email],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    if existing.is_some() {
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO users (username, email, password, user_type) VALUES (?1, ?2, ?3, ?4)",
        params![username, email, hash_password(password_plain), user_type],
    )?;

    Ok(true)
}

fn merge_legacy_users(legacy_path: &Path, canonical_path: &Path) -> StoreResult<usize> {
    let source = open_database(legacy_path)?;
    if !table_exists(&source, "users")? {
        return Ok(0);
    }

    let central = open_database(canonical_path)?;

    let mut statement =
        source.prepare("SELECT username, email, password, created_at FROM users")?;
    let mut rows = statement.query([])?;
    let mut merged = 0;

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
            Ok(inserted) => merged += inserted,
            Err(err) => warn!(
                legacy = %legacy_path.display(),
                error = %err,
                "skipping legacy user row"
            ),
        }
    }

    Ok(merged)
}

fn seed_content_database(
    data_dir: &Path,
    filename: &str,
    category: Category,
    insert_seed_rows: fn(&Connection) -> rusqlite::Result<()>,
    steps: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let path = data_dir.join(filename);
    if path.exists() {
        return;
    }

    let result: StoreResult<()> = (|| {
        let conn = open_database(&path)?;
        for (_, create_sql) in category.schema() {
            conn.execute_batch(create_sql)?;
        }
        insert_seed_rows(&conn)?;
        Ok(())
    })();

    match result {
        Ok(()) => steps.push(format!("seeded content database {filename}")),
        Err(err) => {
            warnings.push(format!("failed to seed {filename}: {err}"));
            if path.exists() {
                if let Err(cleanup_err) = fs::remove_file(&path) {
                    warn!(
                        path = %path.display(),
                        error = %cleanup_err,
                        "failed to remove partial content database"
                    );
                }
            }
        }
    }
}

fn insert_qbank_seed_rows(conn: &Connection) -> rusqlite::Result<()> {
    let rows = [
        (
            "Anatomy",
            "Upper Limb",
            "Which nerve winds around the surgical neck of the humerus?",
            "The axillary nerve, accompanied by the posterior circumflex humeral artery.",
        ),
        (
            "Physiology",
            "Cardiovascular System",
            "What is the normal duration of the PR interval on an ECG?",
            "0.12 to 0.20 seconds.",
        ),
        (
            "Biochemistry",
            "Carbohydrate Metabolism",
            "Which enzyme catalyzes the rate-limiting step of glycolysis?",
            "Phosphofructokinase-1.",
        ),
    ];

    for (subject, topic, question, answer) in rows {
        conn.execute(
            "INSERT INTO qbank (subject, topic, question, answer) VALUES (?1, ?2, ?3, ?4)",
            params![subject, topic, question, answer],
        )?;
    }

    Ok(())
}

fn insert_anatomy_mcq_seed_rows(conn: &Connection) -> rusqlite::Result<()> {
    let rows = [
        (
            "Anatomy",
            "Thorax",
            "Which rib articulates with the sternum at the sternal angle?",
            "First rib",
            "Second rib",
            "Third rib",
            "Fourth rib",
            "b",
        ),
        (
            "Anatomy",
            "Abdomen",
            "At which vertebral level does the aorta pass through the diaphragm?",
            "T8",
            "T10",
            "T12",
            "L2",
            "c",
        ),
    ];

    for (subject, topic, question, option_a, option_b, option_c, option_d, correct) in rows {
        conn.execute(
            "INSERT INTO mcq_questions
             (subject, topic, question, option_a, option_b, option_c, option_d, correct_answer)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![subject, topic, question, option_a, option_b, option_c, option_d, correct],
        )?;
    }

    Ok(())
}

fn insert_physiology_mcq_seed_rows(conn: &Connection) -> rusqlite::Result<()> {
    let rows = [
        (
            "Physiology",
            "Renal System",
            "Which segment of the nephron reabsorbs the largest fraction of filtered sodium?",
            "Proximal convoluted tubule",
            "Loop of Henle",
            "Distal convoluted tubule",
            "Collecting duct",
            "a",
        ),
        (
            "Physiology",
            "Respiratory System",
            "Which receptors are primarily stimulated by a fall in arterial oxygen tension?",
            "Central chemoreceptors",
            "Peripheral chemoreceptors",
            "Pulmonary stretch receptors",
            "Irritant receptors",
            "b",
        ),
    ];

    for (subject, topic, question, option_a, option_b, option_c, option_d, correct) in rows {
        conn.execute(
            "INSERT INTO mcq_questions
             (subject, topic, question, option_a, option_b, option_c, option_d, correct_answer)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![subject, topic, question, option_a, option_b, option_c, option_d, correct],
        )?;
    }

    Ok(())
}
