use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::catalog::{Category, USERS_DB_FILE};
use super::connect::{open_database, resolve_db_path, table_exists};
use super::discovery::discover;
use super::{StoreError, StoreResult};
use crate::model::{BackupReport, OpReport};
use crate::util::backup_timestamp;

/// Creates a fresh database of the given category and applies its full DDL
/// bundle. The filename is derived by category convention; an existing file
/// is a conflict, never overwritten.
pub fn create_database(data_dir: &Path, category: Category, base_name: &str) -> OpReport {
    match try_create(data_dir, category, base_name) {
        Ok(filename) => {
            info!(
                category = category.as_str(),
                filename = %filename,
                "database created"
            );
            OpReport::ok(format!("database {filename} created successfully"))
        }
        Err(err) => OpReport::failure(format!("error creating database: {err}")),
    }
}

fn try_create(data_dir: &Path, category: Category, base_name: &str) -> StoreResult<String> {
    let base_name = base_name.trim();
    if base_name.is_empty() {
        return Err(StoreError::Validation("database name is required".to_string()));
    }

    let filename = category.create_filename(base_name);
    let full_path = data_dir.join(&filename);
    if full_path.exists() {
        return Err(StoreError::Conflict(format!(
            "database {filename} already exists"
        )));
    }

    fs::create_dir_all(data_dir)?;

    let conn = open_database(&full_path)?;
    for (_, create_sql) in category.schema() {
        conn.execute_batch(create_sql)?;
    }

    Ok(filename)
}

/// Persists an uploaded file into storage and validates it carries every
/// table its declared category requires. A file that fails validation is
/// removed again; a failed upload leaves no trace.
pub fn upload_database(
    data_dir: &Path,
    source: &Path,
    declared_filename: Option<&str>,
    category: Category,
) -> OpReport {
    match try_upload(data_dir, source, declared_filename, category) {
        Ok(filename) => {
            info!(
                category = category.as_str(),
                filename = %filename,
                "database uploaded"
            );
            OpReport::ok(format!("database {filename} uploaded successfully"))
        }
        Err(err) => OpReport::failure(format!("error uploading database: {err}")),
    }
}

fn try_upload(
    data_dir: &Path,
    source: &Path,
    declared_filename: Option<&str>,
    category: Category,
) -> StoreResult<String> {
    let declared = match declared_filename {
        Some(name) => name.to_string(),
        None => source
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string(),
    };

    // Uploads are addressed by base name only; path components are dropped.
    let filename = Path::new(&declared)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();

    if filename.is_empty() {
        return Err(StoreError::Validation("no file selected".to_string()));
    }
    if !filename.to_lowercase().ends_with(".db") {
        return Err(StoreError::Validation(
            "file must have .db extension".to_string(),
        ));
    }
    if category == Category::Users && filename != USERS_DB_FILE {
        return Err(StoreError::Validation(format!(
            "user database must be named '{USERS_DB_FILE}'"
        )));
    }

    let full_path = data_dir.join(&filename);
    if full_path.exists() {
        return Err(StoreError::Conflict(format!(
            "database {filename} already exists"
        )));
    }

    fs::create_dir_all(data_dir)?;
    fs::copy(source, &full_path)?;

    if let Err(err) = verify_required_tables(&full_path, category) {
        if let Err(cleanup_err) = fs::remove_file(&full_path) {
            warn!(
                path = %full_path.display(),
                error = %cleanup_err,
                "failed to remove rejected upload"
            );
        }
        return Err(err);
    }

    Ok(filename)
}

fn verify_required_tables(path: &Path, category: Category) -> StoreResult<()> {
    let conn = open_database(path)?;

    for table in category.required_tables() {
        if !table_exists(&conn, table)? {
            return Err(StoreError::Validation(format!(
                "database missing required table: {table}"
            )));
        }
    }

    Ok(())
}

/// Deletes a database after copying it into a timestamped backup directory
/// under the storage directory. The centralized user file is never deleted.
pub fn delete_database(data_dir: &Path, db_file: &str) -> OpReport {
    match try_delete(data_dir, db_file) {
        Ok((filename, backup_dir)) => {
            info!(
                filename = %filename,
                backup_dir = %backup_dir.display(),
                "database deleted"
            );
            OpReport::ok(format!(
                "database {filename} deleted; backup saved to {}",
                backup_dir.display()
            ))
        }
        Err(err) => OpReport::failure(format!("error deleting database: {err}")),
    }
}

fn try_delete(data_dir: &Path, db_file: &str) -> StoreResult<(String, PathBuf)> {
    let base_name = Path::new(db_file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();

    if base_name == USERS_DB_FILE {
        return Err(StoreError::Validation(
            "cannot delete the centralized user database".to_string(),
        ));
    }

    let full_path = resolve_db_path(data_dir, db_file)?;

    let backup_dir = data_dir.join("deleted_backups").join(backup_timestamp());
    fs::create_dir_all(&backup_dir)?;
    fs::copy(&full_path, backup_dir.join(&base_name))?;
    fs::remove_file(&full_path)?;

    Ok((base_name, backup_dir))
}

/// Copies every discovered database into a fresh timestamped directory tree
/// under the backup root, one subdirectory per category. Per-file copy
/// failures are collected as warnings rather than aborting the sweep.
pub fn backup_all(data_dir: &Path, backup_root: &Path) -> BackupReport {
    let backup_dir = backup_root.join(backup_timestamp());

    let discovered = match discover(data_dir) {
        Ok(discovered) => discovered,
        Err(err) => {
            return BackupReport {
                success: false,
                message: format!("backup failed: {err}"),
                backup_dir: backup_dir.display().to_string(),
                files_copied: 0,
                warnings: Vec::new(),
            };
        }
    };

    let mut files_copied = 0;
    let mut warnings = Vec::new();

    for (category, databases) in discovered {
        if databases.is_empty() {
            continue;
        }

        let category_dir = backup_dir.join(category.as_str());
        if let Err(err) = fs::create_dir_all(&category_dir) {
            warnings.push(format!(
                "failed to create backup directory {}: {err}",
                category_dir.display()
            ));
            continue;
        }

        for database in databases {
            let source = PathBuf::from(&database.file);
            let file_name = source
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_else(|| database.name.clone().into());
            let destination = category_dir.join(file_name);

            match fs::copy(&source, &destination) {
                Ok(_) => files_copied += 1,
                Err(err) => warnings.push(format!(
                    "failed to back up {}: {err}",
                    source.display()
                )),
            }
        }
    }

    info!(
        backup_dir = %backup_dir.display(),
        files_copied,
        warning_count = warnings.len(),
        "bulk backup complete"
    );

    BackupReport {
        success: true,
        message: format!(
            "successfully backed up {files_copied} databases to {}",
            backup_dir.display()
        ),
        backup_dir: backup_dir.display().to_string(),
        files_copied,
        warnings,
    }
}
