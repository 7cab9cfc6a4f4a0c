use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};

use super::{StoreError, StoreResult};

/// Reduces a caller-supplied reference (bare filename or full path) to its
/// base name and re-roots it under the storage directory, so callers cannot
/// reach outside it. Fails with NotFound, listing the files currently
/// available, if the resolved path does not exist.
pub fn resolve_db_path(data_dir: &Path, db_file: &str) -> StoreResult<PathBuf> {
    let base_name = Path::new(db_file)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StoreError::Validation(format!("invalid database file name: {db_file}")))?;

    let full_path = data_dir.join(base_name);
    if !full_path.exists() {
        let available = available_databases(data_dir);
        return Err(StoreError::NotFound(format!(
            "database file {base_name} not found; available: [{}]",
            available.join(", ")
        )));
    }

    Ok(full_path)
}

/// `.db` files currently present in the storage directory, for NotFound
/// messages. Listing failures collapse to an empty list here; discovery is
/// the operation that reports them.
pub fn available_databases(data_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(data_dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".db"))
        .collect();
    names.sort();
    names
}

/// Opens a database file with foreign-key enforcement on. Every operation
/// opens its own short-lived connection; nothing is cached across calls.
pub fn open_database(path: &Path) -> StoreResult<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

/// Resolves a caller-supplied reference and opens the file it names.
pub fn open_named_database(data_dir: &Path, db_file: &str) -> StoreResult<(PathBuf, Connection)> {
    let path = resolve_db_path(data_dir, db_file)?;
    let conn = open_database(&path)?;
    Ok((path, conn))
}

pub fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let found = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |_| Ok(()),
        )
        .optional()?;

    Ok(found.is_some())
}
