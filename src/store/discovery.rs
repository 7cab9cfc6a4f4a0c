use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

use super::access::{count_rows, list_tables, table_schema};
use super::catalog::{ALL_CATEGORIES, Category};
use super::StoreResult;
use crate::model::{DatabaseInfo, DatabaseStats, TableSummary};

struct ScannedFile {
    filename: String,
    info: DatabaseInfo,
}

/// Matches every category's filename pattern against the flat storage
/// directory. Recomputed on every call; there is no cached discovery state.
/// A category with no matches yields an empty list; an unreadable storage
/// directory is an error.
pub fn discover(data_dir: &Path) -> StoreResult<Vec<(Category, Vec<DatabaseInfo>)>> {
    let files = scan_directory(data_dir)?;

    let mut out = Vec::with_capacity(ALL_CATEGORIES.len());
    for category in ALL_CATEGORIES {
        let pattern = category.pattern_regex()?;
        let matches: Vec<DatabaseInfo> = files
            .iter()
            .filter(|file| pattern.is_match(&file.filename))
            .map(|file| file.info.clone())
            .collect();
        out.push((category, matches));
    }

    Ok(out)
}

/// Discovery restricted to a single category.
pub fn discover_category(data_dir: &Path, category: Category) -> StoreResult<Vec<DatabaseInfo>> {
    let files = scan_directory(data_dir)?;
    let pattern = category.pattern_regex()?;

    Ok(files
        .into_iter()
        .filter(|file| pattern.is_match(&file.filename))
        .map(|file| file.info)
        .collect())
}

fn scan_directory(data_dir: &Path) -> StoreResult<Vec<ScannedFile>> {
    let entries = fs::read_dir(data_dir)?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let Ok(filename) = entry.file_name().into_string() else {
            continue;
        };

        let metadata = entry.metadata()?;
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))?;

        let name = Path::new(&filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&filename)
            .to_string();

        files.push(ScannedFile {
            filename,
            info: DatabaseInfo {
                file: entry.path().display().to_string(),
                name,
                size_bytes: metadata.len(),
                modified,
            },
        });
    }

    files.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(files)
}

/// Per-table record counts and column counts for one file. A table that
/// cannot be counted is reported with zero records and a warning instead of
/// failing the whole listing.
pub fn database_stats(conn: &Connection, file: &str) -> StoreResult<DatabaseStats> {
    let tables = list_tables(conn)?;

    let mut summaries = Vec::with_capacity(tables.len());
    let mut total_records = 0;
    let mut warnings = Vec::new();

    for table in tables {
        let records = match count_rows(conn, &table) {
            Ok(records) => {
                total_records += records;
                records
            }
            Err(err) => {
                warnings.push(format!("failed to count records in table {table}: {err}"));
                0
            }
        };

        let columns = match table_schema(conn, &table) {
            Ok(columns) => columns.len(),
            Err(err) => {
                warnings.push(format!("failed to read schema for table {table}: {err}"));
                0
            }
        };

        summaries.push(TableSummary {
            name: table,
            records,
            columns,
        });
    }

    Ok(DatabaseStats {
        file: file.to_string(),
        tables: summaries,
        total_records,
        warnings,
    })
}
