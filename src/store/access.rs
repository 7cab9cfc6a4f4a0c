use std::collections::HashSet;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row as SqliteRow, params, params_from_iter};
use serde_json::Value;
use tracing::warn;

use super::connect::table_exists;
use super::{StoreError, StoreResult};
use crate::model::{ColumnInfo, Row};

/// Strips any pre-existing quoting characters from both ends of a name and
/// wraps it once in double quotes for interpolation into SQL.
///
/// This neutralizes names that arrive pre-quoted, but quote characters
/// embedded in the middle of a name survive the strip, so it is a mitigation
/// rather than a guarantee. Mutating operations additionally check every
/// column name against the table's live schema before building SQL.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", strip_quoting(name))
}

fn strip_quoting(name: &str) -> &str {
    name.trim_matches(|ch| matches!(ch, '"' | '\'' | '`' | '[' | ']'))
}

/// Actor and target-file attribution attached to audit rows.
pub struct AuditContext<'a> {
    pub actor: &'a str,
    pub target_db: &'a str,
}

/// Every table in the file except SQLite-internal ones, ordered by name.
pub fn list_tables(conn: &Connection) -> StoreResult<Vec<String>> {
    let mut statement = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;

    let mut rows = statement.query([])?;
    let mut names = Vec::new();
    while let Some(row) = rows.next()? {
        names.push(row.get(0)?);
    }

    Ok(names)
}

/// Column name, declared type and not-null flag, in declaration order.
pub fn table_schema(conn: &Connection, table: &str) -> StoreResult<Vec<ColumnInfo>> {
    let pragma_sql = format!("PRAGMA table_info({})", quote_identifier(table));
    let mut statement = conn.prepare(&pragma_sql)?;

    let mut rows = statement.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(ColumnInfo {
            name: row.get(1)?,
            decl_type: row.get(2)?,
            not_null: row.get::<_, i64>(3)? != 0,
        });
    }

    if columns.is_empty() {
        return Err(StoreError::NotFound(format!(
            "table {table} does not exist"
        )));
    }

    Ok(columns)
}

pub fn count_rows(conn: &Connection, table: &str) -> StoreResult<i64> {
    let count_sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
    let count = conn.query_row(&count_sql, [], |row| row.get(0))?;
    Ok(count)
}

/// One page of rows ordered by `id` descending, null ids sorting as zero.
/// Pages are 1-based.
pub fn fetch_page(
    conn: &Connection,
    table: &str,
    page: u32,
    page_size: u32,
) -> StoreResult<Vec<Row>> {
    let page = page.max(1);
    let offset = i64::from(page - 1) * i64::from(page_size);

    let page_sql = format!(
        "SELECT * FROM {} ORDER BY COALESCE(id, 0) DESC LIMIT ?1 OFFSET ?2",
        quote_identifier(table)
    );
    let mut statement = conn.prepare(&page_sql)?;
    let column_names: Vec<String> = statement
        .column_names()
        .into_iter()
        .map(ToOwned::to_owned)
        .collect();

    let mut rows = statement.query(params![i64::from(page_size), offset])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(materialize_row(row, &column_names)?);
    }

    Ok(out)
}

pub fn get_by_id(conn: &Connection, table: &str, id: i64) -> StoreResult<Row> {
    let select_sql = format!(
        "SELECT * FROM {} WHERE id = ?1",
        quote_identifier(table)
    );
    let mut statement = conn.prepare(&select_sql)?;
    let column_names: Vec<String> = statement
        .column_names()
        .into_iter()
        .map(ToOwned::to_owned)
        .collect();

    let mut rows = statement.query(params![id])?;
    match rows.next()? {
        Some(row) => materialize_row(row, &column_names),
        None => Err(StoreError::NotFound(format!(
            "no row with id {id} in table {table}"
        ))),
    }
}

/// Inserts one row built from the supplied fields. Fields with blank values
/// are dropped first so empty optional form inputs never overwrite column
/// defaults; an empty remainder is a validation error. Every column name must
/// exist in the table's schema. Returns the new row's id.
pub fn insert_row(
    conn: &Connection,
    table: &str,
    fields: &[(String, String)],
    audit: &AuditContext<'_>,
) -> StoreResult<i64> {
    let allowed = column_allow_list(conn, table)?;

    let retained: Vec<&(String, String)> = fields
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect();

    if retained.is_empty() {
        return Err(StoreError::Validation(
            "no non-empty fields supplied".to_string(),
        ));
    }

    let mut columns = Vec::with_capacity(retained.len());
    let mut placeholders = Vec::with_capacity(retained.len());
    let mut values = Vec::with_capacity(retained.len());
    for (index, (name, value)) in retained.iter().enumerate() {
        require_known_column(&allowed, name, table)?;
        columns.push(quote_identifier(name));
        placeholders.push(format!("?{}", index + 1));
        values.push(value.clone());
    }

    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        columns.join(", "),
        placeholders.join(", ")
    );
    conn.execute(&insert_sql, params_from_iter(values))?;
    let id = conn.last_insert_rowid();

    record_audit(
        conn,
        audit,
        "INSERT",
        table,
        &format!("added new record id {id}"),
    );

    Ok(id)
}

/// Updates the row matching `id` with every supplied field, blanks included.
/// Returns the number of rows affected; a nonexistent id affects zero rows
/// without error, so callers wanting a hard failure must check existence
/// first.
pub fn update_row(
    conn: &Connection,
    table: &str,
    id: i64,
    fields: &[(String, String)],
    audit: &AuditContext<'_>,
) -> StoreResult<usize> {
    if fields.is_empty() {
        return Err(StoreError::Validation("no fields supplied".to_string()));
    }

    let allowed = column_allow_list(conn, table)?;

    let mut assignments = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());
    for (index, (name, value)) in fields.iter().enumerate() {
        require_known_column(&allowed, name, table)?;
        assignments.push(format!("{} = ?{}", quote_identifier(name), index + 1));
        values.push(value.clone());
    }

    let update_sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        quote_identifier(table),
        assignments.join(", "),
        fields.len() + 1
    );

    let mut params: Vec<rusqlite::types::Value> = values
        .into_iter()
        .map(rusqlite::types::Value::Text)
        .collect();
    params.push(rusqlite::types::Value::Integer(id));

    let affected = conn.execute(&update_sql, params_from_iter(params))?;

    if affected > 0 {
        record_audit(
            conn,
            audit,
            "UPDATE",
            table,
            &format!("updated record id {id}"),
        );
    }

    Ok(affected)
}

fn column_allow_list(conn: &Connection, table: &str) -> StoreResult<HashSet<String>> {
    let columns = table_schema(conn, table)?;
    Ok(columns.into_iter().map(|column| column.name).collect())
}

fn require_known_column(
    allowed: &HashSet<String>,
    name: &str,
    table: &str,
) -> StoreResult<()> {
    if allowed.contains(strip_quoting(name)) {
        return Ok(());
    }

    Err(StoreError::Validation(format!(
        "unknown column {name} for table {table}"
    )))
}

/// Appends an audit row when the file carries an `admin_actions`-shaped
/// table. Audit failures are logged and swallowed; they never fail the
/// mutation they describe.
fn record_audit(
    conn: &Connection,
    audit: &AuditContext<'_>,
    action_type: &str,
    table: &str,
    details: &str,
) {
    if let Err(err) = try_record_audit(conn, audit, action_type, table, details) {
        warn!(
            target_db = audit.target_db,
            target_table = table,
            error = %err,
            "failed to record audit row"
        );
    }
}

fn try_record_audit(
    conn: &Connection,
    audit: &AuditContext<'_>,
    action_type: &str,
    table: &str,
    details: &str,
) -> StoreResult<()> {
    if !table_exists(conn, "admin_actions")? {
        return Ok(());
    }

    conn.execute(
        "INSERT INTO admin_actions (actor, action_type, target_db, target_table, details)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![audit.actor, action_type, audit.target_db, table, details],
    )?;

    Ok(())
}

fn materialize_row(row: &SqliteRow<'_>, column_names: &[String]) -> StoreResult<Row> {
    let mut out = Row::new();
    for (index, name) in column_names.iter().enumerate() {
        out.insert(name.clone(), json_value(row.get_ref(index)?));
    }
    Ok(out)
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::from(n),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(blob) => Value::String(String::from_utf8_lossy(blob).into_owned()),
    }
}
