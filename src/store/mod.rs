mod access;
mod catalog;
mod connect;
mod consolidate;
mod discovery;
mod error;
mod lifecycle;
mod seed;
#[cfg(test)]
mod tests;

pub use access::{
    AuditContext, count_rows, fetch_page, get_by_id, insert_row, list_tables, quote_identifier,
    table_schema, update_row,
};
pub use catalog::{ALL_CATEGORIES, Category, USERS_DB_FILE};
pub use connect::{open_database, open_named_database, resolve_db_path, table_exists};
pub use consolidate::migrate_users;
pub use discovery::{database_stats, discover, discover_category};
pub use error::{StoreError, StoreResult};
pub use lifecycle::{backup_all, create_database, delete_database, upload_database};
pub use seed::run_startup_seed;
