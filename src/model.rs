use serde::Serialize;

/// A materialized table row: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// One discovered database file.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseInfo {
    pub file: String,
    pub name: String,
    pub size_bytes: u64,
    pub modified: String,
}

/// A discovered database with the record totals shown on the panel index.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseListing {
    pub file: String,
    pub name: String,
    pub size_bytes: u64,
    pub modified: String,
    pub table_count: usize,
    pub total_records: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub category: String,
    pub description: String,
    pub pattern: String,
    pub databases: Vec<DatabaseListing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub generated_at: String,
    pub data_dir: String,
    pub categories: Vec<CategoryListing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub records: i64,
    pub columns: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub file: String,
    pub tables: Vec<TableSummary>,
    pub total_records: i64,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
    pub not_null: bool,
}

/// Debug view of one table: existence, layout, volume and a small sample.
#[derive(Debug, Clone, Serialize)]
pub struct TableInspection {
    pub file: String,
    pub table: String,
    pub exists: bool,
    pub all_tables: Vec<String>,
    pub columns: Vec<ColumnInfo>,
    pub row_count: i64,
    pub sample_rows: Vec<Row>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowPage {
    pub table: String,
    pub page: u32,
    pub page_size: u32,
    pub total_rows: i64,
    pub rows: Vec<Row>,
}

/// Outcome of a lifecycle operation. Failures are reported here rather than
/// raised; callers branch on `success`.
#[derive(Debug, Clone, Serialize)]
pub struct OpReport {
    pub success: bool,
    pub message: String,
    pub warnings: Vec<String>,
}

impl OpReport {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            warnings: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    pub success: bool,
    pub message: String,
    pub backup_dir: String,
    pub files_copied: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub success: bool,
    pub message: String,
    pub users_migrated: usize,
    pub bookmarks_migrated: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub success: bool,
    pub data_dir: String,
    pub steps: Vec<String>,
    pub warnings: Vec<String>,
}
