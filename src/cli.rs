use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::store::Category;

#[derive(Parser, Debug)]
#[command(
    name = "qbankadmin",
    version,
    about = "Administration tooling for question bank database files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Seed default databases and upgrade the centralized user file
    Init(InitArgs),
    /// Discover databases per category with record totals
    List(ListArgs),
    /// Create a fresh database from a category schema
    Create(CreateArgs),
    /// Upload an existing database file into storage
    Upload(UploadArgs),
    /// Delete a database, keeping a timestamped backup copy
    Delete(DeleteArgs),
    /// Copy every discovered database into a timestamped backup tree
    Backup(BackupArgs),
    /// Consolidate users from qbank databases into the centralized file
    MigrateUsers(MigrateUsersArgs),
    /// List the tables of one database with record counts
    Tables(TablesArgs),
    /// Show the column layout of one table
    Schema(SchemaArgs),
    /// Debug view of one table: existence, layout, volume, sample rows
    Inspect(InspectArgs),
    /// Page through the rows of a table, newest id first
    Rows(RowsArgs),
    /// Show a single row by id
    Show(ShowArgs),
    /// Insert a row built from --set column=value pairs
    Add(AddArgs),
    /// Update a row by id from --set column=value pairs
    Edit(EditArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub category: Category,

    #[arg(long)]
    pub name: String,
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// File to copy into storage
    pub source: PathBuf,

    #[arg(long, value_enum)]
    pub category: Category,

    /// Store the upload under this name instead of the source filename
    #[arg(long)]
    pub filename: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Database filename (or path; only the base name is used)
    pub db_file: String,
}

#[derive(Args, Debug, Clone)]
pub struct BackupArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, default_value = "backups")]
    pub backup_root: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct MigrateUsersArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TablesArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    pub db_file: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    pub db_file: String,

    pub table: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    pub db_file: String,

    pub table: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RowsArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    pub db_file: String,

    pub table: String,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 25)]
    pub page_size: u32,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    pub db_file: String,

    pub table: String,

    pub id: i64,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    pub db_file: String,

    pub table: String,

    /// Column assignment, repeatable
    #[arg(long = "set", value_name = "COLUMN=VALUE")]
    pub set: Vec<String>,

    /// Name recorded in the audit trail
    #[arg(long, default_value = "admin")]
    pub actor: String,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    pub db_file: String,

    pub table: String,

    pub id: i64,

    /// Column assignment, repeatable
    #[arg(long = "set", value_name = "COLUMN=VALUE")]
    pub set: Vec<String>,

    /// Name recorded in the audit trail
    #[arg(long, default_value = "admin")]
    pub actor: String,
}
