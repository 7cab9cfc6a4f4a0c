use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::AddArgs;
use crate::commands::parse_assignments;
use crate::store::{AuditContext, insert_row, open_named_database};
use crate::util::resolve_data_dir;

pub fn run(args: AddArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let fields = parse_assignments(&args.set)?;

    let (path, conn) = open_named_database(&data_dir, &args.db_file)?;
    let target_db = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(&args.db_file)
        .to_string();

    let audit = AuditContext {
        actor: &args.actor,
        target_db: &target_db,
    };
    let id = insert_row(&conn, &args.table, &fields, &audit)?;

    info!(id, table = %args.table, db = %target_db, "record added");

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "inserted row {id} into {}", args.table)?;
    output.flush()?;
    Ok(())
}
