use std::io::{self, Write};

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::EditArgs;
use crate::commands::parse_assignments;
use crate::store::{AuditContext, open_named_database, update_row};
use crate::util::resolve_data_dir;

pub fn run(args: EditArgs) -> Result<()> {
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
    let affected = update_row(&conn, &args.table, args.id, &fields, &audit)?;

    // An update against a missing id affects zero rows without erroring;
    // surface that so an edit that changed nothing is visible.
    if affected == 0 {
        warn!(id = args.id, table = %args.table, "no row matched; nothing updated");
    } else {
        info!(id = args.id, table = %args.table, affected, "record updated");
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "updated {affected} row(s) in {}", args.table)?;
    output.flush()?;
    Ok(())
}
