use std::io::{self, Write};

use anyhow::Result;
use tracing::warn;

use crate::cli::TablesArgs;
use crate::commands::write_json_stdout;
use crate::store::{database_stats, open_named_database};
use crate::util::resolve_data_dir;

pub fn run(args: TablesArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let (path, conn) = open_named_database(&data_dir, &args.db_file)?;
    let stats = database_stats(&conn, &path.display().to_string())?;

    for warning in &stats.warnings {
        warn!(file = %stats.file, warning = %warning, "stats warning");
    }

    if args.json {
        return write_json_stdout(&stats);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Database: {}", stats.file)?;
    for table in &stats.tables {
        writeln!(
            output,
            "  {}\trecords={}\tcolumns={}",
            table.name, table.records, table.columns
        )?;
    }
    writeln!(output, "Total records: {}", stats.total_records)?;
    output.flush()?;
    Ok(())
}
