use std::io::{self, Write};

use anyhow::Result;

use crate::cli::SchemaArgs;
use crate::commands::write_json_stdout;
use crate::store::{open_named_database, table_schema};
use crate::util::resolve_data_dir;

pub fn run(args: SchemaArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let (_, conn) = open_named_database(&data_dir, &args.db_file)?;
    let columns = table_schema(&conn, &args.table)?;

    if args.json {
        return write_json_stdout(&columns);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Table: {}", args.table)?;
    for column in &columns {
        writeln!(
            output,
            "  {}\t{}\t{}",
            column.name,
            if column.decl_type.is_empty() {
                "(untyped)"
            } else {
                &column.decl_type
            },
            if column.not_null { "NOT NULL" } else { "" }
        )?;
    }
    output.flush()?;
    Ok(())
}
