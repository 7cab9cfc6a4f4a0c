use std::io::{self, Write};

use anyhow::Result;

use crate::cli::InspectArgs;
use crate::commands::{format_row, write_json_stdout};
use crate::model::TableInspection;
use crate::store::{
    count_rows, fetch_page, list_tables, open_named_database, table_exists, table_schema,
};
use crate::util::resolve_data_dir;

const SAMPLE_ROWS: u32 = 3;

pub fn run(args: InspectArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let (path, conn) = open_named_database(&data_dir, &args.db_file)?;

    let exists = table_exists(&conn, &args.table)?;
    let all_tables = list_tables(&conn)?;

    let inspection = if exists {
        TableInspection {
            file: path.display().to_string(),
            table: args.table.clone(),
            exists,
            all_tables,
            columns: table_schema(&conn, &args.table)?,
            row_count: count_rows(&conn, &args.table)?,
            sample_rows: fetch_page(&conn, &args.table, 1, SAMPLE_ROWS)?,
        }
    } else {
        TableInspection {
            file: path.display().to_string(),
            table: args.table.clone(),
            exists,
            all_tables,
            columns: Vec::new(),
            row_count: 0,
            sample_rows: Vec::new(),
        }
    };

    if args.json {
        return write_json_stdout(&inspection);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Database: {}", inspection.file)?;

    if !inspection.exists {
        writeln!(output, "Table {} NOT FOUND", inspection.table)?;
        writeln!(
            output,
            "Available tables: {}",
            inspection.all_tables.join(", ")
        )?;
        output.flush()?;
        return Ok(());
    }

    writeln!(output, "Table: {}", inspection.table)?;
    writeln!(output, "Columns: {}", inspection.columns.len())?;
    for column in &inspection.columns {
        writeln!(
            output,
            "  {}\t{}\t{}",
            column.name,
            column.decl_type,
            if column.not_null { "NOT NULL" } else { "" }
        )?;
    }
    writeln!(output, "Records: {}", inspection.row_count)?;
    writeln!(output, "Sample ({} rows):", inspection.sample_rows.len())?;
    for row in &inspection.sample_rows {
        writeln!(output, "  {}", format_row(row))?;
    }
    writeln!(
        output,
        "All tables: {}",
        inspection.all_tables.join(", ")
    )?;
    output.flush()?;
    Ok(())
}
