use std::io::{self, Write};

use anyhow::Result;

use crate::cli::RowsArgs;
use crate::commands::{format_row, write_json_stdout};
use crate::model::RowPage;
use crate::store::{count_rows, fetch_page, open_named_database};
use crate::util::resolve_data_dir;

pub fn run(args: RowsArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let (_, conn) = open_named_database(&data_dir, &args.db_file)?;

    let total_rows = count_rows(&conn, &args.table)?;
    let rows = fetch_page(&conn, &args.table, args.page, args.page_size)?;

    let page = RowPage {
        table: args.table,
        page: args.page.max(1),
        page_size: args.page_size,
        total_rows,
        rows,
    };

    if args.json {
        return write_json_stdout(&page);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(
        output,
        "Table {}: page {} ({} per page, {} total)",
        page.table, page.page, page.page_size, page.total_rows
    )?;
    for row in &page.rows {
        writeln!(output, "  {}", format_row(row))?;
    }
    output.flush()?;
    Ok(())
}
