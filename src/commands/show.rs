use std::io::{self, Write};

use anyhow::Result;

use crate::cli::ShowArgs;
use crate::commands::{format_row, write_json_stdout};
use crate::store::{get_by_id, open_named_database};
use crate::util::resolve_data_dir;

pub fn run(args: ShowArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let (_, conn) = open_named_database(&data_dir, &args.db_file)?;

    let row = get_by_id(&conn, &args.table, args.id)?;

    if args.json {
        return write_json_stdout(&row);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "{}", format_row(&row))?;
    output.flush()?;
    Ok(())
}
