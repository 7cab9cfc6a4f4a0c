use anyhow::Result;

use crate::cli::DeleteArgs;
use crate::commands::finish_op;
use crate::store::delete_database;
use crate::util::resolve_data_dir;

pub fn run(args: DeleteArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let report = delete_database(&data_dir, &args.db_file);
    finish_op(report)
}
