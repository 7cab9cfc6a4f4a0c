use anyhow::Result;

use crate::cli::CreateArgs;
use crate::commands::finish_op;
use crate::store::create_database;
use crate::util::resolve_data_dir;

pub fn run(args: CreateArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let report = create_database(&data_dir, args.category, &args.name);
    finish_op(report)
}
