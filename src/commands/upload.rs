use anyhow::Result;

use crate::cli::UploadArgs;
use crate::commands::finish_op;
use crate::store::upload_database;
use crate::util::resolve_data_dir;

pub fn run(args: UploadArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let report = upload_database(
        &data_dir,
        &args.source,
        args.filename.as_deref(),
        args.category,
    );
    finish_op(report)
}
