use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::BackupArgs;
use crate::store::backup_all;
use crate::util::resolve_data_dir;

pub fn run(args: BackupArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let report = backup_all(&data_dir, &args.backup_root);

    for warning in &report.warnings {
        warn!(warning = %warning, "backup warning");
    }

    if !report.success {
        bail!("{}", report.message);
    }

    info!(
        backup_dir = %report.backup_dir,
        files_copied = report.files_copied,
        "{}", report.message
    );
    Ok(())
}
