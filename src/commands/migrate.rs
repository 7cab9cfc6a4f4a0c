use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::MigrateUsersArgs;
use crate::store::migrate_users;
use crate::util::resolve_data_dir;

pub fn run(args: MigrateUsersArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let report = migrate_users(&data_dir);

    for warning in &report.warnings {
        warn!(warning = %warning, "migration warning");
    }

    if !report.success {
        bail!("{}", report.message);
    }

    info!(
        users_migrated = report.users_migrated,
        bookmarks_migrated = report.bookmarks_migrated,
        "{}", report.message
    );
    Ok(())
}
