use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::InitArgs;
use crate::store::run_startup_seed;
use crate::util::resolve_data_dir;

pub fn run(args: InitArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    info!(data_dir = %data_dir.display(), "startup seeding requested");

    let report = run_startup_seed(&data_dir);

    for step in &report.steps {
        info!(step = %step, "seed step");
    }
    for warning in &report.warnings {
        warn!(warning = %warning, "seed warning");
    }

    if !report.success {
        bail!("startup seeding failed for {}", report.data_dir);
    }

    info!(
        data_dir = %report.data_dir,
        steps = report.steps.len(),
        warnings = report.warnings.len(),
        "seeding complete"
    );
    Ok(())
}
