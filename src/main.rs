mod cli;
mod commands;
mod model;
mod store;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Create(args) => commands::create::run(args),
        Commands::Upload(args) => commands::upload::run(args),
        Commands::Delete(args) => commands::delete::run(args),
        Commands::Backup(args) => commands::backup::run(args),
        Commands::MigrateUsers(args) => commands::migrate::run(args),
        Commands::Tables(args) => commands::tables::run(args),
        Commands::Schema(args) => commands::schema::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Rows(args) => commands::rows::run(args),
        Commands::Show(args) => commands::show::run(args),
        Commands::Add(args) => commands::add::run(args),
        Commands::Edit(args) => commands::edit::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
