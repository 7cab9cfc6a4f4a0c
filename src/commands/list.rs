use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use tracing::warn;

use crate::cli::ListArgs;
use crate::commands::write_json_stdout;
use crate::model::{CategoryListing, DatabaseListing, DiscoveryReport};
use crate::store::{database_stats, discover, open_database};
use crate::util::{now_utc_string, resolve_data_dir};

pub fn run(args: ListArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let discovered = discover(&data_dir)?;

    let mut categories = Vec::with_capacity(discovered.len());
    for (category, databases) in discovered {
        let mut listings = Vec::with_capacity(databases.len());
        for info in databases {
            listings.push(listing_for(info));
        }

        categories.push(CategoryListing {
            category: category.as_str().to_string(),
            description: category.description().to_string(),
            pattern: category.pattern().to_string(),
            databases: listings,
        });
    }

    let report = DiscoveryReport {
        generated_at: now_utc_string(),
        data_dir: data_dir.display().to_string(),
        categories,
    };

    if args.json {
        return write_json_stdout(&report);
    }

    write_text_report(&report)
}

fn listing_for(info: crate::model::DatabaseInfo) -> DatabaseListing {
    let stats = open_database(Path::new(&info.file))
        .and_then(|conn| database_stats(&conn, &info.file));

    match stats {
        Ok(stats) => {
            for warning in &stats.warnings {
                warn!(file = %info.file, warning = %warning, "stats warning");
            }
            DatabaseListing {
                file: info.file,
                name: info.name,
                size_bytes: info.size_bytes,
                modified: info.modified,
                table_count: stats.tables.len(),
                total_records: stats.total_records,
                error: None,
            }
        }
        Err(err) => DatabaseListing {
            file: info.file,
            name: info.name,
            size_bytes: info.size_bytes,
            modified: info.modified,
            table_count: 0,
            total_records: 0,
            error: Some(err.to_string()),
        },
    }
}

fn write_text_report(report: &DiscoveryReport) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Storage directory: {}", report.data_dir)?;
    for category in &report.categories {
        writeln!(
            output,
            "{}: {} (pattern {}): {} database(s)",
            category.category,
            category.description,
            category.pattern,
            category.databases.len()
        )?;

        for database in &category.databases {
            match &database.error {
                Some(error) => writeln!(
                    output,
                    "  {}\t{} bytes\tmodified {}\terror: {}",
                    database.name, database.size_bytes, database.modified, error
                )?,
                None => writeln!(
                    output,
                    "  {}\t{} bytes\tmodified {}\ttables={} records={}",
                    database.name,
                    database.size_bytes,
                    database.modified,
                    database.table_count,
                    database.total_records
                )?,
            }
        }
    }

    output.flush()?;
    Ok(())
}
