use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::model::{OpReport, Row};

pub mod add;
pub mod backup;
pub mod create;
pub mod delete;
pub mod edit;
pub mod init;
pub mod inspect;
pub mod list;
pub mod migrate;
pub mod rows;
pub mod schema;
pub mod show;
pub mod tables;
pub mod upload;

pub(crate) fn write_json_stdout<T: Serialize>(value: &T) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, value).context("failed to serialize json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

/// Surfaces a lifecycle report: warnings are logged, a failed report becomes
/// the process exit error, a successful one is logged at info.
pub(crate) fn finish_op(report: OpReport) -> Result<()> {
    for warning in &report.warnings {
        warn!(warning = %warning, "operation warning");
    }

    if !report.success {
        bail!("{}", report.message);
    }

    info!("{}", report.message);
    Ok(())
}

/// Parses repeated `COLUMN=VALUE` assignments. Values are kept verbatim;
/// blank values are meaningful to the insert/update semantics downstream.
pub(crate) fn parse_assignments(raw: &[String]) -> Result<Vec<(String, String)>> {
    let mut fields = Vec::with_capacity(raw.len());
    for entry in raw {
        let Some((column, value)) = entry.split_once('=') else {
            bail!("invalid --set assignment (expected COLUMN=VALUE): {entry}");
        };
        fields.push((column.trim().to_string(), value.to_string()));
    }
    Ok(fields)
}

/// One-line rendering of a row for the text output mode.
pub(crate) fn format_row(row: &Row) -> String {
    row.iter()
        .map(|(column, value)| match value {
            Value::String(text) => format!("{column}={text}"),
            other => format!("{column}={other}"),
        })
        .collect::<Vec<String>>()
        .join("  ")
}
