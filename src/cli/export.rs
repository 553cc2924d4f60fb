//! Export command

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::ValueEnum;

use crate::error::{BudgetError, BudgetResult};
use crate::export::{export_categories_csv, export_json, export_yaml};

use super::CliContext;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// CSV format (one row per category)
    Csv,
    /// JSON format (full snapshot)
    Json,
    /// YAML format (full snapshot, human-readable)
    Yaml,
}

/// Handle `export`; writes to stdout when no output file is given
pub fn handle_export(
    ctx: &CliContext,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> BudgetResult<()> {
    let planner = ctx.open()?;
    let data = planner.snapshot();

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                BudgetError::Export(format!("Failed to create {}: {}", path.display(), e))
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    match format {
        ExportFormat::Csv => export_categories_csv(&data, &mut writer)?,
        ExportFormat::Json => {
            export_json(&data, &mut writer, true)?;
            writeln!(writer).map_err(|e| BudgetError::Export(e.to_string()))?;
        }
        ExportFormat::Yaml => export_yaml(&data, &mut writer)?,
    }
    writer
        .flush()
        .map_err(|e| BudgetError::Export(e.to_string()))?;

    if let Some(path) = output {
        eprintln!("Exported {} categories to {}", data.calculated_budget.categories.len(), path.display());
    }
    Ok(())
}
