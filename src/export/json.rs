//! JSON export
//!
//! Exports a session snapshot with schema versioning and summary totals.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetData, Money, Percentage};
use crate::services::CategoryLedger;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// A session snapshot wrapped for export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub budget: BudgetData,

    pub summary: ExportSummary,
}

/// Totals for quick reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub category_count: usize,
    pub total_percentage: Percentage,
    pub total_estimated: Money,
    pub total_actual: Money,
}

impl BudgetExport {
    pub fn from_data(data: &BudgetData) -> Self {
        let budget = &data.calculated_budget;
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            summary: ExportSummary {
                category_count: budget.categories.len(),
                total_percentage: budget.total_percentage(),
                total_estimated: budget.total_estimated(),
                total_actual: budget.total_actual(),
            },
            budget: data.clone(),
        }
    }

    /// Validate the export structure
    ///
    /// Checks the schema version and that the categories still satisfy the
    /// ledger invariants.
    pub fn validate(&self) -> BudgetResult<()> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(BudgetError::Export(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            )));
        }
        CategoryLedger::restore(&self.budget)?;
        Ok(())
    }
}

/// Export a snapshot to JSON
pub fn export_json<W: Write>(data: &BudgetData, writer: &mut W, pretty: bool) -> BudgetResult<()> {
    let export = BudgetExport::from_data(data);

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| BudgetError::Export(e.to_string()))?;

    Ok(())
}

/// Read back a JSON export and check it
pub fn import_from_json(json_str: &str) -> BudgetResult<BudgetExport> {
    let export: BudgetExport =
        serde_json::from_str(json_str).map_err(|e| BudgetError::Export(e.to_string()))?;
    export.validate()?;
    Ok(export)
}
