//! YAML export
//!
//! Same content as the JSON export, readable by people.

use std::io::Write;

use crate::error::{BudgetError, BudgetResult};
use crate::export::json::BudgetExport;
use crate::models::BudgetData;

/// Export a snapshot to YAML with a header comment
pub fn export_yaml<W: Write>(data: &BudgetData, writer: &mut W) -> BudgetResult<()> {
    let export = BudgetExport::from_data(data);
    write_header(writer, &export).map_err(|e| BudgetError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| BudgetError::Export(e.to_string()))?;

    Ok(())
}

fn write_header<W: Write>(writer: &mut W, export: &BudgetExport) -> std::io::Result<()> {
    writeln!(writer, "# Wedding Budget Export")?;
    writeln!(writer, "# Generated: {}", export.exported_at)?;
    writeln!(writer, "# App Version: {}", export.app_version)?;
    writeln!(writer, "# {}", export.budget.calculated_budget.rationale.total_budget)?;
    writeln!(writer)
}

/// Read back a YAML export and check it
pub fn import_from_yaml(yaml_str: &str) -> BudgetResult<BudgetExport> {
    let export: BudgetExport =
        serde_yaml::from_str(yaml_str).map_err(|e| BudgetError::Export(e.to_string()))?;
    export.validate()?;
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_data;

    #[test]
    fn test_yaml_export() {
        let data = sample_data();
        let mut output = Vec::new();
        export_yaml(&data, &mut output).unwrap();

        let yaml = String::from_utf8(output).unwrap();
        assert!(yaml.starts_with("# Wedding Budget Export"));
        assert!(yaml.contains("schemaVersion"));
        assert!(yaml.contains("venue"));

        let export = import_from_yaml(&yaml).unwrap();
        assert_eq!(export.budget.calculated_budget.categories.len(), 10);
    }
}
