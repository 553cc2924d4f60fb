//! Export module
//!
//! Exports a session snapshot in multiple formats:
//! - CSV: the category breakdown (spreadsheet-compatible)
//! - JSON: the full snapshot, machine-readable
//! - YAML: the full snapshot, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_categories_csv;
pub use self::json::{export_json, import_from_json, BudgetExport, EXPORT_SCHEMA_VERSION};
pub use self::yaml::{export_yaml, import_from_yaml};

#[cfg(test)]
pub(crate) mod tests {
    use crate::models::{BudgetData, BudgetLocation, BudgetPreferences, Money};
    use crate::services::{BudgetPlanner, PlanRequest};
    use crate::storage::MemoryStore;

    pub(crate) fn sample_data() -> BudgetData {
        let store = MemoryStore::new();
        let request = PlanRequest {
            total_budget: Money::from_units(40_000),
            guest_count: 100,
            location: BudgetLocation::new("Smallville", "Atlantis").with_wedding_date("2026-03-10"),
            preferences: BudgetPreferences::default(),
        };
        BudgetPlanner::start(&store, request)
            .map(|planner| planner.snapshot())
            .unwrap()
    }
}
