//! CSV export
//!
//! One row per category, in display order.

use std::io::Write;

use crate::error::{BudgetError, BudgetResult};
use crate::models::BudgetData;

const HEADER: [&str; 10] = [
    "ID",
    "Name",
    "Percentage",
    "Estimated Cost",
    "Actual Cost",
    "Remaining",
    "Priority",
    "Range Min",
    "Range Max",
    "Contracts",
];

/// Export the category breakdown to CSV
pub fn export_categories_csv<W: Write>(data: &BudgetData, writer: W) -> BudgetResult<()> {
    let mut csv = ::csv::Writer::from_writer(writer);
    csv.write_record(HEADER)
        .map_err(|e| BudgetError::Export(e.to_string()))?;

    for category in &data.calculated_budget.categories {
        let (min, max) = match category.ranges {
            Some(range) => (money(range.min.cents()), money(range.max.cents())),
            None => (String::new(), String::new()),
        };
        csv.write_record([
            category.id.as_str().to_string(),
            category.name.clone(),
            format!("{:.2}", category.percentage.as_percent()),
            money(category.estimated_cost().cents()),
            money(category.actual_cost().cents()),
            money(category.remaining().cents()),
            category.priority.to_string(),
            min,
            max,
            category.contracts.len().to_string(),
        ])
        .map_err(|e| BudgetError::Export(e.to_string()))?;
    }

    csv.flush().map_err(|e| BudgetError::Export(e.to_string()))?;
    Ok(())
}

fn money(cents: i64) -> String {
    format!("{:.2}", cents as f64 / 100.0)
}
