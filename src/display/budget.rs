//! Budget display formatting
//!
//! Formats the category breakdown, a single category, and the rationale for
//! terminal output.

use crate::models::{BudgetCategory, BudgetData, Money};

/// Format the category breakdown as a table with a totals row
pub fn format_breakdown(data: &BudgetData, symbol: &str) -> String {
    let budget = &data.calculated_budget;
    if budget.categories.is_empty() {
        return "No categories found.".to_string();
    }

    let name_width = budget
        .categories
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(8)
        .max(8);
    let amount = |m: Money| m.format_with_symbol(symbol);

    let mut output = String::new();
    output.push_str(&format!(
        "{}\n{}, {} ({} guests)\n\n",
        budget.rationale.total_budget,
        data.location,
        budget.day_of_week,
        data.guest_count
    ));
    output.push_str(&format!(
        "{:<width$}  {:>8}  {:>12}  {:>12}  {:>12}  {:<6}\n",
        "Category",
        "Share",
        "Estimated",
        "Actual",
        "Remaining",
        "Prio",
        width = name_width
    ));
    output.push_str(&format!(
        "{:-<width$}  {:->8}  {:->12}  {:->12}  {:->12}  {:-<6}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        width = name_width
    ));

    for category in &budget.categories {
        let over = if category.is_over_budget() { " !" } else { "" };
        output.push_str(&format!(
            "{:<width$}  {:>8}  {:>12}  {:>12}  {:>12}  {:<6}{}\n",
            category.name,
            category.percentage.to_string(),
            amount(category.estimated_cost()),
            amount(category.actual_cost()),
            amount(category.remaining()),
            category.priority.to_string(),
            over,
            width = name_width
        ));
    }

    let estimated = budget.total_estimated();
    let actual = budget.total_actual();
    output.push_str(&format!(
        "{:-<width$}  {:->8}  {:->12}  {:->12}  {:->12}\n",
        "",
        "",
        "",
        "",
        "",
        width = name_width
    ));
    output.push_str(&format!(
        "{:<width$}  {:>8}  {:>12}  {:>12}  {:>12}\n",
        "Total",
        budget.total_percentage().to_string(),
        amount(estimated),
        amount(actual),
        amount(estimated - actual),
        width = name_width
    ));

    output
}

/// Format one category with ranges, contracts and notes
pub fn format_category_details(category: &BudgetCategory, symbol: &str) -> String {
    let amount = |m: Money| m.format_with_symbol(symbol);
    let mut output = String::new();

    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:         {}\n", category.id));
    output.push_str(&format!("  Share:      {}\n", category.percentage));
    output.push_str(&format!("  Estimated:  {}\n", amount(category.estimated_cost())));
    if let Some(range) = category.ranges {
        output.push_str(&format!(
            "  Range:      {} - {}\n",
            amount(range.min),
            amount(range.max)
        ));
    }
    output.push_str(&format!("  Actual:     {}\n", amount(category.actual_cost())));
    output.push_str(&format!("  Remaining:  {}\n", amount(category.remaining())));
    output.push_str(&format!("  Priority:   {}\n", category.priority));
    if !category.rationale.is_empty() {
        output.push_str(&format!("  Rationale:  {}\n", category.rationale));
    }
    if let Some(notes) = &category.notes {
        output.push_str(&format!("  Notes:      {}\n", notes));
    }

    if !category.contracts.is_empty() {
        output.push_str(&format!(
            "  Contracts:  {} committed\n",
            amount(category.contracted_amount())
        ));
        for contract in &category.contracts {
            output.push_str(&format!(
                "    {} {} {} ({}, {})\n",
                contract.id,
                contract.name,
                amount(contract.amount),
                contract.status,
                contract.date
            ));
        }
    }

    output
}

/// Format the rationale notes as a bullet list
pub fn format_rationale(data: &BudgetData) -> String {
    let rationale = &data.calculated_budget.rationale;
    let mut output = String::new();
    output.push_str(&format!(
        "Location factor: {:.2}x   Seasonal factor: {:.2}x\n",
        rationale.location_factor, rationale.seasonal_factor
    ));
    for note in &rationale.notes {
        output.push_str(&format!("  - {}\n", note));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetLocation, BudgetPreferences, CategoryId, Contract};
    use crate::services::{BudgetPlanner, PlanRequest};
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn planner(store: &MemoryStore) -> BudgetPlanner<&MemoryStore> {
        let request = PlanRequest {
            total_budget: Money::from_units(40_000),
            guest_count: 100,
            location: BudgetLocation::new("Smallville", "Atlantis").with_wedding_date("2026-03-10"),
            preferences: BudgetPreferences::default(),
        };
        BudgetPlanner::start(store, request).unwrap()
    }

    #[test]
    fn test_breakdown_has_row_per_category_and_total() {
        let store = MemoryStore::new();
        let output = format_breakdown(&planner(&store).snapshot(), "$");

        assert!(output.starts_with("Total budget of $40000.00 for 100 guests"));
        assert!(output.contains("Venue"));
        assert!(output.contains("Contingency"));
        let total_line = output.lines().last().unwrap();
        assert!(total_line.starts_with("Total"));
        assert!(total_line.contains("100.00%"));
    }

    #[test]
    fn test_over_budget_is_flagged() {
        let store = MemoryStore::new();
        let mut planner = planner(&store);
        let favors = CategoryId::parse("favors").unwrap();
        planner
            .record_actual_cost(&favors, Money::from_units(5_000))
            .unwrap();

        let output = format_breakdown(&planner.snapshot(), "$");
        let favors_line = output.lines().find(|l| l.starts_with("Favors")).unwrap();
        assert!(favors_line.ends_with(" !"));
    }

    #[test]
    fn test_category_details() {
        let store = MemoryStore::new();
        let mut planner = planner(&store);
        let venue = CategoryId::parse("venue").unwrap();
        let contract = Contract::new(
            "Lakeside Barn",
            Money::from_units(9_000),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        );
        let updated = planner.attach_contract(&venue, contract).unwrap();

        let output = format_category_details(&updated, "€");
        assert!(output.contains("Category: Venue"));
        assert!(output.contains("Lakeside Barn €9000.00"));
        assert!(output.contains("Range:"));
    }
}
