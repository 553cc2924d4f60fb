//! Diff generation for audit logging
//!
//! Summarizes what a ledger operation changed in the terms a couple reads a
//! budget in: shares, estimates and spending per category.

use std::collections::HashMap;

use crate::models::BudgetCategory;

use super::entry::{summarize, CategoryChange};

/// Field-level changes between two versions of one category
///
/// Returns `None` when nothing visible changed.
pub fn category_diff(before: &BudgetCategory, after: &BudgetCategory) -> Option<String> {
    let mut changes = Vec::new();

    if before.name != after.name {
        changes.push(format!("name: \"{}\" -> \"{}\"", before.name, after.name));
    }
    if before.percentage != after.percentage {
        changes.push(format!("percentage: {} -> {}", before.percentage, after.percentage));
    }
    if before.estimated_cost() != after.estimated_cost() {
        changes.push(format!(
            "estimatedCost: {} -> {}",
            before.estimated_cost(),
            after.estimated_cost()
        ));
    }
    if before.actual_cost() != after.actual_cost() {
        changes.push(format!(
            "actualCost: {} -> {}",
            before.actual_cost(),
            after.actual_cost()
        ));
    }
    if before.priority != after.priority {
        changes.push(format!("priority: {} -> {}", before.priority, after.priority));
    }
    if before.contracts.len() != after.contracts.len() {
        changes.push(format!(
            "contracts: [{} items] -> [{} items]",
            before.contracts.len(),
            after.contracts.len()
        ));
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

/// Per-category movements across the whole ledger
///
/// Categories are listed in their new order, followed by the ones that
/// left the breakdown.
pub fn ledger_changes(before: &[BudgetCategory], after: &[BudgetCategory]) -> Vec<CategoryChange> {
    let old: HashMap<&str, &BudgetCategory> =
        before.iter().map(|c| (c.id.as_str(), c)).collect();
    let new: HashMap<&str, &BudgetCategory> = after.iter().map(|c| (c.id.as_str(), c)).collect();

    let kept = after.iter().filter_map(|category| {
        CategoryChange::between(old.get(category.id.as_str()).copied(), Some(category))
    });
    let removed = before
        .iter()
        .filter(|c| !new.contains_key(c.id.as_str()))
        .filter_map(|category| CategoryChange::between(Some(category), None));
    kept.chain(removed).collect()
}

/// Share changes across the whole ledger
///
/// Lists every category whose share moved (or, with the share unchanged,
/// whose estimate moved), plus categories that appeared or disappeared,
/// e.g. `venue: 30.00% -> 30.62%, favors: 2.00% -> (removed)`.
pub fn ledger_diff(before: &[BudgetCategory], after: &[BudgetCategory]) -> Option<String> {
    summarize(&ledger_changes(before, after))
}
