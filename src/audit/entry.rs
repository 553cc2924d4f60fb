//! Audit entry data structures
//!
//! An entry records one committed ledger change: what kind of entity it
//! touched, the serialized before/after values, and the per-category share
//! and cost movements the change caused across the breakdown.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BudgetCategory, Money, Percentage};

use super::diff::{category_diff, ledger_changes};

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// What part of the budget an entry is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// The budget as a whole (plan, total changes)
    Budget,
    Category,
    Preferences,
    /// An assistant proposal that was merged
    Proposal,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Budget => write!(f, "Budget"),
            EntityType::Category => write!(f, "Category"),
            EntityType::Preferences => write!(f, "Preferences"),
            EntityType::Proposal => write!(f, "Proposal"),
        }
    }
}

/// How one category's share and estimate moved
///
/// `None` on the before side means the category was added; on the after
/// side, that it left the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryChange {
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_before: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_after: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_before: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_after: Option<Money>,
}

impl CategoryChange {
    /// The movement between two versions of a category, if anything moved
    pub fn between(before: Option<&BudgetCategory>, after: Option<&BudgetCategory>) -> Option<Self> {
        if let (Some(b), Some(a)) = (before, after) {
            if b.percentage == a.percentage && b.estimated_cost() == a.estimated_cost() {
                return None;
            }
        }
        let category_id = after.or(before)?.id.to_string();
        Some(Self {
            category_id,
            share_before: before.map(|c| c.percentage),
            share_after: after.map(|c| c.percentage),
            cost_before: before.map(|c| c.estimated_cost()),
            cost_after: after.map(|c| c.estimated_cost()),
        })
    }

    /// Signed share movement; a removed category counts its whole share
    pub fn share_delta(&self) -> Percentage {
        self.share_after.unwrap_or_default() - self.share_before.unwrap_or_default()
    }

    /// Signed estimate movement
    pub fn cost_delta(&self) -> Money {
        self.cost_after.unwrap_or_default() - self.cost_before.unwrap_or_default()
    }
}

impl fmt::Display for CategoryChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = &self.category_id;
        match (self.share_before, self.share_after) {
            (None, Some(after)) => write!(f, "{}: (added) -> {}", id, after),
            (Some(before), None) => write!(f, "{}: {} -> (removed)", id, before),
            (Some(before), Some(after)) if before != after => {
                write!(f, "{}: {} -> {}", id, before, after)
            }
            _ => write!(
                f,
                "{}: {} -> {}",
                id,
                self.cost_before.unwrap_or_default(),
                self.cost_after.unwrap_or_default()
            ),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    /// Category id, proposal id, or `budget` / `preferences`
    pub entity_id: String,

    /// Category name or a short label for the entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Every category whose share or estimate moved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<CategoryChange>,

    /// Human-readable diff summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn new(
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: None,
            after: None,
            changes: Vec::new(),
            diff_summary: None,
        }
    }

    /// Something new entered the budget
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Create, entity_type, entity_id, entity_name);
        entry.after = serde_json::to_value(entity).ok();
        entry
    }

    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Update, entity_type, entity_id, entity_name);
        entry.before = serde_json::to_value(before).ok();
        entry.after = serde_json::to_value(after).ok();
        entry
    }

    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Delete, entity_type, entity_id, entity_name);
        entry.before = serde_json::to_value(entity).ok();
        entry
    }

    /// A category was added; `before`/`after` are the whole breakdown
    pub fn category_added(
        added: &BudgetCategory,
        before: &[BudgetCategory],
        after: &[BudgetCategory],
    ) -> Self {
        Self::create(
            EntityType::Category,
            added.id.as_str(),
            Some(added.name.clone()),
            added,
        )
        .with_ledger_changes(before, after)
    }

    /// A category left the breakdown and the rest absorbed its share
    pub fn category_removed(
        removed: &BudgetCategory,
        before: &[BudgetCategory],
        after: &[BudgetCategory],
    ) -> Self {
        Self::delete(
            EntityType::Category,
            removed.id.as_str(),
            Some(removed.name.clone()),
            removed,
        )
        .with_ledger_changes(before, after)
    }

    /// One category changed in place
    pub fn category_updated(before: &BudgetCategory, after: &BudgetCategory) -> Self {
        let mut entry = Self::update(
            EntityType::Category,
            after.id.as_str(),
            Some(after.name.clone()),
            before,
            after,
        );
        entry.changes = CategoryChange::between(Some(before), Some(after))
            .into_iter()
            .collect();
        entry.diff_summary = category_diff(before, after);
        entry
    }

    /// Record how the whole breakdown moved and summarize it
    pub fn with_ledger_changes(mut self, before: &[BudgetCategory], after: &[BudgetCategory]) -> Self {
        self.changes = ledger_changes(before, after);
        self.diff_summary = summarize(&self.changes);
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.diff_summary = Some(summary.into());
        self
    }

    /// Sum of all share movements; zero for any change that kept the
    /// breakdown closed at 100%
    pub fn net_share_delta(&self) -> Percentage {
        self.changes.iter().map(CategoryChange::share_delta).sum()
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

pub(crate) fn summarize(changes: &[CategoryChange]) -> Option<String> {
    if changes.is_empty() {
        return None;
    }
    Some(
        changes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    )
}
