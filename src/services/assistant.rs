//! Assistant update merger
//!
//! A conversational assistant proposes partial category updates. Each patch
//! is validated on its own and either applied whole or dropped with a note;
//! a single bad patch never blocks the others. Once any patch is accepted,
//! percentages are renormalized globally: patched shares hold still and the
//! rest absorb the difference.
//!
//! An estimated cost from the assistant is a quote under the current
//! preferences. The category's preference multiplier is divided out before
//! its share is derived, so re-running the same preferences later leaves
//! the quote where it is.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::BudgetResult;
use crate::models::{BudgetCategory, BudgetData, CalculatedBudget, CategoryId, Money, Percentage, Priority};

use super::rebalance::{rebalance_categories, Rebalance};

/// Prefix of the rationale notes written for the latest proposal
pub const ASSISTANT_NOTE_PREFIX: &str = "Assistant: ";

/// A partial update to one category, addressed by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    /// Raw id as proposed; validated against the live ledger on apply
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CategoryPatch {
    /// Start a patch for a category id
    pub fn for_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Builder: set the proposed share
    pub fn with_percentage(mut self, percentage: Percentage) -> Self {
        self.percentage = Some(percentage);
        self
    }

    /// Builder: set the proposed estimated cost
    pub fn with_estimated_cost(mut self, cost: Money) -> Self {
        self.estimated_cost = Some(cost);
        self
    }

    /// Builder: set the proposed actual cost
    pub fn with_actual_cost(mut self, cost: Money) -> Self {
        self.actual_cost = Some(cost);
        self
    }

    /// Whether this patch moves the category's share
    fn changes_share(&self) -> bool {
        self.percentage.is_some() || self.estimated_cost.is_some()
    }
}

/// Who said a line in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One line of conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// What the assistant sent back
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    /// Text for the user; the engine never reads it
    #[serde(default)]
    pub reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patches: Option<Vec<CategoryPatch>>,
}

/// External conversational component that proposes category updates
pub trait AssistantGateway {
    /// Answer a message given the current snapshot and the conversation so far
    fn propose(
        &self,
        message: &str,
        current: &BudgetData,
        history: &[ChatTurn],
    ) -> BudgetResult<AssistantReply>;
}

/// Outcome of merging one proposal
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    /// Ids whose patch was applied, in patch order
    pub applied: Vec<CategoryId>,
    /// Raw ids whose patch was dropped
    pub dropped: Vec<String>,
    /// Notes appended to the rationale
    pub warnings: Vec<String>,
    pub rebalance: Rebalance,
}

impl MergeReport {
    /// Check if anything was applied
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Validates and applies assistant patches
#[derive(Debug, Clone, Copy, Default)]
pub struct AssistantUpdateMerger;

impl AssistantUpdateMerger {
    /// Merge a proposal into `current`
    ///
    /// Patch ids are checked against `current`, so callers must pass the
    /// live state rather than whatever was sent to the assistant. Warnings
    /// are appended to `rationale.notes` of the returned budget, replacing
    /// the notes of the previous proposal.
    pub fn merge_proposal(
        current: &CalculatedBudget,
        proposal: &[CategoryPatch],
        total_budget: Money,
    ) -> (CalculatedBudget, MergeReport) {
        let mut budget = current.clone();
        let mut locked = vec![false; budget.categories.len()];
        let mut report = MergeReport {
            applied: Vec::new(),
            dropped: Vec::new(),
            warnings: Vec::new(),
            rebalance: Rebalance::Unchanged,
        };

        for patch in proposal {
            let position = CategoryId::parse(&patch.id)
                .ok()
                .and_then(|id| budget.position(&id).map(|i| (id, i)));

            let Some((id, index)) = position else {
                warn!(id = %patch.id, "Dropping assistant update for unknown category");
                report.dropped.push(patch.id.clone());
                report.warnings.push(format!(
                    "Ignored update for unknown category '{}'.",
                    patch.id
                ));
                continue;
            };

            match Self::apply_patch(&budget.categories[index], patch, total_budget) {
                Ok((updated, mut warnings)) => {
                    debug!(category = %id, "Accepted assistant update");
                    budget.categories[index] = updated;
                    locked[index] |= patch.changes_share();
                    report.applied.push(id);
                    report.warnings.append(&mut warnings);
                }
                Err(reason) => {
                    warn!(category = %id, reason = %reason, "Rejecting assistant update");
                    report.dropped.push(patch.id.clone());
                    report.warnings.push(format!(
                        "Rejected update for '{}': {}.",
                        id, reason
                    ));
                }
            }
        }

        let mut notes = Vec::new();
        if report.changed() {
            report.rebalance = rebalance_categories(&mut budget.categories, &locked, total_budget);
            notes.extend(report.rebalance.describe());
        }
        notes.extend(report.warnings.iter().cloned());

        if !proposal.is_empty() {
            let rationale = &mut budget.rationale.notes;
            rationale.retain(|n| !n.starts_with(ASSISTANT_NOTE_PREFIX));
            rationale.extend(notes.into_iter().map(|n| format!("{}{}", ASSISTANT_NOTE_PREFIX, n)));
        }

        (budget, report)
    }

    /// Apply one patch to a copy of the category, or explain why not
    fn apply_patch(
        category: &BudgetCategory,
        patch: &CategoryPatch,
        total_budget: Money,
    ) -> Result<(BudgetCategory, Vec<String>), String> {
        let mut updated = category.clone();
        let mut warnings = Vec::new();

        if let Some(name) = &patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err("the name cannot be empty".into());
            }
            updated.name = name.to_string();
        }

        if let Some(percentage) = patch.percentage {
            if percentage.is_negative() || percentage > Percentage::HUNDRED {
                return Err(format!("share {} is outside 0-100%", percentage));
            }
        }

        if let Some(actual) = patch.actual_cost {
            if actual.is_negative() {
                return Err(format!("actual cost {} is negative", actual));
            }
            if actual > Money::MAX_INPUT {
                return Err(format!("actual cost {} is too large", actual));
            }
            updated.set_actual_cost(actual);
        }

        if let Some(mut estimate) = patch.estimated_cost {
            if estimate.is_negative() {
                warnings.push(format!(
                    "Clamped negative estimated cost for '{}' ({}) to {}.",
                    category.id,
                    estimate,
                    Money::zero()
                ));
                estimate = Money::zero();
            }
            if estimate > total_budget {
                return Err(format!(
                    "estimated cost {} exceeds the total budget of {}",
                    estimate, total_budget
                ));
            }
            updated.set_quoted_estimate(estimate);
            updated.percentage = updated.unadjusted_cost().max(Money::zero()).share_of(total_budget);
        } else if let Some(percentage) = patch.percentage {
            updated.rescale_to(percentage, total_budget);
        }

        if let Some(priority) = patch.priority {
            updated.priority = priority;
        }
        if let Some(rationale) = &patch.rationale {
            updated.rationale = rationale.clone();
        }
        if let Some(notes) = &patch.notes {
            updated.notes = Some(notes.clone()).filter(|n| !n.trim().is_empty());
        }

        updated.validate().map_err(|e| e.to_string())?;
        Ok((updated, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetRationale, DayOfWeek};
    use crate::services::rebalance::verify_categories;

    fn total() -> Money {
        Money::from_units(40_000)
    }

    fn budget() -> CalculatedBudget {
        CalculatedBudget {
            categories: [("Venue", 5000), ("Catering", 3000), ("Flowers", 2000)]
                .iter()
                .map(|&(name, bp)| {
                    let pct = Percentage::from_basis_points(bp);
                    BudgetCategory::named(name, pct)
                        .with_estimated_cost(Money::percentage_of(total(), pct))
                })
                .collect(),
            rationale: BudgetRationale {
                total_budget: "Total budget of $40000.00".into(),
                location_factor: 1.0,
                seasonal_factor: 1.0,
                notes: Vec::new(),
            },
            day_of_week: DayOfWeek::Saturday,
            adjusted_factors: None,
        }
    }

    fn cat<'a>(budget: &'a CalculatedBudget, id: &str) -> &'a BudgetCategory {
        budget.category(&CategoryId::parse(id).unwrap()).unwrap()
    }

    #[test]
    fn test_unknown_id_is_dropped_and_others_applied() {
        let patches = vec![
            CategoryPatch::for_id("parking").with_estimated_cost(Money::from_units(500)),
            CategoryPatch::for_id("flowers").with_estimated_cost(Money::from_units(4_000)),
        ];

        let (merged, report) = AssistantUpdateMerger::merge_proposal(&budget(), &patches, total());

        assert_eq!(report.dropped, vec!["parking".to_string()]);
        assert_eq!(report.applied.len(), 1);
        assert!(merged
            .rationale
            .notes
            .iter()
            .any(|n| n == "Assistant: Ignored update for unknown category 'parking'."));
        assert_eq!(cat(&merged, "flowers").estimated_cost(), Money::from_units(4_000));
        assert_eq!(cat(&merged, "flowers").percentage, Percentage::from_percent(10.0));
        assert_eq!(merged.total_percentage(), Percentage::HUNDRED);
        assert!(verify_categories(&merged.categories).is_ok());
    }

    #[test]
    fn test_patched_share_holds_and_others_absorb() {
        let patches = vec![CategoryPatch::for_id("venue").with_percentage(Percentage::from_percent(60.0))];
        let (merged, report) = AssistantUpdateMerger::merge_proposal(&budget(), &patches, total());

        assert_eq!(cat(&merged, "venue").percentage, Percentage::from_percent(60.0));
        assert_eq!(cat(&merged, "venue").estimated_cost(), Money::from_units(24_000));
        // 30/20 split of the remaining 40%
        assert_eq!(cat(&merged, "catering").percentage, Percentage::from_percent(24.0));
        assert_eq!(cat(&merged, "flowers").percentage, Percentage::from_percent(16.0));
        assert!(matches!(report.rebalance, Rebalance::Absorbed { .. }));
    }

    #[test]
    fn test_negative_estimate_is_clamped() {
        let patches = vec![CategoryPatch::for_id("flowers").with_estimated_cost(Money::from_units(-300))];
        let (merged, report) = AssistantUpdateMerger::merge_proposal(&budget(), &patches, total());

        assert_eq!(cat(&merged, "flowers").estimated_cost(), Money::zero());
        assert_eq!(cat(&merged, "flowers").percentage, Percentage::zero());
        assert!(report.warnings.iter().any(|w| w.starts_with("Clamped negative")));
        assert_eq!(merged.total_percentage(), Percentage::HUNDRED);
    }

    #[test]
    fn test_bad_patch_is_rejected_whole() {
        let mut patch = CategoryPatch::for_id("catering")
            .with_estimated_cost(Money::from_units(9_000))
            .with_actual_cost(Money::from_units(-5));
        patch.name = Some("Food".into());

        let (merged, report) = AssistantUpdateMerger::merge_proposal(&budget(), &[patch], total());

        assert_eq!(report.dropped, vec!["catering".to_string()]);
        assert_eq!(cat(&merged, "catering").name, "Catering");
        assert_eq!(cat(&merged, "catering").estimated_cost(), Money::from_units(12_000));
        assert_eq!(report.rebalance, Rebalance::Unchanged);
    }

    #[test]
    fn test_out_of_range_share_rejected() {
        let patches = vec![CategoryPatch::for_id("venue").with_percentage(Percentage::from_percent(140.0))];
        let (merged, report) = AssistantUpdateMerger::merge_proposal(&budget(), &patches, total());
        assert!(!report.changed());
        assert_eq!(merged.categories, budget().categories);
    }

    #[test]
    fn test_empty_proposal_is_noop() {
        let (merged, report) = AssistantUpdateMerger::merge_proposal(&budget(), &[], total());
        assert_eq!(merged, budget());
        assert!(!report.changed());
    }

    #[test]
    fn test_patch_deserializes_from_assistant_json() {
        let json = r#"{
            "reply": "Moved some money into flowers.",
            "patches": [
                {"id": "flowers", "estimatedCost": 500000, "notes": "Peonies"},
                {"id": "Not A Slug!", "percentage": 5}
            ]
        }"#;
        let reply: AssistantReply = serde_json::from_str(json).unwrap();
        let patches = reply.patches.unwrap();
        assert_eq!(patches[0].estimated_cost, Some(Money::from_units(5_000)));
        assert_eq!(patches[1].percentage, Some(Percentage::from_percent(5.0)));

        let (merged, report) = AssistantUpdateMerger::merge_proposal(&budget(), &patches, total());
        assert_eq!(report.dropped, vec!["Not A Slug!".to_string()]);
        assert_eq!(cat(&merged, "flowers").notes.as_deref(), Some("Peonies"));
    }
}
