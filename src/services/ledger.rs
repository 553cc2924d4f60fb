//! Category ledger
//!
//! Owns the live category sequence of a planning session. Every mutation is
//! transactional: it runs against a draft copy, the draft is checked with
//! [`verify_categories`], and only then replaces the live state. A failed
//! check leaves the ledger exactly as it was.
//!
//! Structural operations do not write to `rationale.notes`; the audit log
//! records them. The rationale keeps the allocation notes, the current
//! preference notes and the notes of the latest assistant proposal.

use std::collections::BTreeSet;

use tracing::{debug, error, info};

use crate::error::{BudgetError, BudgetResult};
use crate::models::{
    AdjustedFactors, BudgetCategory, BudgetData, BudgetPreferences, CalculatedBudget, CategoryId,
    Contract, CostRange, Money, Percentage,
};

use super::assistant::{AssistantUpdateMerger, CategoryPatch, MergeReport};
use super::preferences::{PreferenceAdjuster, PREFERENCE_NOTE_PREFIX};
use super::rebalance::{rebalance_categories, verify_categories};

/// The live, invariant-checked category set of one session
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLedger {
    budget: CalculatedBudget,
    total_budget: Money,
    /// Ids removed or merged away; never handed out again
    retired: BTreeSet<CategoryId>,
}

impl CategoryLedger {
    /// Seed a ledger from a freshly calculated budget
    pub fn seed(budget: CalculatedBudget, total_budget: Money) -> BudgetResult<Self> {
        verify_categories(&budget.categories)?;
        Ok(Self {
            budget,
            total_budget,
            retired: BTreeSet::new(),
        })
    }

    /// Rebuild a ledger from a persisted snapshot
    pub fn restore(data: &BudgetData) -> BudgetResult<Self> {
        verify_categories(&data.calculated_budget.categories)?;
        if let Some(category) = data
            .calculated_budget
            .categories
            .iter()
            .find(|c| data.retired_category_ids.contains(&c.id))
        {
            return Err(BudgetError::InvariantViolation(format!(
                "category '{}' is live but marked as retired",
                category.id
            )));
        }
        Ok(Self {
            budget: data.calculated_budget.clone(),
            total_budget: data.total_budget,
            retired: data.retired_category_ids.clone(),
        })
    }

    /// The current breakdown
    pub fn budget(&self) -> &CalculatedBudget {
        &self.budget
    }

    /// Categories in display order
    pub fn categories(&self) -> &[BudgetCategory] {
        &self.budget.categories
    }

    /// Look up a category
    pub fn category(&self, id: &CategoryId) -> Option<&BudgetCategory> {
        self.budget.category(id)
    }

    pub fn total_budget(&self) -> Money {
        self.total_budget
    }

    /// Ids that can no longer be used in this session
    pub fn retired_ids(&self) -> &BTreeSet<CategoryId> {
        &self.retired
    }

    pub fn len(&self) -> usize {
        self.budget.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.budget.categories.is_empty()
    }

    /// Check if an id is live or retired
    pub fn is_taken(&self, id: &CategoryId) -> bool {
        self.budget.contains(id) || self.retired.contains(id)
    }

    /// First free id derived from a display name ("flowers", "flowers-2", ...)
    pub fn next_free_id(&self, name: &str) -> CategoryId {
        let base = CategoryId::from_name(name);
        if !self.is_taken(&base) {
            return base;
        }
        (2u32..)
            .map(|n| base.with_suffix(n))
            .find(|id| !self.is_taken(id))
            .unwrap_or(base)
    }

    /// Remove a category and spread its share over the rest
    ///
    /// Each remaining category grows in proportion to its own share; the
    /// rounding residue goes to the largest one so the total closes exactly.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is absent, `CannotRemoveLastCategory` if it is
    /// the only category left.
    pub fn remove(&mut self, id: &CategoryId) -> BudgetResult<BudgetCategory> {
        let index = self.index_of(id)?;
        if self.len() == 1 {
            return Err(BudgetError::CannotRemoveLastCategory(id.to_string()));
        }

        let removed = self.commit("remove", |draft| {
            let removed = draft.budget.categories.remove(index);
            let locked = vec![false; draft.budget.categories.len()];
            rebalance_categories(&mut draft.budget.categories, &locked, draft.total_budget);
            draft.retired.insert(removed.id.clone());
            Ok(removed)
        })?;

        info!(category = %removed.id, share = %removed.percentage, "Removed category");
        Ok(removed)
    }

    /// Fold `source` into `target`
    ///
    /// Share, estimated cost, actual cost, ranges and contracts are summed
    /// into the target; the source is deleted and its id retired. Money
    /// merged into a preference-sensitive target keeps its cost when the
    /// preferences change later.
    ///
    /// # Errors
    ///
    /// `SelfMerge` if both ids are the same, `NotFound` if either is absent.
    pub fn merge(&mut self, source: &CategoryId, target: &CategoryId) -> BudgetResult<BudgetCategory> {
        if source == target {
            return Err(BudgetError::SelfMerge(source.to_string()));
        }
        let source_index = self.index_of(source)?;
        self.index_of(target)?;

        let merged = self.commit("merge", |draft| {
            let from = draft.budget.categories.remove(source_index);
            let into_index = draft
                .budget
                .position(target)
                .ok_or_else(|| BudgetError::category_not_found(target.as_str()))?;
            let into = &mut draft.budget.categories[into_index];
            if PreferenceAdjuster::is_sensitive(into.id.as_str()) {
                into.pin_preference_base();
            }

            into.ranges = match (into.ranges, from.ranges) {
                (Some(a), Some(b)) => Some(CostRange {
                    min: a.min + b.min,
                    max: a.max + b.max,
                }),
                (Some(a), None) => Some(CostRange {
                    min: a.min + from.estimated_cost(),
                    max: a.max + from.estimated_cost(),
                }),
                (None, Some(b)) => Some(CostRange {
                    min: b.min + into.estimated_cost(),
                    max: b.max + into.estimated_cost(),
                }),
                (None, None) => None,
            };
            into.percentage += from.percentage;
            into.set_estimated_cost(into.estimated_cost() + from.estimated_cost());
            into.set_actual_cost(into.actual_cost() + from.actual_cost());
            into.contracts.extend(from.contracts.iter().cloned());
            into.append_note(&format!("Merged from {}.", from.name));

            let merged = into.clone();
            draft.retired.insert(from.id.clone());
            Ok(merged)
        })?;

        info!(source = %source, target = %target, share = %merged.percentage, "Merged categories");
        Ok(merged)
    }

    /// Insert a new category, carving its share out of the existing ones
    ///
    /// A category with a cost but no share gets the share its cost implies;
    /// one with a share but no cost gets the plain share of the total. The
    /// new share is held fixed and every other category shrinks
    /// proportionally.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the id is live or retired, the share is not below
    /// 100%, or a cost is negative or above [`Money::MAX_INPUT`].
    pub fn add(&mut self, mut category: BudgetCategory) -> BudgetResult<BudgetCategory> {
        if self.budget.contains(&category.id) {
            return Err(BudgetError::InvalidInput(format!(
                "category '{}' already exists",
                category.id
            )));
        }
        if self.retired.contains(&category.id) {
            return Err(BudgetError::InvalidInput(format!(
                "category id '{}' was retired earlier in this session",
                category.id
            )));
        }
        if category.estimated_cost().is_negative() || category.actual_cost().is_negative() {
            return Err(BudgetError::InvalidInput(
                "category costs cannot be negative".into(),
            ));
        }
        if category.estimated_cost() > Money::MAX_INPUT || category.actual_cost() > Money::MAX_INPUT {
            return Err(BudgetError::InvalidInput(format!(
                "category costs cannot exceed {}",
                Money::MAX_INPUT
            )));
        }

        if category.percentage.is_zero() && category.estimated_cost().is_positive() {
            category.percentage = category.estimated_cost().share_of(self.total_budget);
        } else if category.estimated_cost().is_zero() && category.percentage > Percentage::zero() {
            category.set_estimated_cost(Money::percentage_of(self.total_budget, category.percentage));
        }

        if category.percentage.is_negative() || category.percentage >= Percentage::HUNDRED {
            return Err(BudgetError::InvalidInput(format!(
                "a new category needs a share between 0% and 100%, got {}",
                category.percentage
            )));
        }
        category
            .validate()
            .map_err(|e| BudgetError::InvalidInput(e.to_string()))?;

        let added = self.commit("add", |draft| {
            let mut locked = vec![false; draft.budget.categories.len()];
            locked.push(true);
            draft.budget.categories.push(category);
            rebalance_categories(&mut draft.budget.categories, &locked, draft.total_budget);

            draft
                .budget
                .categories
                .last()
                .cloned()
                .ok_or_else(|| BudgetError::InvariantViolation("added category vanished".into()))
        })?;

        info!(category = %added.id, share = %added.percentage, "Added category");
        Ok(added)
    }

    /// Record what has actually been spent on a category
    pub fn record_actual_cost(&mut self, id: &CategoryId, amount: Money) -> BudgetResult<BudgetCategory> {
        if amount.is_negative() || amount > Money::MAX_INPUT {
            return Err(BudgetError::InvalidInput(format!(
                "actual cost must be between {} and {}, got {}",
                Money::zero(),
                Money::MAX_INPUT,
                amount
            )));
        }
        let index = self.index_of(id)?;

        self.commit("record_actual_cost", |draft| {
            let category = &mut draft.budget.categories[index];
            category.set_actual_cost(amount);
            Ok(category.clone())
        })
    }

    /// Attach a vendor contract to a category
    pub fn attach_contract(&mut self, id: &CategoryId, contract: Contract) -> BudgetResult<BudgetCategory> {
        if contract.amount.is_negative() || contract.amount > Money::MAX_INPUT {
            return Err(BudgetError::InvalidInput(format!(
                "contract amount must be between {} and {}",
                Money::zero(),
                Money::MAX_INPUT
            )));
        }
        if contract.name.trim().is_empty() {
            return Err(BudgetError::InvalidInput(
                "contract name cannot be empty".into(),
            ));
        }
        let index = self.index_of(id)?;

        self.commit("attach_contract", |draft| {
            let category = &mut draft.budget.categories[index];
            if category.contracts.iter().any(|c| c.id == contract.id) {
                return Err(BudgetError::InvalidInput(format!(
                    "contract {} is already attached to '{}'",
                    contract.id, category.id
                )));
            }
            category.contracts.push(contract);
            Ok(category.clone())
        })
    }

    /// Re-weight costs for a set of preferences
    ///
    /// Replaces any preference notes from an earlier run, so repeated calls
    /// with the same preferences leave the ledger unchanged.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the preferences fail [`BudgetPreferences::validate`].
    pub fn apply_preferences(&mut self, preferences: &BudgetPreferences) -> BudgetResult<()> {
        preferences.validate()?;
        self.commit("apply_preferences", |draft| {
            let adjusted = PreferenceAdjuster::apply(&draft.budget.categories, preferences);
            draft.budget.categories = adjusted;

            let notes = &mut draft.budget.rationale.notes;
            notes.retain(|n| !n.starts_with(PREFERENCE_NOTE_PREFIX));
            notes.extend(PreferenceAdjuster::describe(preferences));

            let service = !PreferenceAdjuster::effects(preferences).is_empty();
            let mut factors = draft.budget.adjusted_factors.unwrap_or_default();
            factors.service = service;
            draft.budget.adjusted_factors = factors.any().then_some(factors);
            Ok(())
        })
    }

    /// Validate and apply assistant patches against the current state
    pub fn apply_proposal(&mut self, patches: &[CategoryPatch]) -> BudgetResult<MergeReport> {
        let report = self.commit("apply_proposal", |draft| {
            let (budget, report) =
                AssistantUpdateMerger::merge_proposal(&draft.budget, patches, draft.total_budget);
            draft.budget = budget;
            Ok(report)
        })?;

        info!(
            applied = report.applied.len(),
            dropped = report.dropped.len(),
            "Applied assistant proposal"
        );
        Ok(report)
    }

    /// Change the total budget, keeping every share and scaling every estimate
    pub fn set_total_budget(&mut self, total_budget: Money, description: String) -> BudgetResult<()> {
        if !total_budget.is_positive() || total_budget > Money::MAX_INPUT {
            return Err(BudgetError::InvalidInput(format!(
                "total budget must be positive and at most {}, got {}",
                Money::MAX_INPUT,
                total_budget
            )));
        }
        let old = self.total_budget;

        self.commit("set_total_budget", |draft| {
            for category in &mut draft.budget.categories {
                category.scale_costs(total_budget.cents(), old.cents());
            }
            draft.total_budget = total_budget;
            draft.budget.rationale.total_budget = description;
            Ok(())
        })
    }

    /// Snapshot of the factors applied so far
    pub fn adjusted_factors(&self) -> Option<AdjustedFactors> {
        self.budget.adjusted_factors
    }

    fn index_of(&self, id: &CategoryId) -> BudgetResult<usize> {
        self.budget
            .position(id)
            .ok_or_else(|| BudgetError::category_not_found(id.as_str()))
    }

    /// Run `op` on a draft and swap it in only if the draft passes the check
    fn commit<T>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&mut CategoryLedger) -> BudgetResult<T>,
    ) -> BudgetResult<T> {
        let mut draft = self.clone();
        let output = op(&mut draft)?;

        if let Err(e) = verify_categories(&draft.budget.categories) {
            error!(operation, error = %e, "Ledger check failed; keeping previous state");
            return Err(e);
        }

        debug!(operation, total = %draft.budget.total_percentage(), "Committed ledger operation");
        *self = draft;
        Ok(output)
    }
}
