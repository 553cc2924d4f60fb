//! Budget category model
//!
//! A category is one line item of wedding spend. Its `remaining` balance is
//! never stored on its own: the cost fields are private and every setter
//! recomputes `remaining = estimated_cost - actual_cost`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::contract::Contract;
use super::ids::CategoryId;
use super::money::Money;
use super::percentage::Percentage;

/// How important a category is to the couple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

/// Plausible cost band for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: Money,
    pub max: Money,
}

impl CostRange {
    /// Build a band around an estimate using fractional spreads
    pub fn around(estimate: Money, low: f64, high: f64) -> Self {
        Self {
            min: estimate.scaled(low),
            max: estimate.scaled(high),
        }
    }

    /// Scale both ends by an exact ratio
    pub fn scaled_by_ratio(&self, numerator: i64, denominator: i64) -> Self {
        Self {
            min: self.min.scaled_by_ratio(numerator, denominator),
            max: self.max.scaled_by_ratio(numerator, denominator),
        }
    }
}

/// The preference multiplier currently baked into an estimate
///
/// `base` is the preference-sensitive part of the estimate before any
/// multiplier. Money outside it (merged in from another category, or left
/// over from rounding) is never re-weighted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceAdjustment {
    pub base: Money,
    pub multiplier: f64,
}

impl PreferenceAdjustment {
    /// No multiplier on top of `base`
    pub fn neutral(base: Money) -> Self {
        Self {
            base,
            multiplier: 1.0,
        }
    }

    /// `base` with the multiplier applied, rounded to a whole unit
    pub fn adjusted(&self) -> Money {
        self.base.scaled(self.multiplier)
    }
}

/// A single line item of the wedding budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CategoryRecord")]
pub struct BudgetCategory {
    pub id: CategoryId,
    pub name: String,
    pub percentage: Percentage,
    estimated_cost: Money,
    actual_cost: Money,
    remaining: Money,
    pub priority: Priority,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranges: Option<CostRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contracts: Vec<Contract>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<PreferenceAdjustment>,
}

/// Wire shape of a category; `remaining` is ignored on read and recomputed
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryRecord {
    id: CategoryId,
    name: String,
    percentage: Percentage,
    #[serde(default)]
    estimated_cost: Money,
    #[serde(default)]
    actual_cost: Money,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    rationale: String,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    ranges: Option<CostRange>,
    #[serde(default)]
    contracts: Vec<Contract>,
    #[serde(default)]
    preference: Option<PreferenceAdjustment>,
}

impl From<CategoryRecord> for BudgetCategory {
    fn from(record: CategoryRecord) -> Self {
        let mut category = BudgetCategory {
            id: record.id,
            name: record.name,
            percentage: record.percentage,
            estimated_cost: record.estimated_cost,
            actual_cost: record.actual_cost,
            remaining: Money::zero(),
            priority: record.priority,
            rationale: record.rationale,
            notes: record.notes,
            ranges: record.ranges,
            contracts: record.contracts,
            preference: record.preference,
        };
        category.recompute_remaining();
        category
    }
}

impl BudgetCategory {
    /// Create a new category with no costs yet
    pub fn new(id: CategoryId, name: impl Into<String>, percentage: Percentage) -> Self {
        Self {
            id,
            name: name.into(),
            percentage,
            estimated_cost: Money::zero(),
            actual_cost: Money::zero(),
            remaining: Money::zero(),
            priority: Priority::default(),
            rationale: String::new(),
            notes: None,
            ranges: None,
            contracts: Vec::new(),
            preference: None,
        }
    }

    /// Create a category whose id is derived from its name
    pub fn named(name: &str, percentage: Percentage) -> Self {
        Self::new(CategoryId::from_name(name), name.trim(), percentage)
    }

    /// Builder: set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Builder: set the rationale
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    /// Builder: set the estimated cost
    pub fn with_estimated_cost(mut self, cost: Money) -> Self {
        self.set_estimated_cost(cost);
        self
    }

    /// Estimated cost for this category
    pub fn estimated_cost(&self) -> Money {
        self.estimated_cost
    }

    /// Money already spent or committed
    pub fn actual_cost(&self) -> Money {
        self.actual_cost
    }

    /// `estimated_cost - actual_cost`; may be negative when over budget
    pub fn remaining(&self) -> Money {
        self.remaining
    }

    /// Set the estimated cost and recompute `remaining`
    pub fn set_estimated_cost(&mut self, cost: Money) {
        self.estimated_cost = cost;
        self.recompute_remaining();
    }

    /// Set the actual cost and recompute `remaining`
    pub fn set_actual_cost(&mut self, cost: Money) {
        self.actual_cost = cost;
        self.recompute_remaining();
    }

    /// Check if spending has gone past the estimate
    pub fn is_over_budget(&self) -> bool {
        self.remaining.is_negative()
    }

    /// Move this category to a new share, scaling its cost with the share
    ///
    /// Costs scale by the exact ratio of the new share to the old one, which
    /// keeps any preference multiplier baked into the estimate. A category
    /// that had no share yet takes its plain share of `total_budget`, with
    /// the active multiplier on top.
    pub fn rescale_to(&mut self, percentage: Percentage, total_budget: Money) {
        let old = self.percentage.basis_points();
        let new = percentage.basis_points();
        if old == 0 || self.estimated_cost.is_zero() {
            let plain = Money::percentage_of(total_budget, percentage);
            match self.preference.as_mut() {
                Some(preference) => {
                    preference.base = plain;
                    let cost = preference.adjusted();
                    self.set_estimated_cost(cost);
                }
                None => self.set_estimated_cost(plain),
            }
        } else if old != new {
            self.scale_costs(new, old);
        }
        self.percentage = percentage;
    }

    /// Scale the estimate, ranges and preference base by `numerator / denominator`
    pub fn scale_costs(&mut self, numerator: i64, denominator: i64) {
        let cost = self.estimated_cost.scaled_by_ratio(numerator, denominator);
        self.set_estimated_cost(cost);
        self.ranges = self.ranges.map(|r| r.scaled_by_ratio(numerator, denominator));
        if let Some(preference) = self.preference.as_mut() {
            preference.base = preference.base.scaled_by_ratio(numerator, denominator);
        }
    }

    /// The estimate with the preference multiplier divided out
    pub fn unadjusted_cost(&self) -> Money {
        match self.preference {
            Some(preference) => self.estimated_cost - preference.adjusted() + preference.base,
            None => self.estimated_cost,
        }
    }

    /// Re-weight the preference-sensitive part of the estimate
    ///
    /// Always recomputes from the stored base: the same multiplier twice is a
    /// no-op and switching multipliers never compounds.
    pub fn apply_preference_multiplier(&mut self, multiplier: f64) {
        let current = self
            .preference
            .unwrap_or_else(|| PreferenceAdjustment::neutral(self.estimated_cost));
        if (current.multiplier - multiplier).abs() < 1e-9 {
            return;
        }

        let fixed = self.estimated_cost - current.adjusted();
        let next = PreferenceAdjustment {
            base: current.base,
            multiplier,
        };
        let previous = self.estimated_cost;
        let cost = (fixed + next.adjusted()).max(Money::zero());
        self.ranges = self
            .ranges
            .map(|r| r.scaled_by_ratio(cost.cents(), previous.cents()));
        self.set_estimated_cost(cost);
        self.preference = Some(next);
    }

    /// Replace the estimate with a cost quoted under the current preferences
    ///
    /// The preference base moves with the estimate, so the multiplier stays
    /// divided out of [`unadjusted_cost`](Self::unadjusted_cost).
    pub fn set_quoted_estimate(&mut self, cost: Money) {
        let previous = self.estimated_cost;
        if let Some(preference) = self.preference.as_mut() {
            preference.base = if previous.is_zero() {
                cost.scaled(1.0 / preference.multiplier)
            } else {
                preference.base.scaled_by_ratio(cost.cents(), previous.cents())
            };
        }
        self.ranges = self
            .ranges
            .map(|r| r.scaled_by_ratio(cost.cents(), previous.cents()));
        self.set_estimated_cost(cost);
    }

    /// Freeze the current estimate as the preference base
    ///
    /// Money added to the estimate afterwards keeps its cost when the
    /// preferences change.
    pub fn pin_preference_base(&mut self) {
        if self.preference.is_none() {
            self.preference = Some(PreferenceAdjustment::neutral(self.estimated_cost));
        }
    }

    /// Total of active (non-cancelled) contracts
    pub fn contracted_amount(&self) -> Money {
        self.contracts
            .iter()
            .filter(|c| c.is_active())
            .map(|c| c.amount)
            .sum()
    }

    /// Append a free-text note
    pub fn append_note(&mut self, note: &str) {
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, note),
            _ => note.to_string(),
        });
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.len() > 60 {
            return Err(CategoryValidationError::NameTooLong(self.name.len()));
        }

        if self.percentage.is_negative() || self.percentage > Percentage::HUNDRED {
            return Err(CategoryValidationError::PercentageOutOfRange(self.percentage));
        }

        if self.estimated_cost.is_negative() {
            return Err(CategoryValidationError::NegativeEstimate);
        }

        if self.actual_cost.is_negative() {
            return Err(CategoryValidationError::NegativeActual);
        }

        if self.remaining != self.estimated_cost - self.actual_cost {
            return Err(CategoryValidationError::StaleRemaining);
        }

        if let Some(preference) = &self.preference {
            if !preference.multiplier.is_finite()
                || preference.multiplier <= 0.0
                || preference.base.is_negative()
            {
                return Err(CategoryValidationError::BadPreferenceAdjustment);
            }
        }

        Ok(())
    }

    fn recompute_remaining(&mut self) {
        self.remaining = self.estimated_cost - self.actual_cost;
    }
}

impl fmt::Display for BudgetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    PercentageOutOfRange(Percentage),
    NegativeEstimate,
    NegativeActual,
    StaleRemaining,
    BadPreferenceAdjustment,
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 60)", len)
            }
            Self::PercentageOutOfRange(p) => {
                write!(f, "Category percentage {} is outside 0-100%", p)
            }
            Self::NegativeEstimate => write!(f, "Estimated cost cannot be negative"),
            Self::NegativeActual => write!(f, "Actual cost cannot be negative"),
            Self::StaleRemaining => write!(f, "Remaining balance is out of date"),
            Self::BadPreferenceAdjustment => {
                write!(f, "Preference adjustment needs a positive multiplier and a non-negative base")
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue() -> BudgetCategory {
        BudgetCategory::named("Venue", Percentage::from_percent(30.0))
            .with_estimated_cost(Money::from_units(12_000))
    }

    #[test]
    fn test_named_category() {
        let category = venue();
        assert_eq!(category.id.as_str(), "venue");
        assert_eq!(category.priority, Priority::Medium);
        assert!(category.contracts.is_empty());
    }

    #[test]
    fn test_remaining_tracks_costs() {
        let mut category = venue();
        assert_eq!(category.remaining(), Money::from_units(12_000));

        category.set_actual_cost(Money::from_units(13_000));
        assert_eq!(category.remaining(), Money::from_units(-1_000));
        assert!(category.is_over_budget());

        category.set_estimated_cost(Money::from_units(15_000));
        assert_eq!(category.remaining(), Money::from_units(2_000));
    }

    #[test]
    fn test_rescale_keeps_cost_ratio() {
        let mut category = venue().with_estimated_cost(Money::from_units(13_200));
        category.ranges = Some(CostRange::around(Money::from_units(13_200), 0.8, 1.25));

        category.rescale_to(Percentage::from_percent(15.0), Money::from_units(40_000));

        assert_eq!(category.percentage, Percentage::from_percent(15.0));
        assert_eq!(category.estimated_cost(), Money::from_units(6_600));
        assert_eq!(category.ranges.unwrap().min, Money::from_units(5_280));
    }

    #[test]
    fn test_rescale_from_zero_uses_plain_share() {
        let mut category = BudgetCategory::named("Rings", Percentage::zero());
        category.rescale_to(Percentage::from_percent(5.0), Money::from_units(40_000));
        assert_eq!(category.estimated_cost(), Money::from_units(2_000));
    }

    fn transportation() -> BudgetCategory {
        BudgetCategory::named("Transportation", Percentage::from_basis_points(105))
            .with_estimated_cost(Money::from_units(420))
    }

    #[test]
    fn test_preference_multiplier_recomputes_from_base() {
        let mut category = transportation();

        category.apply_preference_multiplier(1.8);
        assert_eq!(category.estimated_cost(), Money::from_units(756));
        category.apply_preference_multiplier(1.8);
        assert_eq!(category.estimated_cost(), Money::from_units(756));

        // A quote under the same preferences keeps the multiplier divided out.
        category.set_quoted_estimate(Money::from_units(756));
        assert_eq!(category.unadjusted_cost(), Money::from_units(420));
        category.apply_preference_multiplier(1.8);
        assert_eq!(category.estimated_cost(), Money::from_units(756));

        category.apply_preference_multiplier(2.2);
        assert_eq!(category.estimated_cost(), Money::from_units(924));
        category.apply_preference_multiplier(1.0);
        assert_eq!(category.estimated_cost(), Money::from_units(420));
        assert_eq!(category.percentage, Percentage::from_basis_points(105));
    }

    #[test]
    fn test_pinned_base_leaves_merged_money_alone() {
        let mut category = transportation();
        category.pin_preference_base();
        category.set_estimated_cost(category.estimated_cost() + Money::from_units(800));

        category.apply_preference_multiplier(1.5);

        assert_eq!(category.estimated_cost(), Money::from_units(1_430));
        assert_eq!(category.unadjusted_cost(), Money::from_units(1_220));
    }

    #[test]
    fn test_scale_costs_moves_preference_base() {
        let mut category = transportation();
        category.apply_preference_multiplier(1.8);

        category.scale_costs(2, 1);

        assert_eq!(category.estimated_cost(), Money::from_units(1_512));
        assert_eq!(category.preference.map(|p| p.base), Some(Money::from_units(840)));
        category.apply_preference_multiplier(1.8);
        assert_eq!(category.estimated_cost(), Money::from_units(1_512));
    }

    #[test]
    fn test_validation() {
        let mut category = venue();
        assert!(category.validate().is_ok());

        category.name = String::new();
        assert_eq!(category.validate(), Err(CategoryValidationError::EmptyName));

        category.name = "Venue".into();
        category.percentage = Percentage::from_percent(101.0);
        assert!(matches!(
            category.validate(),
            Err(CategoryValidationError::PercentageOutOfRange(_))
        ));

        category.percentage = Percentage::from_percent(30.0);
        category.set_estimated_cost(Money::from_units(-1));
        assert_eq!(
            category.validate(),
            Err(CategoryValidationError::NegativeEstimate)
        );
    }

    #[test]
    fn test_append_note() {
        let mut category = venue();
        category.append_note("Includes ceremony.");
        category.append_note("Merged from Favors.");
        assert_eq!(
            category.notes.as_deref(),
            Some("Includes ceremony. Merged from Favors.")
        );
    }

    #[test]
    fn test_deserialize_recomputes_remaining() {
        let json = r#"{
            "id": "venue",
            "name": "Venue",
            "percentage": 30.0,
            "estimatedCost": 1200000,
            "actualCost": 200000,
            "remaining": 999,
            "priority": "high",
            "rationale": "Largest line item"
        }"#;
        let category: BudgetCategory = serde_json::from_str(json).unwrap();
        assert_eq!(category.remaining(), Money::from_units(10_000));
        assert_eq!(category.priority, Priority::High);
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let json = serde_json::to_value(venue()).unwrap();
        assert_eq!(json["estimatedCost"], 1_200_000);
        assert_eq!(json["remaining"], 1_200_000);
        assert_eq!(json["percentage"], 30.0);
    }
}
