//! Allocation calculator
//!
//! Turns a total budget, a guest count and resolved factors into the initial
//! category breakdown. Factors inflate or deflate the absolute cost of the
//! location/season-sensitive categories; guest-count floors can raise
//! catering and favors. Those categories are then locked and every other
//! category absorbs the difference proportionally so the shares close at
//! exactly 100%.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{
    AdjustedFactors, BudgetCategory, BudgetPreferences, BudgetRationale, CalculatedBudget,
    CategoryId, CostRange, Money, Percentage, Priority,
};

use super::factors::{Factors, DESTINATION_SURCHARGE};
use super::preferences::PreferenceAdjuster;
use super::rebalance::rebalance_categories;

/// One row of the baseline allocation table
#[derive(Debug, Clone, Copy)]
pub struct BaselineEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub basis_points: i64,
    pub priority: Priority,
    /// Whether location and seasonal factors apply to this category's cost
    pub factor_sensitive: bool,
    pub rationale: &'static str,
}

/// The default split of a wedding budget
pub const BASELINE: &[BaselineEntry] = &[
    BaselineEntry {
        id: "venue",
        name: "Venue",
        basis_points: 3000,
        priority: Priority::High,
        factor_sensitive: true,
        rationale: "Ceremony and reception space is usually the largest single expense.",
    },
    BaselineEntry {
        id: "catering",
        name: "Catering",
        basis_points: 2500,
        priority: Priority::High,
        factor_sensitive: true,
        rationale: "Food, drink and service scale with the guest list.",
    },
    BaselineEntry {
        id: "photography",
        name: "Photography",
        basis_points: 1000,
        priority: Priority::High,
        factor_sensitive: false,
        rationale: "Photos and video are the lasting record of the day.",
    },
    BaselineEntry {
        id: "attire",
        name: "Attire",
        basis_points: 800,
        priority: Priority::Medium,
        factor_sensitive: false,
        rationale: "Dress, suit, alterations, hair and makeup.",
    },
    BaselineEntry {
        id: "flowers",
        name: "Flowers",
        basis_points: 800,
        priority: Priority::Medium,
        factor_sensitive: false,
        rationale: "Bouquets, centerpieces and ceremony florals.",
    },
    BaselineEntry {
        id: "entertainment",
        name: "Entertainment",
        basis_points: 800,
        priority: Priority::Medium,
        factor_sensitive: true,
        rationale: "Music for the ceremony and reception.",
    },
    BaselineEntry {
        id: "stationery",
        name: "Stationery",
        basis_points: 300,
        priority: Priority::Low,
        factor_sensitive: false,
        rationale: "Save-the-dates, invitations and day-of paper goods.",
    },
    BaselineEntry {
        id: "transportation",
        name: "Transportation",
        basis_points: 300,
        priority: Priority::Low,
        factor_sensitive: false,
        rationale: "Getting the couple and wedding party between locations.",
    },
    BaselineEntry {
        id: "favors",
        name: "Favors",
        basis_points: 200,
        priority: Priority::Low,
        factor_sensitive: false,
        rationale: "Small thank-you gifts for guests.",
    },
    BaselineEntry {
        id: "contingency",
        name: "Contingency",
        basis_points: 300,
        priority: Priority::Medium,
        factor_sensitive: false,
        rationale: "Reserve for overruns and forgotten items.",
    },
];

/// Check that the baseline table closes at exactly 100%
pub fn verify_baseline() -> BudgetResult<()> {
    let total: i64 = BASELINE.iter().map(|e| e.basis_points).sum();
    if total != Percentage::HUNDRED.basis_points() {
        return Err(BudgetError::InvariantViolation(format!(
            "baseline allocation sums to {} instead of 100%",
            Percentage::from_basis_points(total)
        )));
    }
    Ok(())
}

/// Tunable constants for the allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllocationPolicy {
    /// Catering never drops below this much per guest
    pub catering_per_guest_minimum: Money,
    /// Favors never drop below this much per guest
    pub favors_per_guest_minimum: Money,
    /// Lower end of the plausible cost band, as a fraction of the estimate
    pub range_low: f64,
    /// Upper end of the plausible cost band, as a fraction of the estimate
    pub range_high: f64,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            catering_per_guest_minimum: Money::from_units(50),
            favors_per_guest_minimum: Money::from_units(3),
            range_low: 0.8,
            range_high: 1.25,
        }
    }
}

impl AllocationPolicy {
    /// Per-guest floor for a baseline category, if it has one
    fn per_guest_minimum(&self, id: &str) -> Option<Money> {
        match id {
            "catering" => Some(self.catering_per_guest_minimum),
            "favors" => Some(self.favors_per_guest_minimum),
            _ => None,
        }
    }

    /// Validate the policy
    pub fn validate(&self) -> BudgetResult<()> {
        if self.catering_per_guest_minimum.is_negative() || self.favors_per_guest_minimum.is_negative() {
            return Err(BudgetError::Config(
                "per-guest minimums cannot be negative".into(),
            ));
        }
        if !(self.range_low > 0.0 && self.range_low <= 1.0 && self.range_high >= 1.0) {
            return Err(BudgetError::Config(format!(
                "cost range spread {}..{} must bracket 1.0",
                self.range_low, self.range_high
            )));
        }
        Ok(())
    }
}

/// Produces the initial category breakdown
#[derive(Debug, Clone, Default)]
pub struct AllocationCalculator {
    policy: AllocationPolicy,
}

impl AllocationCalculator {
    /// Create a calculator with a custom policy
    pub fn new(policy: AllocationPolicy) -> Self {
        Self { policy }
    }

    /// The policy in use
    pub fn policy(&self) -> &AllocationPolicy {
        &self.policy
    }

    /// Calculate the breakdown for a wedding
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the total budget is not positive or there are no
    /// guests. `InvariantViolation` if the baseline table itself is broken.
    pub fn calculate(
        &self,
        total_budget: Money,
        guest_count: u32,
        factors: &Factors,
        preferences: Option<&BudgetPreferences>,
    ) -> BudgetResult<CalculatedBudget> {
        if !total_budget.is_positive() || total_budget > Money::MAX_INPUT {
            return Err(BudgetError::InvalidInput(format!(
                "total budget must be positive and at most {}, got {}",
                Money::MAX_INPUT, total_budget
            )));
        }
        if guest_count == 0 {
            return Err(BudgetError::InvalidInput(
                "guest count must be at least 1".into(),
            ));
        }
        if let Some(preferences) = preferences {
            preferences.validate()?;
        }
        verify_baseline()?;

        let combined = factors.location_factor * factors.seasonal_factor;
        let factors_apply = !is_neutral(combined);
        let mut notes = Vec::new();
        let mut categories = Vec::with_capacity(BASELINE.len());
        let mut locked = Vec::with_capacity(BASELINE.len());

        for entry in BASELINE {
            let share = Percentage::from_basis_points(entry.basis_points);
            let mut cost = Money::percentage_of(total_budget, share);
            let mut is_locked = false;

            if entry.factor_sensitive && factors_apply {
                cost = cost.scaled(combined);
                is_locked = true;
            }

            if let Some(minimum) = self.policy.per_guest_minimum(entry.id) {
                let floor = Money::from_cents(minimum.cents() * guest_count as i64).round_to_unit();
                if floor > cost {
                    notes.push(format!(
                        "{} raised to the per-guest minimum of {} for {} guests ({}).",
                        entry.name, minimum, guest_count, floor
                    ));
                    cost = floor;
                    is_locked = true;
                }
            }

            let id = CategoryId::parse(entry.id)
                .map_err(|e| BudgetError::InvariantViolation(format!("baseline id: {}", e)))?;
            let category = BudgetCategory::new(id, entry.name, cost.share_of(total_budget))
                .with_priority(entry.priority)
                .with_rationale(entry.rationale)
                .with_estimated_cost(cost);

            debug!(category = entry.id, cost = %cost, locked = is_locked, "Allocated category");
            categories.push(category);
            locked.push(is_locked);
        }

        let rebalance = rebalance_categories(&mut categories, &locked, total_budget);

        let mut factor_notes = self.factor_notes(factors);
        factor_notes.append(&mut notes);
        let mut notes = factor_notes;
        if let Some(sentence) = rebalance.describe() {
            notes.push(sentence);
        }

        for category in &mut categories {
            category.ranges = Some(CostRange::around(
                category.estimated_cost(),
                self.policy.range_low,
                self.policy.range_high,
            ));
        }

        let mut service = false;
        if let Some(preferences) = preferences {
            let adjusted = PreferenceAdjuster::apply(&categories, preferences);
            service = adjusted != categories;
            categories = adjusted;
            notes.extend(PreferenceAdjuster::describe(preferences));
        }

        let adjusted_factors = AdjustedFactors {
            seasonal: !is_neutral(factors.seasonal_factor),
            location: !is_neutral(factors.location_factor),
            service,
        };

        Ok(CalculatedBudget {
            categories,
            rationale: BudgetRationale {
                total_budget: describe_total(total_budget, guest_count),
                location_factor: factors.location_factor,
                seasonal_factor: factors.seasonal_factor,
                notes,
            },
            day_of_week: factors.day_of_week,
            adjusted_factors: adjusted_factors.any().then_some(adjusted_factors),
        })
    }

    fn factor_notes(&self, factors: &Factors) -> Vec<String> {
        let mut notes = Vec::new();

        if !is_neutral(factors.location_factor) {
            notes.push(format!(
                "Location cost factor of {:.2}x applied to venue, catering and entertainment.",
                factors.location_factor
            ));
            if factors.destination {
                notes.push(format!(
                    "Destination wedding surcharge of {:.2}x is included in the location factor.",
                    DESTINATION_SURCHARGE
                ));
            }
        }

        if !is_neutral(factors.seasonal_factor) {
            let direction = if factors.seasonal_factor > 1.0 { "premium" } else { "discount" };
            notes.push(format!(
                "Seasonal {} of {:.2}x for a {} wedding (month {:.2}x, day {:.2}x).",
                direction,
                factors.seasonal_factor,
                factors.day_of_week,
                factors.month_factor,
                factors.day_factor
            ));
        }

        notes
    }
}

/// Human-readable description of the total budget
pub fn describe_total(total_budget: Money, guest_count: u32) -> String {
    let per_guest = total_budget.scaled_by_ratio(1, guest_count.max(1) as i64);
    format!(
        "Total budget of {} for {} guests ({} per guest)",
        total_budget, guest_count, per_guest
    )
}

fn is_neutral(factor: f64) -> bool {
    (factor - 1.0).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetLocation, DayOfWeek};
    use crate::services::factors::FactorResolver;
    use crate::services::rebalance::verify_categories;
    use chrono::NaiveDate;

    fn factors(city: &str, date: &str) -> Factors {
        let location = BudgetLocation::new(city, "Atlantis");
        FactorResolver::resolve(&location, NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap())
    }

    fn cost_of(budget: &CalculatedBudget, id: &str) -> Money {
        budget
            .category(&CategoryId::parse(id).unwrap())
            .unwrap()
            .estimated_cost()
    }

    #[test]
    fn test_baseline_sums_to_hundred() {
        assert!(verify_baseline().is_ok());
        assert_eq!(BASELINE.len(), 10);
    }

    #[test]
    fn test_neutral_factors_reproduce_baseline() {
        // April Tuesday 1.0 * 0.85 is not neutral, so build neutral factors by hand.
        let mut neutral = factors("Nowhere", "2025-04-15");
        neutral.seasonal_factor = 1.0;
        let budget = AllocationCalculator::default()
            .calculate(Money::from_units(40_000), 100, &neutral, None)
            .unwrap();

        assert_eq!(budget.total_percentage(), Percentage::HUNDRED);
        assert_eq!(cost_of(&budget, "venue"), Money::from_units(12_000));
        assert_eq!(cost_of(&budget, "favors"), Money::from_units(800));
        assert!(budget.rationale.notes.is_empty());
        assert!(budget.adjusted_factors.is_none());
    }

    #[test]
    fn test_weekday_catering_cheaper_than_saturday() {
        let calculator = AllocationCalculator::default();
        let total = Money::from_units(40_000);

        let weekday = calculator
            .calculate(total, 100, &factors("Nowhere", "2025-04-15"), None)
            .unwrap();
        let saturday = calculator
            .calculate(total, 100, &factors("Nowhere", "2025-04-19"), None)
            .unwrap();

        assert_eq!(weekday.day_of_week, DayOfWeek::Weekday);
        assert_eq!(cost_of(&weekday, "catering"), Money::from_units(8_500));
        assert_eq!(cost_of(&saturday, "catering"), Money::from_units(11_500));
        assert!(cost_of(&weekday, "catering") < cost_of(&saturday, "catering"));
        assert_eq!(weekday.total_percentage(), Percentage::HUNDRED);
        assert_eq!(saturday.total_percentage(), Percentage::HUNDRED);
    }

    #[test]
    fn test_excess_is_absorbed_by_unaffected_categories() {
        let budget = AllocationCalculator::default()
            .calculate(
                Money::from_units(40_000),
                100,
                &factors("Nowhere", "2025-04-19"),
                None,
            )
            .unwrap();

        let photography = budget
            .category(&CategoryId::parse("photography").unwrap())
            .unwrap();
        assert!(photography.percentage < Percentage::from_percent(10.0));
        assert!(budget
            .rationale
            .notes
            .iter()
            .any(|n| n.contains("reduced proportionally")));
        assert!(verify_categories(&budget.categories).is_ok());
        assert_eq!(budget.adjusted_factors.map(|f| f.seasonal), Some(true));
    }

    #[test]
    fn test_per_guest_floor_wins() {
        let mut neutral = factors("Nowhere", "2025-04-15");
        neutral.seasonal_factor = 1.0;
        // 25% of 20000 is 5000, but 300 guests at 50 each need 15000.
        let budget = AllocationCalculator::default()
            .calculate(Money::from_units(20_000), 300, &neutral, None)
            .unwrap();

        assert_eq!(cost_of(&budget, "catering"), Money::from_units(15_000));
        assert_eq!(budget.total_percentage(), Percentage::HUNDRED);
        assert!(budget
            .rationale
            .notes
            .iter()
            .any(|n| n.starts_with("Catering raised to the per-guest minimum")));
    }

    #[test]
    fn test_no_negative_costs_when_floors_exceed_budget() {
        let mut neutral = factors("Nowhere", "2025-04-15");
        neutral.seasonal_factor = 1.0;
        let budget = AllocationCalculator::default()
            .calculate(Money::from_units(5_000), 500, &neutral, None)
            .unwrap();

        assert!(budget
            .categories
            .iter()
            .all(|c| !c.estimated_cost().is_negative()));
        assert!(verify_categories(&budget.categories).is_ok());
    }

    #[test]
    fn test_ranges_bracket_estimates() {
        let budget = AllocationCalculator::default()
            .calculate(
                Money::from_units(40_000),
                100,
                &factors("Nowhere", "2025-04-19"),
                None,
            )
            .unwrap();

        for category in &budget.categories {
            let range = category.ranges.unwrap();
            assert!(range.min <= category.estimated_cost());
            assert!(range.max >= category.estimated_cost());
        }
    }

    #[test]
    fn test_preferences_mark_service_adjustment() {
        let prefs = BudgetPreferences {
            transportation_type: Some("Limo".into()),
            ..Default::default()
        };
        let budget = AllocationCalculator::default()
            .calculate(
                Money::from_units(40_000),
                100,
                &factors("Nowhere", "2025-04-19"),
                Some(&prefs),
            )
            .unwrap();

        assert_eq!(budget.adjusted_factors.map(|f| f.service), Some(true));
        assert_eq!(budget.total_percentage(), Percentage::HUNDRED);
    }

    #[test]
    fn test_invalid_inputs() {
        let calculator = AllocationCalculator::default();
        let f = factors("Nowhere", "2025-04-19");

        let err = calculator.calculate(Money::zero(), 100, &f, None).unwrap_err();
        assert!(err.is_invalid_input());

        let err = calculator
            .calculate(Money::from_units(-10), 100, &f, None)
            .unwrap_err();
        assert!(err.is_invalid_input());

        let err = calculator
            .calculate(Money::from_units(40_000), 0, &f, None)
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_policy_defaults_and_validation() {
        let policy: AllocationPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, AllocationPolicy::default());
        assert!(policy.validate().is_ok());

        let bad = AllocationPolicy {
            range_low: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
