//! Calculated budget and persisted snapshot models
//!
//! `CalculatedBudget` is the ordered category breakdown plus the rationale
//! that explains it. `BudgetData` is the unit of persistence: everything the
//! planner needs to resume a session.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::category::BudgetCategory;
use super::ids::CategoryId;
use super::location::BudgetLocation;
use super::money::Money;
use super::percentage::Percentage;
use super::preferences::BudgetPreferences;

/// Day-of-week bucket used for pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Saturday,
    Friday,
    Sunday,
    Weekday,
}

impl DayOfWeek {
    /// Bucket a calendar weekday
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sat => Self::Saturday,
            Weekday::Fri => Self::Friday,
            Weekday::Sun => Self::Sunday,
            _ => Self::Weekday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saturday => write!(f, "Saturday"),
            Self::Friday => write!(f, "Friday"),
            Self::Sunday => write!(f, "Sunday"),
            Self::Weekday => write!(f, "weekday"),
        }
    }
}

/// Which kinds of adjustment were applied to the baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustedFactors {
    pub seasonal: bool,
    pub location: bool,
    pub service: bool,
}

impl AdjustedFactors {
    /// Check if any adjustment was applied
    pub fn any(&self) -> bool {
        self.seasonal || self.location || self.service
    }
}

/// Explanation attached to a calculated budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRationale {
    pub total_budget: String,
    pub location_factor: f64,
    pub seasonal_factor: f64,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Ordered category breakdown with its rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedBudget {
    pub categories: Vec<BudgetCategory>,
    pub rationale: BudgetRationale,
    pub day_of_week: DayOfWeek,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_factors: Option<AdjustedFactors>,
}

impl CalculatedBudget {
    /// Sum of all category percentages
    pub fn total_percentage(&self) -> Percentage {
        self.categories.iter().map(|c| c.percentage).sum()
    }

    /// Sum of all estimated costs
    pub fn total_estimated(&self) -> Money {
        self.categories.iter().map(|c| c.estimated_cost()).sum()
    }

    /// Sum of all actual costs
    pub fn total_actual(&self) -> Money {
        self.categories.iter().map(|c| c.actual_cost()).sum()
    }

    /// Look up a category by id
    pub fn category(&self, id: &CategoryId) -> Option<&BudgetCategory> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Position of a category in display order
    pub fn position(&self, id: &CategoryId) -> Option<usize> {
        self.categories.iter().position(|c| &c.id == id)
    }

    /// Check if a category exists
    pub fn contains(&self, id: &CategoryId) -> bool {
        self.position(id).is_some()
    }
}

/// The full persisted snapshot of a planning session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetData {
    pub total_budget: Money,
    pub guest_count: u32,
    pub location: BudgetLocation,
    #[serde(default)]
    pub preferences: BudgetPreferences,
    pub calculated_budget: CalculatedBudget,
    pub last_updated: DateTime<Utc>,
    /// Ids removed or merged away during the session; never reissued
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub retired_category_ids: BTreeSet<CategoryId>,
}

impl BudgetData {
    /// Budget per guest, rounded to a whole unit
    pub fn per_guest(&self) -> Money {
        if self.guest_count == 0 {
            return Money::zero();
        }
        self.total_budget
            .scaled_by_ratio(1, self.guest_count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_budget() -> CalculatedBudget {
        CalculatedBudget {
            categories: vec![
                BudgetCategory::named("Venue", Percentage::from_percent(60.0))
                    .with_estimated_cost(Money::from_units(6_000)),
                BudgetCategory::named("Catering", Percentage::from_percent(40.0))
                    .with_estimated_cost(Money::from_units(4_000)),
            ],
            rationale: BudgetRationale {
                total_budget: "Total budget of $10000.00".into(),
                location_factor: 1.0,
                seasonal_factor: 1.0,
                notes: Vec::new(),
            },
            day_of_week: DayOfWeek::Saturday,
            adjusted_factors: None,
        }
    }

    #[test]
    fn test_day_of_week_buckets() {
        assert_eq!(DayOfWeek::from_weekday(Weekday::Sat), DayOfWeek::Saturday);
        assert_eq!(DayOfWeek::from_weekday(Weekday::Fri), DayOfWeek::Friday);
        assert_eq!(DayOfWeek::from_weekday(Weekday::Sun), DayOfWeek::Sunday);
        assert_eq!(DayOfWeek::from_weekday(Weekday::Tue), DayOfWeek::Weekday);
    }

    #[test]
    fn test_totals() {
        let budget = sample_budget();
        assert_eq!(budget.total_percentage(), Percentage::HUNDRED);
        assert_eq!(budget.total_estimated(), Money::from_units(10_000));
        assert_eq!(budget.total_actual(), Money::zero());
    }

    #[test]
    fn test_lookup() {
        let budget = sample_budget();
        let catering = CategoryId::parse("catering").unwrap();
        assert_eq!(budget.position(&catering), Some(1));
        assert!(budget.category(&catering).is_some());
        assert!(!budget.contains(&CategoryId::parse("parking").unwrap()));
    }

    #[test]
    fn test_snapshot_round_trip_shape() {
        let data = BudgetData {
            total_budget: Money::from_units(10_000),
            guest_count: 50,
            location: BudgetLocation::new("Austin", "United States"),
            preferences: BudgetPreferences::default(),
            calculated_budget: sample_budget(),
            last_updated: Utc::now(),
            retired_category_ids: BTreeSet::new(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["calculatedBudget"]["dayOfWeek"], "saturday");
        assert!(json.get("retiredCategoryIds").is_none());
        assert_eq!(data.per_guest(), Money::from_units(200));
    }
}
