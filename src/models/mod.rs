//! Core data models for the wedding budget engine
//!
//! This module contains the data structures that describe a wedding budget:
//! categories, locations, preferences, contracts, and the persisted snapshot.

pub mod budget;
pub mod category;
pub mod contract;
pub mod ids;
pub mod location;
pub mod money;
pub mod percentage;
pub mod preferences;

pub use budget::{AdjustedFactors, BudgetData, BudgetRationale, CalculatedBudget, DayOfWeek};
pub use category::{BudgetCategory, CategoryValidationError, CostRange, PreferenceAdjustment, Priority};
pub use contract::{Contract, ContractStatus};
pub use ids::{CategoryId, ContractId, ProposalId};
pub use location::{parse_wedding_date, BudgetLocation};
pub use money::Money;
pub use percentage::Percentage;
pub use preferences::BudgetPreferences;
