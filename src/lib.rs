//! Wedding budget allocation engine
//!
//! Turns a total budget, guest count, location and wedding date into a
//! category breakdown that always sums to 100%, then keeps it balanced as
//! categories are removed, merged, added, re-weighted by preferences or
//! patched by an assistant.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `models`: Core data models (money, percentages, categories, snapshots)
//! - `services`: Factor lookup, allocation, preferences, the category
//!   ledger, assistant merging and the planning session
//! - `storage`: Persistence gateway with JSON file and in-memory stores
//! - `audit`: Audit logging system
//! - `config`: Configuration and path management
//! - `export`: JSON, YAML and CSV export
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `wedbudget` binary
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust
//! use wedding_budget::models::{BudgetLocation, BudgetPreferences, CategoryId, Money, Percentage};
//! use wedding_budget::services::{BudgetPlanner, PlanRequest};
//! use wedding_budget::storage::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let request = PlanRequest {
//!     total_budget: Money::from_units(40_000),
//!     guest_count: 100,
//!     location: BudgetLocation::new("Austin", "United States").with_wedding_date("2026-10-10"),
//!     preferences: BudgetPreferences::default(),
//! };
//! let mut planner = BudgetPlanner::start(&store, request)?;
//! planner.remove_category(&CategoryId::parse("favors")?)?;
//! assert_eq!(planner.ledger().budget().total_percentage(), Percentage::HUNDRED);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{BudgetError, BudgetResult};
