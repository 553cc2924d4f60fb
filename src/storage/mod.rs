//! Storage layer
//!
//! The planner saves a full [`BudgetData`] snapshot after every committed
//! change through a [`PersistenceGateway`]. Two implementations ship: a JSON
//! file per session with atomic writes, and an in-memory store.

pub mod file_io;
pub mod json_store;
pub mod memory;

pub use file_io::{read_json, write_json_atomic};
pub use json_store::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::BudgetResult;
use crate::models::BudgetData;

/// Where session snapshots are loaded from and saved to
pub trait PersistenceGateway {
    /// The saved snapshot, or `None` if nothing has been saved yet
    fn load(&self) -> BudgetResult<Option<BudgetData>>;

    /// Replace the saved snapshot
    fn save(&self, data: &BudgetData) -> BudgetResult<()>;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for &G {
    fn load(&self) -> BudgetResult<Option<BudgetData>> {
        (**self).load()
    }

    fn save(&self, data: &BudgetData) -> BudgetResult<()> {
        (**self).save(data)
    }
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Box<G> {
    fn load(&self) -> BudgetResult<Option<BudgetData>> {
        (**self).load()
    }

    fn save(&self, data: &BudgetData) -> BudgetResult<()> {
        (**self).save(data)
    }
}
