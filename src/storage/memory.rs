//! In-memory store
//!
//! Keeps the latest snapshot in a lock and counts saves. Used for tests and
//! dry runs where nothing should touch the disk.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{BudgetError, BudgetResult};
use crate::models::BudgetData;

use super::PersistenceGateway;

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Option<BudgetData>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that starts out holding a snapshot
    pub fn with_data(data: BudgetData) -> Self {
        Self {
            data: RwLock::new(Some(data)),
            saves: AtomicUsize::new(0),
        }
    }

    /// How many times `save` has succeeded
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl PersistenceGateway for MemoryStore {
    fn load(&self) -> BudgetResult<Option<BudgetData>> {
        let data = self
            .data
            .read()
            .map_err(|e| BudgetError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.clone())
    }

    fn save(&self, snapshot: &BudgetData) -> BudgetResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| BudgetError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *data = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_data;
    use crate::services::BudgetPlanner;

    #[test]
    fn test_empty_store_loads_nothing() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_seeded_store_resumes_session() {
        let data = sample_data();
        let store = MemoryStore::with_data(data.clone());

        let planner = BudgetPlanner::resume(&store).unwrap().unwrap();
        assert_eq!(planner.ledger().len(), data.calculated_budget.categories.len());
        assert_eq!(store.save_count(), 0);
    }
}
