//! JSON file store for budget sessions
//!
//! Each session lives in its own `<session>.json` file under the sessions
//! directory and is rewritten atomically on every save.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::PlannerPaths;
use crate::error::{BudgetError, BudgetResult};
use crate::models::BudgetData;

use super::file_io::{read_json, write_json_atomic};
use super::PersistenceGateway;

/// Stores one session snapshot in a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by an explicit file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store for a named session under the planner's data directory
    ///
    /// Session names may only use letters, digits, `-` and `_`.
    pub fn for_session(paths: &PlannerPaths, session: &str) -> BudgetResult<Self> {
        let valid = !session.is_empty()
            && session
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(BudgetError::InvalidInput(format!(
                "invalid session name '{}'",
                session
            )));
        }
        Ok(Self::new(paths.session_file(session)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a snapshot has been saved
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl PersistenceGateway for JsonFileStore {
    fn load(&self) -> BudgetResult<Option<BudgetData>> {
        let data = read_json(&self.path)?;
        debug!(path = %self.path.display(), found = data.is_some(), "Loaded session");
        Ok(data)
    }

    fn save(&self, data: &BudgetData) -> BudgetResult<()> {
        write_json_atomic(&self.path, data)?;
        debug!(path = %self.path.display(), "Saved session");
        Ok(())
    }
}
