//! Path management for the wedding budget planner
//!
//! ## Path Resolution Order
//!
//! 1. `WEDDING_BUDGET_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/wedding-budget` or `~/.config/wedding-budget`
//! 3. Windows: `%APPDATA%\wedding-budget`

use std::path::PathBuf;

use crate::error::{BudgetError, BudgetResult};

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "WEDDING_BUDGET_DATA_DIR";

/// Manages all paths used by the planner
#[derive(Debug, Clone)]
pub struct PlannerPaths {
    base_dir: PathBuf,
}

impl PlannerPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> BudgetResult<Self> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create PlannerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding session snapshots
    pub fn sessions_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("sessions")
    }

    /// Snapshot file for one session
    pub fn session_file(&self, session: &str) -> PathBuf {
        self.sessions_dir().join(format!("{}.json", session))
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Ensure the base and session directories exist
    pub fn ensure_directories(&self) -> BudgetResult<()> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| BudgetError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.sessions_dir())
            .map_err(|e| BudgetError::Io(format!("Failed to create sessions directory: {}", e)))?;

        Ok(())
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> BudgetResult<PathBuf> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                BudgetError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("wedding-budget"))
}

#[cfg(windows)]
fn resolve_default_path() -> BudgetResult<PathBuf> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| BudgetError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("wedding-budget"))
}
