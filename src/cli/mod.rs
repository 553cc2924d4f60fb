//! CLI command handlers
//!
//! Bridges clap argument parsing with the planning session. Every command
//! works on one named session stored as JSON under the data directory.

pub mod assistant;
pub mod category;
pub mod export;
pub mod history;
pub mod plan;

pub use assistant::{handle_apply_patches, ReplayAssistant};
pub use category::{
    handle_actual, handle_add, handle_contract, handle_merge, handle_remove, AddArgs, ContractArgs,
};
pub use export::{handle_export, ExportFormat};
pub use history::handle_history;
pub use plan::{handle_plan, handle_prefs, handle_show, handle_total, PlanArgs, PreferenceArgs};

use crate::audit::AuditLogger;
use crate::config::{PlannerPaths, Settings};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{CategoryId, Money, Percentage};
use crate::services::BudgetPlanner;
use crate::storage::JsonFileStore;

/// Everything a command needs to find its session
#[derive(Debug, Clone)]
pub struct CliContext {
    pub paths: PlannerPaths,
    pub settings: Settings,
    pub session: String,
}

impl CliContext {
    pub fn new(paths: PlannerPaths, settings: Settings, session: Option<String>) -> Self {
        let session = session.unwrap_or_else(|| settings.default_session.clone());
        Self {
            paths,
            settings,
            session,
        }
    }

    /// The store for the selected session
    pub fn store(&self) -> BudgetResult<JsonFileStore> {
        JsonFileStore::for_session(&self.paths, &self.session)
    }

    /// Audit logger, when auditing is enabled
    pub fn audit_logger(&self) -> Option<AuditLogger> {
        self.settings
            .audit_enabled
            .then(|| AuditLogger::new(self.paths.audit_log()))
    }

    /// Resume the selected session
    ///
    /// # Errors
    ///
    /// `NotFound` when the session has never been planned.
    pub fn open(&self) -> BudgetResult<BudgetPlanner<JsonFileStore>> {
        let planner = BudgetPlanner::resume(self.store()?)?.ok_or_else(|| BudgetError::NotFound {
            entity_type: "Session",
            identifier: format!("{} (run 'wedbudget plan' first)", self.session),
        })?;
        Ok(match self.audit_logger() {
            Some(logger) => planner.with_audit(logger),
            None => planner,
        })
    }

    /// Format an amount with the configured currency symbol
    pub fn money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.settings.currency_symbol)
    }
}

/// Parse a money argument ("40000", "$40,000.00")
pub fn parse_money(s: &str) -> BudgetResult<Money> {
    Money::parse(s).map_err(|e| BudgetError::InvalidInput(e.to_string()))
}

/// Parse a percent argument ("12.5" or "12.5%")
pub fn parse_percent(s: &str) -> BudgetResult<Percentage> {
    let trimmed = s.trim().trim_end_matches('%');
    let value: f64 = trimmed
        .parse()
        .map_err(|_| BudgetError::InvalidInput(format!("'{}' is not a percentage", s)))?;
    if !value.is_finite() {
        return Err(BudgetError::InvalidInput(format!("'{}' is not a percentage", s)));
    }
    Ok(Percentage::from_percent(value))
}

/// Parse a category id argument
pub fn parse_category_id(s: &str) -> BudgetResult<CategoryId> {
    CategoryId::parse(s).map_err(|e| BudgetError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_money("$40,000").unwrap(), Money::from_units(40_000));
        assert!(parse_money("lots").is_err());
        assert_eq!(parse_percent("12.5%").unwrap().basis_points(), 1250);
        assert_eq!(parse_percent("3").unwrap().basis_points(), 300);
        assert!(parse_percent("NaN").is_err());
        assert!(parse_category_id("Hair & Makeup").is_err());
    }

    #[test]
    fn test_open_missing_session() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = CliContext::new(
            PlannerPaths::with_base_dir(temp_dir.path().to_path_buf()),
            Settings::default(),
            Some("spring".into()),
        );
        let err = ctx.open().err().unwrap();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("spring"));
    }

    #[test]
    fn test_default_session_from_settings() {
        let mut settings = Settings::default();
        settings.default_session = "ours".into();
        let ctx = CliContext::new(PlannerPaths::with_base_dir("/tmp/x".into()), settings, None);
        assert_eq!(ctx.session, "ours");
    }
}
