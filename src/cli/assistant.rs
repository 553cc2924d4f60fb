//! Apply assistant patches from a file
//!
//! The CLI has no conversational backend of its own. `apply-patches` replays
//! a reply saved as JSON, either the full `{"reply": ..., "patches": [...]}`
//! shape or a bare array of patches, through the same round trip a live
//! assistant would use.

use std::path::PathBuf;

use tracing::debug;

use crate::display::format_breakdown;
use crate::error::{BudgetError, BudgetResult};
use crate::models::BudgetData;
use crate::services::{AssistantGateway, AssistantReply, CategoryPatch, ChatTurn, ProposalOutcome};

use super::CliContext;

/// An assistant that answers with a reply read from disk
#[derive(Debug, Clone)]
pub struct ReplayAssistant {
    path: PathBuf,
}

impl ReplayAssistant {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_reply(&self) -> BudgetResult<AssistantReply> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            BudgetError::Assistant(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        if let Ok(reply) = serde_json::from_str::<AssistantReply>(&contents) {
            return Ok(reply);
        }
        let patches: Vec<CategoryPatch> = serde_json::from_str(&contents).map_err(|e| {
            BudgetError::Assistant(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;
        Ok(AssistantReply {
            reply: String::new(),
            patches: Some(patches),
        })
    }
}

impl AssistantGateway for ReplayAssistant {
    fn propose(
        &self,
        message: &str,
        current: &BudgetData,
        _history: &[ChatTurn],
    ) -> BudgetResult<AssistantReply> {
        debug!(
            message,
            categories = current.calculated_budget.categories.len(),
            path = %self.path.display(),
            "Replaying assistant reply"
        );
        self.read_reply()
    }
}

/// Handle `apply-patches`
pub fn handle_apply_patches(ctx: &CliContext, file: PathBuf, message: &str) -> BudgetResult<()> {
    let mut planner = ctx.open()?;
    let assistant = ReplayAssistant::new(file);
    let exchange = planner.ask_assistant(&assistant, message, &[])?;

    if let Some(reply) = exchange.reply.filter(|r| !r.is_empty()) {
        println!("Assistant: {}", reply);
    }

    match exchange.outcome {
        ProposalOutcome::Applied(report) => {
            println!(
                "Applied {} update(s), dropped {}.",
                report.applied.len(),
                report.dropped.len()
            );
            for warning in &report.warnings {
                println!("  - {}", warning);
            }
            print!(
                "{}",
                format_breakdown(&planner.snapshot(), &ctx.settings.currency_symbol)
            );
        }
        ProposalOutcome::NoProposal => println!("No changes were proposed."),
        ProposalOutcome::Discarded => println!("The session was closed; the reply was discarded."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetLocation, BudgetPreferences, Money};
    use crate::services::{BudgetPlanner, PlanRequest};
    use crate::storage::MemoryStore;
    use tempfile::TempDir;

    fn snapshot() -> BudgetData {
        let store = MemoryStore::new();
        let request = PlanRequest {
            total_budget: Money::from_units(40_000),
            guest_count: 100,
            location: BudgetLocation::new("Smallville", "Atlantis").with_wedding_date("2026-06-13"),
            preferences: BudgetPreferences::default(),
        };
        BudgetPlanner::start(&store, request).unwrap().snapshot()
    }

    #[test]
    fn test_reads_full_reply_shape() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reply.json");
        std::fs::write(
            &path,
            r#"{"reply": "More flowers.", "patches": [{"id": "flowers", "percentage": 10.0}]}"#,
        )
        .unwrap();

        let reply = ReplayAssistant::new(path)
            .propose("flowers?", &snapshot(), &[])
            .unwrap();
        assert_eq!(reply.reply, "More flowers.");
        assert_eq!(reply.patches.unwrap()[0].id, "flowers");
    }

    #[test]
    fn test_reads_bare_patch_array() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("patches.json");
        std::fs::write(&path, r#"[{"id": "venue", "estimatedCost": 1500000}]"#).unwrap();

        let reply = ReplayAssistant::new(path)
            .propose("", &snapshot(), &[])
            .unwrap();
        let patches = reply.patches.unwrap();
        assert_eq!(patches[0].estimated_cost, Some(Money::from_units(15_000)));
    }

    #[test]
    fn test_unreadable_file_is_assistant_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");
        let err = ReplayAssistant::new(path)
            .propose("", &snapshot(), &[])
            .unwrap_err();
        assert!(matches!(err, BudgetError::Assistant(_)));
    }
}
