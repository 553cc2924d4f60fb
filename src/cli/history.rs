//! Audit history command

use crate::audit::AuditLogger;
use crate::error::BudgetResult;

use super::CliContext;

/// Handle `history`: print the most recent audit entries
pub fn handle_history(ctx: &CliContext, count: usize) -> BudgetResult<()> {
    let logger = AuditLogger::new(ctx.paths.audit_log());
    let entries = logger.read_recent(count)?;

    if entries.is_empty() {
        println!("No audit entries recorded yet.");
        return Ok(());
    }

    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
