//! Service layer for the wedding budget engine
//!
//! The service layer holds the budget logic on top of the models: factor
//! lookup, baseline allocation, preference re-weighting, the category
//! ledger with its rebalancing rules, assistant patch merging, and the
//! planning session that ties them to storage and the audit log.

pub mod allocation;
pub mod assistant;
pub mod factors;
pub mod ledger;
pub mod planner;
pub mod preferences;
pub mod rebalance;

pub use allocation::{AllocationCalculator, AllocationPolicy, BASELINE};
pub use assistant::{
    AssistantGateway, AssistantReply, AssistantUpdateMerger, CategoryPatch, ChatRole, ChatTurn,
    MergeReport,
};
pub use factors::{FactorResolver, Factors, LocationSource};
pub use ledger::CategoryLedger;
pub use planner::{
    AssistantExchange, BudgetPlanner, PlanRequest, ProposalOutcome, ProposalTicket,
};
pub use preferences::{PreferenceAdjuster, PreferenceEffect};
pub use rebalance::{absorb_proportionally, verify_categories, Rebalance, SUM_TOLERANCE};
